use crate::embeddings::Embedder;
use crate::error::QueryError;
use crate::models::RetrievedChunk;
use crate::traits::VectorIndex;
use tracing::debug;

pub const DEFAULT_TOP_K: usize = 3;

/// No score thresholding is applied; relevance filtering is the caller's
/// concern.
pub struct Retriever<V, E> {
    index: V,
    embedder: E,
}

impl<V, E> Retriever<V, E>
where
    V: VectorIndex + Send + Sync,
    E: Embedder + Send + Sync,
{
    pub fn new(index: V, embedder: E) -> Self {
        Self { index, embedder }
    }

    pub fn index(&self) -> &V {
        &self.index
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Distinguishes "not set up" from backend trouble: a zero count is
    /// [`QueryError::EmptyIndex`], any store-side failure is
    /// [`QueryError::IndexUnavailable`].
    pub async fn retrieve(
        &self,
        question: &str,
        k: usize,
    ) -> Result<Vec<RetrievedChunk>, QueryError> {
        if question.trim().is_empty() {
            return Err(QueryError::Request("question is empty".to_string()));
        }

        if self.index.count().await.map_err(index_unavailable)? == 0 {
            return Err(QueryError::EmptyIndex);
        }

        let query_vector = self.embedder.embed(question);
        if query_vector.len() != self.embedder.dimensions() {
            return Err(QueryError::Embedding(format!(
                "embedder produced {} dims, expected {}",
                query_vector.len(),
                self.embedder.dimensions()
            )));
        }

        let hits = self
            .index
            .search(&query_vector, k)
            .await
            .map_err(index_unavailable)?;
        debug!(k, hit_count = hits.len(), "vector search complete");
        Ok(hits)
    }
}

fn index_unavailable(error: QueryError) -> QueryError {
    match error {
        QueryError::EmptyIndex => QueryError::EmptyIndex,
        other => QueryError::IndexUnavailable(other.to_string()),
    }
}
