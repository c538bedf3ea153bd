use crate::error::QueryError;
use crate::models::{Chunk, RetrievedChunk};
use async_trait::async_trait;

/// Seam over the external vector store. Whether a second submission of the
/// same chunk duplicates or replaces it depends on the implementation's
/// identifier scheme.
#[async_trait]
pub trait VectorIndex {
    async fn ensure_collection(&self, dimensions: usize) -> Result<(), QueryError>;

    async fn clear(&self) -> Result<(), QueryError>;

    async fn add_chunks(
        &self,
        chunks: &[Chunk],
        embeddings: &[Vec<f32>],
    ) -> Result<(), QueryError>;

    /// Results ordered by descending similarity.
    async fn search(
        &self,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<RetrievedChunk>, QueryError>;

    async fn count(&self) -> Result<usize, QueryError>;
}
