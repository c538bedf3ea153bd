use crate::error::QueryError;
use crate::generation::Generator;
use crate::models::{Category, Chunk, ChunkMetadata, MediaKind, RetrievedChunk};
use crate::traits::VectorIndex;
use async_trait::async_trait;
use std::sync::Mutex;

// Stored vectors from the default embedder are unit-length, so dot product
// is cosine similarity.
pub(crate) struct MemoryIndex {
    entries: Mutex<Vec<(Chunk, Vec<f32>)>>,
}

impl MemoryIndex {
    pub(crate) fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn ensure_collection(&self, _dimensions: usize) -> Result<(), QueryError> {
        Ok(())
    }

    async fn clear(&self) -> Result<(), QueryError> {
        self.entries
            .lock()
            .map_err(|_| QueryError::Request("lock poisoned".to_string()))?
            .clear();
        Ok(())
    }

    async fn add_chunks(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> Result<(), QueryError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| QueryError::Request("lock poisoned".to_string()))?;
        for (chunk, embedding) in chunks.iter().zip(embeddings.iter()) {
            entries.push((chunk.clone(), embedding.clone()));
        }
        Ok(())
    }

    async fn search(
        &self,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<RetrievedChunk>, QueryError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| QueryError::Request("lock poisoned".to_string()))?;
        let mut scored: Vec<RetrievedChunk> = entries
            .iter()
            .map(|(chunk, vector)| RetrievedChunk {
                text: chunk.text.clone(),
                metadata: chunk.metadata.clone(),
                score: query_vector
                    .iter()
                    .zip(vector.iter())
                    .map(|(a, b)| (a * b) as f64)
                    .sum(),
            })
            .collect();
        scored.sort_by(|left, right| right.score.total_cmp(&left.score));
        scored.truncate(k);
        Ok(scored)
    }

    async fn count(&self) -> Result<usize, QueryError> {
        Ok(self
            .entries
            .lock()
            .map_err(|_| QueryError::Request("lock poisoned".to_string()))?
            .len())
    }
}

// Store double for an unreachable backend: every call fails like a refused
// connection.
pub(crate) struct OfflineIndex;

#[async_trait]
impl VectorIndex for OfflineIndex {
    async fn ensure_collection(&self, _dimensions: usize) -> Result<(), QueryError> {
        Err(QueryError::Request("connection refused".to_string()))
    }

    async fn clear(&self) -> Result<(), QueryError> {
        Err(QueryError::Request("connection refused".to_string()))
    }

    async fn add_chunks(
        &self,
        _chunks: &[Chunk],
        _embeddings: &[Vec<f32>],
    ) -> Result<(), QueryError> {
        Err(QueryError::Request("connection refused".to_string()))
    }

    async fn search(
        &self,
        _query_vector: &[f32],
        _k: usize,
    ) -> Result<Vec<RetrievedChunk>, QueryError> {
        Err(QueryError::Request("connection refused".to_string()))
    }

    async fn count(&self) -> Result<usize, QueryError> {
        Err(QueryError::Request("connection refused".to_string()))
    }
}

pub(crate) enum FakeGenerator {
    Respond(String),
    Fail(String),
}

#[async_trait]
impl Generator for FakeGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, QueryError> {
        match self {
            FakeGenerator::Respond(text) => Ok(text.clone()),
            FakeGenerator::Fail(reason) => Err(QueryError::GenerationUnavailable(reason.clone())),
        }
    }

    async fn is_available(&self) -> bool {
        matches!(self, FakeGenerator::Respond(_))
    }
}

pub(crate) fn document_chunk(source: &str, text: &str, category: Category) -> Chunk {
    Chunk {
        text: text.to_string(),
        metadata: ChunkMetadata {
            source: source.to_string(),
            chunk_id: 0,
            kind: MediaKind::Document,
            category,
            image_b64: None,
        },
    }
}
