pub mod chunking;
pub mod context;
pub mod embeddings;
pub mod error;
pub mod generation;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod retrieve;
pub mod stores;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use chunking::{chunk_text, ChunkingConfig};
pub use context::{
    assemble_context, degraded_response, empty_index_response, PromptTemplate,
    DEFAULT_CHAR_BUDGET,
};
pub use embeddings::{Embedder, HashedNgramEmbedder, DEFAULT_EMBEDDING_DIMENSIONS};
pub use error::{IngestError, QueryError};
pub use generation::{GenerationOptions, Generator, OllamaGenerator};
pub use ingest::{
    discover_category_files, index_corpus, write_summary, IndexingOptions, IndexingReport,
    SkippedSource,
};
pub use models::{
    AudioTranscript, Category, CategoryCounts, Chunk, ChunkMetadata, ContentUnit,
    IndexingSummary, MediaKind, QueryOutcome, QuerySession, RetrievedChunk,
};
pub use normalize::{extract_category, normalize_unit, synthesize_caption};
pub use orchestrator::{QueryOrchestrator, MIN_ANSWER_CHARS};
pub use retrieve::{Retriever, DEFAULT_TOP_K};
pub use stores::QdrantStore;
pub use traits::VectorIndex;
