use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid chunking config: {0}")]
    InvalidChunkConfig(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("path has no file name: {0}")]
    MissingFileName(String),

    #[error("unreadable source: {0}")]
    SourceRead(String),

    #[error("audio transcript not found: {0}")]
    MissingTranscript(String),

    #[error("vector index error: {0}")]
    Index(String),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("vector index has no entries; run indexing first")]
    EmptyIndex,

    #[error("vector index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("embedding failed: {0}")]
    Embedding(String),

    #[error("invalid response from {backend}: {details}")]
    BackendResponse { backend: String, details: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("query request failed: {0}")]
    Request(String),

    #[error("generation unavailable: {0}")]
    GenerationUnavailable(String),
}

pub type Result<T, E = IngestError> = std::result::Result<T, E>;
