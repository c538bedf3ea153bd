use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Character,
    Team,
    Event,
    Comic,
    General,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Character => "character",
            Category::Team => "team",
            Category::Event => "event",
            Category::Comic => "comic",
            Category::General => "general",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Document,
    Image,
    Audio,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Document => "document",
            MediaKind::Image => "image",
            MediaKind::Audio => "audio",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioTranscript {
    pub transcript: String,
    #[serde(default)]
    pub num_chunks: usize,
}

#[derive(Debug, Clone)]
pub enum ContentUnit {
    Text {
        identifier: String,
        text: String,
    },
    Image {
        identifier: String,
        bytes: Vec<u8>,
    },
    Audio {
        identifier: String,
        transcript: Option<AudioTranscript>,
    },
}

impl ContentUnit {
    pub fn identifier(&self) -> &str {
        match self {
            ContentUnit::Text { identifier, .. }
            | ContentUnit::Image { identifier, .. }
            | ContentUnit::Audio { identifier, .. } => identifier,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    pub source: String,
    pub chunk_id: usize,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_b64: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub metadata: ChunkMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub metadata: ChunkMetadata,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryCounts {
    pub documents: usize,
    pub images: usize,
    pub audio: usize,
}

impl CategoryCounts {
    pub fn total(&self) -> usize {
        self.documents + self.images + self.audio
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingSummary {
    pub processed_at: DateTime<Utc>,
    pub counts: CategoryCounts,
    pub total_indexed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum QueryOutcome {
    Answered,
    Degraded { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuerySession {
    pub id: Uuid,
    pub question: String,
    pub asked_at: DateTime<Utc>,
    pub retrieved: Vec<RetrievedChunk>,
    pub prompt: Option<String>,
    pub answer: String,
    pub outcome: QueryOutcome,
}

impl QuerySession {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            question: question.into(),
            asked_at: Utc::now(),
            retrieved: Vec::new(),
            prompt: None,
            answer: String::new(),
            outcome: QueryOutcome::Degraded {
                reason: "not yet processed".to_string(),
            },
        }
    }
}
