use crate::chunking::ChunkingConfig;
use crate::embeddings::Embedder;
use crate::error::IngestError;
use crate::models::{
    AudioTranscript, CategoryCounts, Chunk, ContentUnit, IndexingSummary,
};
use crate::normalize::normalize_unit;
use crate::traits::VectorIndex;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];
const AUDIO_EXTENSIONS: [&str; 4] = ["mp3", "wav", "m4a", "flac"];

#[derive(Debug, Clone, Copy)]
pub struct IndexingOptions {
    pub chunking: ChunkingConfig,
    pub clear_existing: bool,
}

impl Default for IndexingOptions {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            clear_existing: false,
        }
    }
}

pub struct SkippedSource {
    pub path: PathBuf,
    pub reason: String,
}

pub struct IndexingReport {
    pub summary: IndexingSummary,
    pub skipped: Vec<SkippedSource>,
}

/// Sorted for deterministic processing order; a missing folder is simply an
/// empty category.
pub fn discover_category_files(folder: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder).into_iter().filter_map(|item| item.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }

        let matches = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                extensions
                    .iter()
                    .any(|candidate| ext.eq_ignore_ascii_case(candidate))
            });

        if matches {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    files
}

fn file_identifier(path: &Path) -> Result<String, IngestError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            IngestError::MissingFileName(format!("path missing filename: {}", path.display()))
        })
}

pub fn load_text_unit(path: &Path) -> Result<ContentUnit, IngestError> {
    let identifier = file_identifier(path)?;
    let text = fs::read_to_string(path)
        .map_err(|error| IngestError::SourceRead(format!("{}: {error}", path.display())))?;
    Ok(ContentUnit::Text { identifier, text })
}

pub fn load_image_unit(path: &Path) -> Result<ContentUnit, IngestError> {
    let identifier = file_identifier(path)?;
    let bytes = fs::read(path)
        .map_err(|error| IngestError::SourceRead(format!("{}: {error}", path.display())))?;
    Ok(ContentUnit::Image { identifier, bytes })
}

/// Picks up the transcript record at `<stem>.json` beside the media file
/// when present.
pub fn load_audio_unit(path: &Path) -> Result<ContentUnit, IngestError> {
    let identifier = file_identifier(path)?;
    let transcript_path = path.with_extension("json");

    let transcript = if transcript_path.exists() {
        let raw = fs::read_to_string(&transcript_path).map_err(|error| {
            IngestError::SourceRead(format!("{}: {error}", transcript_path.display()))
        })?;
        let record: AudioTranscript = serde_json::from_str(&raw)?;
        Some(record)
    } else {
        None
    };

    Ok(ContentUnit::Audio {
        identifier,
        transcript,
    })
}

/// Per-item failures are recorded and skipped, never fatal.
pub async fn index_corpus<E, V>(
    corpus_root: &Path,
    options: IndexingOptions,
    embedder: &E,
    index: &V,
) -> Result<IndexingReport, IngestError>
where
    E: Embedder + Send + Sync,
    V: VectorIndex + Send + Sync,
{
    options.chunking.validate()?;

    if !corpus_root.is_dir() {
        return Err(IngestError::InvalidArgument(format!(
            "corpus root is not a directory: {}",
            corpus_root.display()
        )));
    }

    if options.clear_existing {
        info!("clearing existing collection before indexing");
        index
            .clear()
            .await
            .map_err(|error| IngestError::Index(error.to_string()))?;
    }
    index
        .ensure_collection(embedder.dimensions())
        .await
        .map_err(|error| IngestError::Index(error.to_string()))?;

    let mut counts = CategoryCounts::default();
    let mut skipped = Vec::new();

    let documents = discover_category_files(&corpus_root.join("documents"), &["txt"]);
    counts.documents = index_category(
        &documents,
        load_text_unit,
        &options.chunking,
        embedder,
        index,
        &mut skipped,
    )
    .await?;
    info!(processed = counts.documents, "documents indexed");

    let images = discover_category_files(&corpus_root.join("images"), &IMAGE_EXTENSIONS);
    counts.images = index_category(
        &images,
        load_image_unit,
        &options.chunking,
        embedder,
        index,
        &mut skipped,
    )
    .await?;
    info!(processed = counts.images, "images indexed");

    let audio = discover_category_files(&corpus_root.join("audio"), &AUDIO_EXTENSIONS);
    counts.audio = index_category(
        &audio,
        load_audio_unit,
        &options.chunking,
        embedder,
        index,
        &mut skipped,
    )
    .await?;
    info!(processed = counts.audio, "audio files indexed");

    for item in &skipped {
        warn!(path = %item.path.display(), reason = %item.reason, "skipped source");
    }

    let total_indexed = index
        .count()
        .await
        .map_err(|error| IngestError::Index(error.to_string()))?;

    Ok(IndexingReport {
        summary: IndexingSummary {
            processed_at: Utc::now(),
            counts,
            total_indexed,
        },
        skipped,
    })
}

async fn index_category<E, V>(
    files: &[PathBuf],
    load: fn(&Path) -> Result<ContentUnit, IngestError>,
    chunking: &ChunkingConfig,
    embedder: &E,
    index: &V,
    skipped: &mut Vec<SkippedSource>,
) -> Result<usize, IngestError>
where
    E: Embedder + Send + Sync,
    V: VectorIndex + Send + Sync,
{
    let mut batch: Vec<Chunk> = Vec::new();
    let mut processed = 0;

    for path in files {
        let unit_chunks = load(path).and_then(|unit| normalize_unit(&unit, chunking));
        match unit_chunks {
            Ok(chunks) => {
                batch.extend(chunks);
                processed += 1;
            }
            Err(error) => skipped.push(SkippedSource {
                path: path.clone(),
                reason: error.to_string(),
            }),
        }
    }

    if !batch.is_empty() {
        let embeddings: Vec<Vec<f32>> = batch
            .iter()
            .map(|chunk| embedder.embed(&chunk.text))
            .collect();
        index
            .add_chunks(&batch, &embeddings)
            .await
            .map_err(|error| IngestError::Index(error.to_string()))?;
    }

    Ok(processed)
}

pub fn write_summary(path: &Path, summary: &IndexingSummary) -> Result<(), IngestError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let serialized = serde_json::to_string_pretty(summary)?;
    fs::write(path, serialized)?;
    Ok(())
}
