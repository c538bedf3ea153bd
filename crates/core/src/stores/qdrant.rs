use crate::error::QueryError;
use crate::models::{Category, Chunk, ChunkMetadata, MediaKind, RetrievedChunk};
use crate::traits::VectorIndex;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

/// Point IDs are derived from (source, chunk_id), so re-indexing an
/// unchanged corpus upserts in place instead of duplicating entries.
pub struct QdrantStore {
    endpoint: String,
    collection: String,
    client: Client,
    vector_size: usize,
}

impl QdrantStore {
    pub fn new(
        endpoint: impl Into<String>,
        collection: impl Into<String>,
        vector_size: usize,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            collection: collection.into(),
            client: Client::new(),
            vector_size,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.endpoint, self.collection)
    }

    fn point_id(metadata: &ChunkMetadata) -> u64 {
        let mut hasher = Sha256::new();
        hasher.update(metadata.source.as_bytes());
        hasher.update(metadata.chunk_id.to_le_bytes());
        let digest = hasher.finalize();
        u64::from_le_bytes(digest[..8].try_into().unwrap_or_default())
    }
}

#[async_trait]
impl VectorIndex for QdrantStore {
    async fn ensure_collection(&self, dimensions: usize) -> Result<(), QueryError> {
        if self.vector_size != dimensions {
            return Err(QueryError::Request(format!(
                "configured vector size {} does not match requested {}",
                self.vector_size, dimensions
            )));
        }

        let response = self.client.get(self.collection_url()).send().await?;
        if response.status().is_success() {
            return Ok(());
        }

        let response = self
            .client
            .put(self.collection_url())
            .json(&json!({
                "vectors": {
                    "size": dimensions,
                    "distance": "Cosine",
                }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(QueryError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

        Ok(())
    }

    async fn clear(&self) -> Result<(), QueryError> {
        let response = self.client.delete(self.collection_url()).send().await?;

        // Deleting a collection that never existed is not a failure.
        if !response.status().is_success() && !response.status().is_client_error() {
            return Err(QueryError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

        Ok(())
    }

    async fn add_chunks(
        &self,
        chunks: &[Chunk],
        embeddings: &[Vec<f32>],
    ) -> Result<(), QueryError> {
        if chunks.len() != embeddings.len() {
            return Err(QueryError::Request(format!(
                "embedding count {} doesn't match chunk count {}",
                embeddings.len(),
                chunks.len()
            )));
        }

        let points = chunks
            .iter()
            .zip(embeddings.iter())
            .map(|(chunk, embedding)| {
                if embedding.len() != self.vector_size {
                    return Err(QueryError::Request(format!(
                        "embedding dimension {} != {}",
                        embedding.len(),
                        self.vector_size
                    )));
                }

                Ok(json!({
                    "id": Self::point_id(&chunk.metadata),
                    "vector": embedding,
                    "payload": point_payload(chunk),
                }))
            })
            .collect::<Result<Vec<_>, QueryError>>()?;

        if points.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .put(format!("{}/points?wait=true", self.collection_url()))
            .json(&json!({ "points": points }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(QueryError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

        Ok(())
    }

    async fn search(
        &self,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<RetrievedChunk>, QueryError> {
        if query_vector.len() != self.vector_size {
            return Err(QueryError::Request(format!(
                "query vector dim {} is not {}",
                query_vector.len(),
                self.vector_size
            )));
        }

        let response = self
            .client
            .post(format!("{}/points/search", self.collection_url()))
            .json(&json!({
                "vector": query_vector,
                "limit": k,
                "with_payload": true,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(QueryError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

        let parsed: Value = response.json().await?;
        let hits = parsed
            .pointer("/result")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut result = Vec::new();
        for hit in hits {
            let score = hit.pointer("/score").and_then(Value::as_f64).unwrap_or(0.0);
            let payload = hit.pointer("/payload").cloned().unwrap_or(Value::Null);
            result.push(RetrievedChunk {
                text: payload
                    .pointer("/text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                metadata: parse_metadata(&payload),
                score,
            });
        }

        Ok(result)
    }

    async fn count(&self) -> Result<usize, QueryError> {
        let response = self
            .client
            .post(format!("{}/points/count", self.collection_url()))
            .json(&json!({ "exact": true }))
            .send()
            .await?;

        // A missing collection reads as an empty index, not a hard error.
        if response.status().is_client_error() {
            return Ok(0);
        }

        if !response.status().is_success() {
            return Err(QueryError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

        let parsed: Value = response.json().await?;
        Ok(parsed
            .pointer("/result/count")
            .and_then(Value::as_u64)
            .unwrap_or(0) as usize)
    }
}

fn point_payload(chunk: &Chunk) -> Value {
    json!({
        "source": chunk.metadata.source,
        "chunk_id": chunk.metadata.chunk_id,
        "type": chunk.metadata.kind.as_str(),
        "category": chunk.metadata.category.as_str(),
        "image_b64": chunk.metadata.image_b64,
        "text": chunk.text,
    })
}

fn parse_metadata(payload: &Value) -> ChunkMetadata {
    let kind = match payload.pointer("/type").and_then(Value::as_str) {
        Some("image") => MediaKind::Image,
        Some("audio") => MediaKind::Audio,
        _ => MediaKind::Document,
    };
    let category = match payload.pointer("/category").and_then(Value::as_str) {
        Some("character") => Category::Character,
        Some("team") => Category::Team,
        Some("event") => Category::Event,
        Some("comic") => Category::Comic,
        _ => Category::General,
    };

    ChunkMetadata {
        source: payload
            .pointer("/source")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        chunk_id: payload
            .pointer("/chunk_id")
            .and_then(Value::as_u64)
            .unwrap_or_default() as usize,
        kind,
        category,
        image_b64: payload
            .pointer("/image_b64")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(source: &str, chunk_id: usize) -> ChunkMetadata {
        ChunkMetadata {
            source: source.to_string(),
            chunk_id,
            kind: MediaKind::Document,
            category: Category::General,
            image_b64: None,
        }
    }

    #[test]
    fn point_ids_are_stable_across_runs() {
        let first = QdrantStore::point_id(&metadata("character_Thor.txt", 2));
        let second = QdrantStore::point_id(&metadata("character_Thor.txt", 2));
        assert_eq!(first, second);
    }

    #[test]
    fn point_ids_differ_per_source_and_sequence() {
        let base = QdrantStore::point_id(&metadata("character_Thor.txt", 0));
        assert_ne!(base, QdrantStore::point_id(&metadata("character_Thor.txt", 1)));
        assert_ne!(base, QdrantStore::point_id(&metadata("team_Avengers.txt", 0)));
    }

    #[test]
    fn payload_metadata_round_trips() {
        let payload = json!({
            "source": "event_Civil_War.txt",
            "chunk_id": 3,
            "type": "audio",
            "category": "event",
            "image_b64": null,
        });
        let parsed = parse_metadata(&payload);
        assert_eq!(parsed.source, "event_Civil_War.txt");
        assert_eq!(parsed.chunk_id, 3);
        assert_eq!(parsed.kind, MediaKind::Audio);
        assert_eq!(parsed.category, Category::Event);
        assert!(parsed.image_b64.is_none());
    }

    #[test]
    fn media_kind_travels_under_the_type_key() {
        let chunk = Chunk {
            text: "caption".to_string(),
            metadata: ChunkMetadata {
                kind: MediaKind::Image,
                ..metadata("character_hulk.png", 0)
            },
        };
        let payload = point_payload(&chunk);
        assert_eq!(payload["type"], json!("image"));
        assert!(payload.get("kind").is_none());
        assert_eq!(parse_metadata(&payload), chunk.metadata);
    }
}
