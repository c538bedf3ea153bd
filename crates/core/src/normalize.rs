use crate::chunking::{chunk_text, ChunkingConfig};
use crate::error::IngestError;
use crate::models::{Category, Chunk, ChunkMetadata, ContentUnit, MediaKind};
use base64::{engine::general_purpose::STANDARD, Engine};

/// First match wins: character > team > event > comic, case-insensitive.
pub fn extract_category(identifier: &str) -> Category {
    let lowered = identifier.to_lowercase();
    if lowered.contains("character") {
        Category::Character
    } else if lowered.contains("team") {
        Category::Team
    } else if lowered.contains("event") {
        Category::Event
    } else if lowered.contains("comic") {
        Category::Comic
    } else {
        Category::General
    }
}

pub fn synthesize_caption(identifier: &str) -> String {
    let stem = identifier
        .rsplit_once('.')
        .map(|(stem, _ext)| stem)
        .unwrap_or(identifier);

    let title = stem
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ");

    format!(
        "Image: {title}. This image likely contains knowledge-base content \
         such as characters, comic book covers, or team lineups."
    )
}

pub fn normalize_unit(
    unit: &ContentUnit,
    config: &ChunkingConfig,
) -> Result<Vec<Chunk>, IngestError> {
    config.validate()?;

    match unit {
        ContentUnit::Text { identifier, text } => {
            chunk_source_text(identifier, text, MediaKind::Document, config)
        }
        ContentUnit::Image { identifier, bytes } => {
            let chunk = Chunk {
                text: synthesize_caption(identifier),
                metadata: ChunkMetadata {
                    source: identifier.clone(),
                    chunk_id: 0,
                    kind: MediaKind::Image,
                    category: extract_category(identifier),
                    image_b64: Some(STANDARD.encode(bytes)),
                },
            };
            Ok(vec![chunk])
        }
        ContentUnit::Audio {
            identifier,
            transcript,
        } => match transcript {
            Some(record) => {
                chunk_source_text(identifier, &record.transcript, MediaKind::Audio, config)
            }
            // Never fabricate content for untranscribed media.
            None => Err(IngestError::MissingTranscript(identifier.clone())),
        },
    }
}

fn chunk_source_text(
    identifier: &str,
    text: &str,
    kind: MediaKind,
    config: &ChunkingConfig,
) -> Result<Vec<Chunk>, IngestError> {
    let category = extract_category(identifier);
    let chunks = chunk_text(text, config)?
        .into_iter()
        .enumerate()
        .map(|(chunk_id, text)| Chunk {
            text,
            metadata: ChunkMetadata {
                source: identifier.to_string(),
                chunk_id,
                kind,
                category,
                image_b64: None,
            },
        })
        .collect();
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AudioTranscript;

    #[test]
    fn category_is_derived_from_filename() {
        assert_eq!(extract_category("character_Thor.txt"), Category::Character);
        assert_eq!(extract_category("team_Avengers.txt"), Category::Team);
        assert_eq!(extract_category("event_Civil_War.txt"), Category::Event);
        assert_eq!(extract_category("comic_ASM_300.txt"), Category::Comic);
        assert_eq!(extract_category("random.txt"), Category::General);
    }

    #[test]
    fn category_match_is_case_insensitive() {
        assert_eq!(extract_category("CHARACTER_Hulk.txt"), Category::Character);
        assert_eq!(extract_category("Team_Xmen.TXT"), Category::Team);
    }

    #[test]
    fn category_tie_break_order_holds_for_adversarial_names() {
        assert_eq!(
            extract_category("team_character_crossover.txt"),
            Category::Character
        );
        assert_eq!(extract_category("comic_event_recap.txt"), Category::Event);
        assert_eq!(extract_category("comic_team_roster.txt"), Category::Team);
        assert_eq!(
            extract_category("character_team_event_comic.txt"),
            Category::Character
        );
    }

    #[test]
    fn caption_title_cases_the_stem() {
        let caption = synthesize_caption("iron_man_armor.png");
        assert!(caption.starts_with("Image: Iron Man Armor."));
    }

    #[test]
    fn text_unit_chunks_carry_source_and_sequence() {
        let unit = ContentUnit::Text {
            identifier: "event_Secret_Wars.txt".to_string(),
            text: "a".repeat(2_500),
        };
        let chunks = normalize_unit(&unit, &ChunkingConfig::default()).unwrap();

        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.metadata.chunk_id, i);
            assert_eq!(chunk.metadata.source, "event_Secret_Wars.txt");
            assert_eq!(chunk.metadata.kind, MediaKind::Document);
            assert_eq!(chunk.metadata.category, Category::Event);
        }
    }

    #[test]
    fn image_unit_produces_exactly_one_caption_chunk() {
        let unit = ContentUnit::Image {
            identifier: "character_spider_man.jpg".to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF],
        };
        let chunks = normalize_unit(&unit, &ChunkingConfig::default()).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].metadata.kind, MediaKind::Image);
        assert_eq!(chunks[0].metadata.category, Category::Character);
        assert!(chunks[0].metadata.image_b64.is_some());
        assert!(chunks[0].text.contains("Character Spider Man"));
    }

    #[test]
    fn audio_with_transcript_is_chunked_as_text() {
        let unit = ContentUnit::Audio {
            identifier: "team_podcast.mp3".to_string(),
            transcript: Some(AudioTranscript {
                transcript: "The team assembled for the first time.".to_string(),
                num_chunks: 1,
            }),
        };
        let chunks = normalize_unit(&unit, &ChunkingConfig::default()).unwrap();

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].metadata.kind, MediaKind::Audio);
        assert_eq!(chunks[0].metadata.category, Category::Team);
    }

    #[test]
    fn audio_without_transcript_is_an_error() {
        let unit = ContentUnit::Audio {
            identifier: "lost_recording.mp3".to_string(),
            transcript: None,
        };
        let result = normalize_unit(&unit, &ChunkingConfig::default());
        assert!(matches!(result, Err(IngestError::MissingTranscript(_))));
    }
}
