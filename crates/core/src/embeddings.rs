const DEFAULT_DIMENSIONS: usize = 128;
const DEFAULT_NGRAM_LEN: usize = 3;

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = DEFAULT_DIMENSIONS;

/// Implementations must be deterministic for identical input so index-time
/// and query-time vectors stay comparable.
pub trait Embedder {
    fn dimensions(&self) -> usize;
    fn embed(&self, text: &str) -> Vec<f32>;
}

/// Local stand-in for a real embedding model: lowercased character n-grams
/// hashed into buckets, L2-normalized so cosine similarity reduces to a dot
/// product.
#[derive(Debug, Clone, Copy)]
pub struct HashedNgramEmbedder {
    dimensions: usize,
    ngram_len: usize,
}

impl Default for HashedNgramEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_DIMENSIONS,
            ngram_len: DEFAULT_NGRAM_LEN,
        }
    }
}

impl HashedNgramEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            ngram_len: DEFAULT_NGRAM_LEN,
        }
    }

    pub fn with_ngram_len(mut self, ngram_len: usize) -> Self {
        self.ngram_len = ngram_len.max(1);
        self
    }

    fn bucket(&self, gram: &[char]) -> usize {
        const FNV_OFFSET: u64 = 1469598103934665603;
        const FNV_PRIME: u64 = 1099511628211;

        let mut hash = FNV_OFFSET;
        for ch in gram {
            let mut bytes = [0u8; 4];
            for byte in ch.encode_utf8(&mut bytes).as_bytes() {
                hash = (hash ^ *byte as u64).wrapping_mul(FNV_PRIME);
            }
        }
        (hash % self.dimensions as u64) as usize
    }
}

impl Embedder for HashedNgramEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions];
        let chars: Vec<char> = text.to_lowercase().chars().collect();

        if chars.is_empty() {
            return vector;
        }

        if chars.len() < self.ngram_len {
            // Too short for a full window; hash the whole string once.
            vector[self.bucket(&chars)] += 1.0;
        } else {
            for gram in chars.windows(self.ngram_len) {
                vector[self.bucket(gram)] += 1.0;
            }
        }

        l2_normalize(&mut vector);
        vector
    }
}

fn l2_normalize(vector: &mut [f32]) {
    let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for value in vector {
            *value /= magnitude;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Embedder, HashedNgramEmbedder};

    #[test]
    fn embedder_is_deterministic() {
        let embedder = HashedNgramEmbedder::default();
        let first = embedder.embed("Spider-Man has super strength");
        let second = embedder.embed("Spider-Man has super strength");
        assert_eq!(first, second);
    }

    #[test]
    fn embedder_outputs_expected_length() {
        let embedder = HashedNgramEmbedder::new(32);
        assert_eq!(embedder.embed("abc").len(), 32);
        assert_eq!(embedder.embed("").len(), 32);
    }

    #[test]
    fn input_shorter_than_the_window_still_embeds() {
        let embedder = HashedNgramEmbedder::default().with_ngram_len(5);
        let vector = embedder.embed("ab");
        assert!(vector.iter().any(|value| *value > 0.0));
    }

    #[test]
    fn ngram_width_changes_the_vector() {
        let trigrams = HashedNgramEmbedder::default();
        let bigrams = HashedNgramEmbedder::default().with_ngram_len(2);
        let text = "The Avengers formed in 1963";
        assert_ne!(trigrams.embed(text), bigrams.embed(text));
    }

    #[test]
    fn vectors_are_unit_length() {
        let embedder = HashedNgramEmbedder::default();
        let vector = embedder.embed("The Avengers formed in 1963");
        let magnitude: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 1e-5);
    }

    #[test]
    fn similar_texts_score_higher_than_unrelated() {
        let embedder = HashedNgramEmbedder::default();
        let question = embedder.embed("What are Spider-Man's powers?");
        let on_topic = embedder.embed("Spider-Man has super strength and spider powers");
        let off_topic = embedder.embed("The Avengers formed in 1963");

        let dot = |a: &[f32], b: &[f32]| -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() };
        assert!(dot(&question, &on_topic) > dot(&question, &off_topic));
    }
}
