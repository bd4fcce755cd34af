use crate::config::Config;
use crate::error::{ConfigError, EmbedError};

const DEFAULT: usize = 128;

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = DEFAULT;

/// Maps text to a fixed-dimension vector. The same model (identified by
/// `model_id`) must be used at ingestion and query time; the store records the
/// id so the query path can detect a mismatch.
pub trait Embedder {
    /// Stable identifier of the embedding space, e.g. `char-ngram-128`.
    fn model_id(&self) -> String;

    fn dimensions(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;

    /// Batch embedding is an optimization only; the default sequential form is
    /// observably equivalent.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

/// Deterministic local embedder: character trigrams hashed (FNV-1a) into a
/// fixed number of buckets, L2-normalized. Not a learned model, but a pure
/// function of the text, which is all the pipeline requires of its embedding
/// collaborator.
#[derive(Debug, Clone, Copy)]
pub struct NgramHashEmbedder {
    pub dimensions: usize,
}

impl Default for NgramHashEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

impl Embedder for NgramHashEmbedder {
    fn model_id(&self) -> String {
        format!("char-ngram-{}", self.dimensions)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut vector = vec![0f32; self.dimensions.max(1)];
        let lowered = text.to_lowercase();
        let chars: Vec<char> = lowered.chars().collect();

        if chars.is_empty() {
            return Ok(vector);
        }

        for window in chars.windows(3) {
            let token = window.iter().collect::<String>();
            let mut hash = 1469598103934665603u64;
            for byte in token.bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(1099511628211);
            }
            let bucket = (hash % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        Ok(vector)
    }
}

/// Resolves the configured model identifier into an embedder. Identifiers take
/// the form `char-ngram-<dimensions>`.
pub fn build_embedder(config: &Config) -> Result<NgramHashEmbedder, ConfigError> {
    let unknown = || ConfigError::UnknownModel(config.embedding_model.clone());

    let dimensions = config
        .embedding_model
        .strip_prefix("char-ngram-")
        .ok_or_else(unknown)?
        .parse::<usize>()
        .map_err(|_| unknown())?;

    if dimensions == 0 {
        return Err(unknown());
    }

    Ok(NgramHashEmbedder { dimensions })
}
