use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Immutable runtime settings, built once at process start and passed into each
/// component. Validation happens before any I/O.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory scanned (non-recursively) for PDF documents.
    pub docs_dir: PathBuf,
    /// Directory that holds the persistent vector index.
    pub store_dir: PathBuf,
    /// Collection name, used as the index file prefix inside `store_dir`.
    pub collection: String,
    /// Window length in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive windows on the same page.
    pub chunk_overlap: usize,
    /// Embedding model identifier, e.g. `char-ngram-128`.
    pub embedding_model: String,
    /// Result count used when the caller does not override it.
    pub default_top_k: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("docs"),
            store_dir: PathBuf::from("data/index"),
            collection: "scheme_compliance".to_string(),
            chunk_size: 1000,
            chunk_overlap: 200,
            embedding_model: "char-ngram-128".to_string(),
            default_top_k: 5,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize);
        }

        // overlap >= chunk_size would make the window offset stop advancing.
        if self.chunk_overlap >= self.chunk_size {
            return Err(ConfigError::OverlapTooLarge {
                overlap: self.chunk_overlap,
                chunk_size: self.chunk_size,
            });
        }

        if self.default_top_k == 0 {
            return Err(ConfigError::InvalidTopK);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Config;
    use crate::error::ConfigError;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let config = Config {
            chunk_size: 0,
            chunk_overlap: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidChunkSize)
        ));
    }

    #[test]
    fn overlap_equal_to_chunk_size_is_rejected() {
        let config = Config {
            chunk_size: 100,
            chunk_overlap: 100,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OverlapTooLarge { .. })
        ));
    }

    #[test]
    fn zero_top_k_is_rejected() {
        let config = Config {
            default_top_k: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTopK)));
    }
}
