//! Configuration for the indexer.
//!
//! # Example
//!
//! ```
//! use scour::engine::config::IndexerConfig;
//!
//! let config = IndexerConfig::new("/tmp/scour-example")
//!     .with_shard_chunk_size(3)
//!     .with_read_chunk_size(1024);
//!
//! assert!(config.validate().is_ok());
//! assert!(config.documents_dir().ends_with("docs"));
//! assert!(config.index_dir().ends_with("index"));
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScourError};
use crate::storage::document_store::{
    DEFAULT_READ_CHUNK_SIZE, DEFAULT_SEGMENT_PREFIX, DocumentStoreOptions,
};
use crate::storage::posting_store::{DEFAULT_SHARD_CHUNK_SIZE, MAX_SHARD_CHUNK_SIZE};

/// Subdirectory of `data_dir` holding document segments.
pub const DOCUMENTS_DIR: &str = "docs";

/// Subdirectory of `data_dir` holding the postings shard tree.
pub const INDEX_DIR: &str = "index";

/// Settings for an [`Indexer`](crate::engine::Indexer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexerConfig {
    /// Root directory; documents go to `docs/`, postings to `index/`.
    pub data_dir: PathBuf,

    /// Characters per shard directory in the postings tree.
    pub shard_chunk_size: usize,

    /// Window size in bytes for document reads.
    pub read_chunk_size: usize,

    /// File name prefix of document segments.
    pub segment_prefix: String,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        IndexerConfig {
            data_dir: PathBuf::from("/tmp/scour"),
            shard_chunk_size: DEFAULT_SHARD_CHUNK_SIZE,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            segment_prefix: DEFAULT_SEGMENT_PREFIX.to_string(),
        }
    }
}

impl IndexerConfig {
    /// Default settings rooted at `data_dir`.
    pub fn new<P: Into<PathBuf>>(data_dir: P) -> Self {
        IndexerConfig {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Load settings from a JSON file. Missing keys take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: IndexerConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_data_dir<P: Into<PathBuf>>(mut self, data_dir: P) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_shard_chunk_size(mut self, shard_chunk_size: usize) -> Self {
        self.shard_chunk_size = shard_chunk_size;
        self
    }

    pub fn with_read_chunk_size(mut self, read_chunk_size: usize) -> Self {
        self.read_chunk_size = read_chunk_size;
        self
    }

    pub fn with_segment_prefix<S: Into<String>>(mut self, segment_prefix: S) -> Self {
        self.segment_prefix = segment_prefix.into();
        self
    }

    /// Check every setting, reporting the first invalid one.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_SHARD_CHUNK_SIZE).contains(&self.shard_chunk_size) {
            return Err(ScourError::invalid_config(format!(
                "shard_chunk_size must be between 1 and {MAX_SHARD_CHUNK_SIZE}, got {}",
                self.shard_chunk_size
            )));
        }

        if self.read_chunk_size == 0 {
            return Err(ScourError::invalid_config(
                "read_chunk_size must be positive",
            ));
        }

        // The prefix ends up inside locators and postings records.
        if self.segment_prefix.is_empty()
            || !self
                .segment_prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ScourError::invalid_config(format!(
                "segment_prefix must be non-empty ASCII alphanumerics, '-' or '_', got {:?}",
                self.segment_prefix
            )));
        }

        Ok(())
    }

    /// Directory of the document store.
    pub fn documents_dir(&self) -> PathBuf {
        self.data_dir.join(DOCUMENTS_DIR)
    }

    /// Directory of the posting store.
    pub fn index_dir(&self) -> PathBuf {
        self.data_dir.join(INDEX_DIR)
    }

    /// Options for opening the document store.
    pub fn document_store_options(&self) -> DocumentStoreOptions {
        DocumentStoreOptions {
            segment_prefix: self.segment_prefix.clone(),
            read_chunk_size: self.read_chunk_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = IndexerConfig::default();
        assert_eq!(config.shard_chunk_size, 2);
        assert_eq!(config.read_chunk_size, 4096);
        assert_eq!(config.segment_prefix, "data");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = IndexerConfig::new("/tmp/x");

        for config in [
            base.clone().with_shard_chunk_size(0),
            base.clone().with_shard_chunk_size(4),
            base.clone().with_read_chunk_size(0),
            base.clone().with_segment_prefix(""),
            base.clone().with_segment_prefix("da:ta"),
            base.clone().with_segment_prefix("a/b"),
        ] {
            assert!(matches!(
                config.validate(),
                Err(ScourError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn test_from_file_fills_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scour.json");
        std::fs::write(
            &path,
            r#"{"data_dir": "/var/lib/scour", "shard_chunk_size": 3}"#,
        )
        .unwrap();

        let config = IndexerConfig::from_file(&path).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/scour"));
        assert_eq!(config.shard_chunk_size, 3);
        assert_eq!(config.read_chunk_size, 4096);
        assert_eq!(config.segment_prefix, "data");
    }

    #[test]
    fn test_from_file_validates() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("scour.json");
        std::fs::write(&path, r#"{"shard_chunk_size": 0}"#).unwrap();

        assert!(matches!(
            IndexerConfig::from_file(&path),
            Err(ScourError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_store_layout() {
        let config = IndexerConfig::new("/srv/search").with_read_chunk_size(10);
        assert_eq!(config.documents_dir(), PathBuf::from("/srv/search/docs"));
        assert_eq!(config.index_dir(), PathBuf::from("/srv/search/index"));
        assert_eq!(config.document_store_options().read_chunk_size, 10);
    }
}
