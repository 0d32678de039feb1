//! Error types for the Scour library.
//!
//! All fallible operations return [`Result`], whose error side is the
//! [`ScourError`] enum. Missing count sidecars and missing postings files are
//! not errors: the stores absorb them as zero counts and empty postings.
//!
//! # Examples
//!
//! ```
//! use scour::error::{Result, ScourError};
//!
//! fn example_operation() -> Result<()> {
//!     Err(ScourError::corrupt("segment count is not a number"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for Scour operations.
#[derive(Error, Debug)]
pub enum ScourError {
    /// I/O errors from the underlying filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A document id string that does not parse as `segment:offset`.
    #[error("Malformed document id: {0}")]
    MalformedDocumentId(String),

    /// A document id pointing at or past the end of its segment.
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// A payload the document store cannot read back unchanged.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Persisted data that cannot be interpreted.
    #[error("Corrupt data: {0}")]
    Corrupt(String),

    /// Invalid configuration values.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with ScourError.
pub type Result<T> = std::result::Result<T, ScourError>;

impl ScourError {
    /// Create a new malformed document id error.
    pub fn malformed_document_id<S: Into<String>>(id: S) -> Self {
        ScourError::MalformedDocumentId(id.into())
    }

    /// Create a new document not found error.
    pub fn document_not_found<S: Into<String>>(id: S) -> Self {
        ScourError::DocumentNotFound(id.into())
    }

    /// Create a new invalid payload error.
    pub fn invalid_payload<S: Into<String>>(msg: S) -> Self {
        ScourError::InvalidPayload(msg.into())
    }

    /// Create a new corrupt data error.
    pub fn corrupt<S: Into<String>>(msg: S) -> Self {
        ScourError::Corrupt(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        ScourError::InvalidConfig(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        ScourError::Other(msg.into())
    }

    /// Whether this error is an I/O error of kind `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ScourError::Io(e) if e.kind() == io::ErrorKind::NotFound)
    }
}
