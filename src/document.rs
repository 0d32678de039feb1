//! Documents accepted by the indexer.
//!
//! A [`Document`] has the two fields the engine searches (`title` and `data`)
//! plus any number of caller fields, which are stored and returned verbatim.
//!
//! # Examples
//!
//! ```
//! use scour::document::Document;
//!
//! let doc: Document = serde_json::from_str(
//!     r#"{"id": "1", "title": "quick fox", "data": "A fox is usually quick and brown."}"#,
//! ).unwrap();
//!
//! assert_eq!(doc.searchable_text(), "quick fox A fox is usually quick and brown.");
//! assert_eq!(doc.extra["id"], "1");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;

/// JSON escape written in place of `|` in stored payloads.
const PIPE_ESCAPE: &[u8] = br"\u007c";

/// A searchable document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Title, indexed ahead of the body.
    pub title: String,

    /// Body text.
    pub data: String,

    /// Caller-defined fields, kept for the round trip but never indexed.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    /// Create a document with no extra fields.
    pub fn new<T: Into<String>, D: Into<String>>(title: T, data: D) -> Self {
        Document {
            title: title.into(),
            data: data.into(),
            extra: Map::new(),
        }
    }

    /// Attach a caller-defined field.
    pub fn with_field<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// The text the indexer tokenizes: title, a space, then the body.
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.title, self.data)
    }

    /// Serialize to the payload stored in the document store.
    ///
    /// The payload is compact JSON with every `|` written as `\u007c`, so it
    /// never contains the store's record delimiter. `|` only occurs inside
    /// JSON strings, where the escape decodes back to the same character.
    pub fn to_payload(&self) -> Result<Vec<u8>> {
        let json = serde_json::to_vec(self)?;

        let mut payload = Vec::with_capacity(json.len());
        for byte in json {
            if byte == b'|' {
                payload.extend_from_slice(PIPE_ESCAPE);
            } else {
                payload.push(byte);
            }
        }
        Ok(payload)
    }

    /// Rebuild a document from a stored payload.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(payload)?)
    }
}
