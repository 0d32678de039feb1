//! Document locators.
//!
//! A [`DocumentId`] names the segment a document was appended to and the byte
//! offset where its payload begins. Its string form is `segment:offset`, and
//! that string is what the posting store records.
//!
//! ```
//! use scour::storage::DocumentId;
//!
//! let id: DocumentId = "data-1a2b3:100".parse().unwrap();
//! assert_eq!(id.segment(), "data-1a2b3");
//! assert_eq!(id.offset(), 100);
//! assert_eq!(id.to_string(), "data-1a2b3:100");
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::ScourError;

/// Separator between segment name and offset in the string form.
pub const LOCATOR_SEPARATOR: char = ':';

/// Location of a stored document: `(segment, byte offset)`.
///
/// Ordering is by segment name, then offset. The ranker uses it to break
/// score ties deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId {
    segment: String,
    offset: u64,
}

impl DocumentId {
    /// Create a locator for `offset` within `segment`.
    pub fn new<S: Into<String>>(segment: S, offset: u64) -> Self {
        DocumentId {
            segment: segment.into(),
            offset,
        }
    }

    /// Name of the segment file holding the document.
    pub fn segment(&self) -> &str {
        &self.segment
    }

    /// Byte offset where the document starts.
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.segment, LOCATOR_SEPARATOR, self.offset)
    }
}

impl FromStr for DocumentId {
    type Err = ScourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (segment, offset) = s
            .rsplit_once(LOCATOR_SEPARATOR)
            .ok_or_else(|| ScourError::malformed_document_id(s))?;

        // The segment name becomes a file name inside the documents directory.
        if segment.is_empty()
            || segment == "."
            || segment == ".."
            || segment.contains(['/', '\\'])
        {
            return Err(ScourError::malformed_document_id(s));
        }

        if offset.is_empty() || !offset.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ScourError::malformed_document_id(s));
        }
        let offset = offset
            .parse::<u64>()
            .map_err(|_| ScourError::malformed_document_id(s))?;

        Ok(DocumentId::new(segment, offset))
    }
}
