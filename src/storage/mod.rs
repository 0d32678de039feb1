//! Persistence layer for Scour.
//!
//! Two stores share one set of async file primitives:
//!
//! - [`DocumentStore`] appends document payloads to segment files and hands
//!   out `segment:offset` locators.
//! - [`PostingStore`] keeps one postings file per token in a directory tree
//!   sharded by the token's characters.

pub mod allocator;
pub mod document_id;
pub mod document_store;
pub mod fs;
pub mod posting_store;

// Re-export commonly used types
pub use allocator::{SegmentAllocator, SegmentLease, SegmentState};
pub use document_id::DocumentId;
pub use document_store::{DocumentStore, DocumentStoreOptions};
pub use posting_store::{Posting, PostingStore};
