//! Normalizers that rewrite a token stream before it reaches the index.
//!
//! The same normalizer runs at index time and at query time, so a query token
//! only matches postings written under the identical normalized text.

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for normalizers that transform token streams.
pub trait Normalizer: Send + Sync {
    /// Normalize a token stream, preserving token order.
    fn normalize(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this normalizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod english;
pub mod lowercase;

pub use english::EnglishNormalizer;
pub use lowercase::LowercaseNormalizer;
