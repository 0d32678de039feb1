//! Text analysis module for Scour.
//!
//! Turns raw text into the ordered token texts that the posting store indexes:
//! a [`Tokenizer`] splits text, a [`Normalizer`] rewrites the tokens, and an
//! [`Analyzer`] chains the two.

pub mod analyzer;
pub mod normalizer;
pub mod token;
pub mod tokenizer;

// Re-export commonly used types
pub use analyzer::Analyzer;
pub use normalizer::{EnglishNormalizer, LowercaseNormalizer, Normalizer};
pub use token::{Token, TokenStream};
pub use tokenizer::{Tokenizer, UnicodeWordTokenizer, WhitespaceTokenizer};
