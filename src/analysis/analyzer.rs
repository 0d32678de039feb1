//! Analyzer that chains a tokenizer with a normalizer.
//!
//! Index time and query time both run text through the same analyzer, which
//! is what makes query tokens line up with the postings written at ingest.
//!
//! # Examples
//!
//! ```
//! use scour::analysis::analyzer::Analyzer;
//!
//! let analyzer = Analyzer::default();
//! let tokens = analyzer.analyze("A quick  brown fox.").unwrap();
//! assert_eq!(tokens, vec!["a", "quick", "brown", "fox"]);
//! ```

use std::fmt;
use std::sync::Arc;

use crate::analysis::normalizer::{EnglishNormalizer, Normalizer};
use crate::analysis::tokenizer::{Tokenizer, WhitespaceTokenizer};
use crate::error::Result;

/// A tokenizer followed by a normalizer.
#[derive(Clone)]
pub struct Analyzer {
    tokenizer: Arc<dyn Tokenizer>,
    normalizer: Arc<dyn Normalizer>,
}

impl Analyzer {
    /// Create an analyzer from the given capabilities.
    pub fn new(tokenizer: Arc<dyn Tokenizer>, normalizer: Arc<dyn Normalizer>) -> Self {
        Analyzer {
            tokenizer,
            normalizer,
        }
    }

    /// Replace the tokenizer.
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Replace the normalizer.
    pub fn with_normalizer(mut self, normalizer: Arc<dyn Normalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Get the tokenizer used by this analyzer.
    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    /// Get the normalizer used by this analyzer.
    pub fn normalizer(&self) -> &Arc<dyn Normalizer> {
        &self.normalizer
    }

    /// Tokenize then normalize `text`, returning token texts in order.
    ///
    /// Duplicates are kept; term frequencies are derived from them.
    pub fn analyze(&self, text: &str) -> Result<Vec<String>> {
        let tokens = self.tokenizer.tokenize(text)?;
        let normalized = self.normalizer.normalize(tokens)?;
        Ok(normalized.map(|token| token.text).collect())
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Analyzer::new(
            Arc::new(WhitespaceTokenizer::new()),
            Arc::new(EnglishNormalizer::new()),
        )
    }
}

impl fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analyzer")
            .field("tokenizer", &self.tokenizer.name())
            .field("normalizer", &self.normalizer.name())
            .finish()
    }
}
