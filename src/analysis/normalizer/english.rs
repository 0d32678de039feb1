//! English language normalizer.
//!
//! Lowercases every token and strips each character outside `a-z`, so
//! `"Dog."` and `"dog"` index to the same postings. Tokens left empty by the
//! stripping (numbers, lone punctuation) are dropped.
//!
//! # Examples
//!
//! ```
//! use scour::analysis::normalizer::Normalizer;
//! use scour::analysis::normalizer::english::EnglishNormalizer;
//! use scour::analysis::token::Token;
//!
//! let normalizer = EnglishNormalizer::new();
//! let tokens = vec![Token::new("Two", 0), Token::new("words.", 1)];
//! let normalized: Vec<_> = normalizer
//!     .normalize(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(normalized[0].text, "two");
//! assert_eq!(normalized[1].text, "words");
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::analysis::normalizer::Normalizer;
use crate::analysis::token::TokenStream;
use crate::error::Result;

static NON_LETTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^a-z]+").expect("static pattern is valid"));

/// A normalizer for English text: lowercase, letters only.
#[derive(Clone, Debug, Default)]
pub struct EnglishNormalizer;

impl EnglishNormalizer {
    /// Create a new English normalizer.
    pub fn new() -> Self {
        EnglishNormalizer
    }
}

impl Normalizer for EnglishNormalizer {
    fn normalize(&self, tokens: TokenStream) -> Result<TokenStream> {
        let normalized = tokens
            .filter_map(|token| {
                let lowered = token.text.to_lowercase();
                let letters = NON_LETTERS.replace_all(&lowered, "");
                if letters.is_empty() {
                    None
                } else {
                    Some(token.with_text(letters.into_owned()))
                }
            })
            .collect::<Vec<_>>();

        Ok(Box::new(normalized.into_iter()))
    }

    fn name(&self) -> &'static str {
        "english"
    }
}
