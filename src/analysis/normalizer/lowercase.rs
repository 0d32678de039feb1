//! Lowercase normalizer implementation.

use crate::analysis::normalizer::Normalizer;
use crate::analysis::token::TokenStream;
use crate::error::Result;

/// A normalizer that only lowercases tokens, keeping every other character.
#[derive(Clone, Debug, Default)]
pub struct LowercaseNormalizer;

impl LowercaseNormalizer {
    /// Create a new lowercase normalizer.
    pub fn new() -> Self {
        LowercaseNormalizer
    }
}

impl Normalizer for LowercaseNormalizer {
    fn normalize(&self, tokens: TokenStream) -> Result<TokenStream> {
        let normalized = tokens
            .map(|token| token.with_text(token.text.to_lowercase()))
            .collect::<Vec<_>>();

        Ok(Box::new(normalized.into_iter()))
    }

    fn name(&self) -> &'static str {
        "lowercase"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::Token;

    #[test]
    fn test_lowercase_normalizer() {
        let normalizer = LowercaseNormalizer::new();
        let tokens = vec![Token::new("Hello", 0), Token::new("WORLD!", 1)];

        let result: Vec<Token> = normalizer
            .normalize(Box::new(tokens.into_iter()))
            .unwrap()
            .collect();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].text, "hello");
        assert_eq!(result[1].text, "world!");
    }

    #[test]
    fn test_normalizer_name() {
        assert_eq!(LowercaseNormalizer::new().name(), "lowercase");
    }
}
