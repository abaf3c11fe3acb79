//! Case and punctuation normalizing tokenizer.
//!
//! This is the only text normalization the engine performs. There is no
//! stemming, stop-word removal, or language-specific segmentation.
//!
//! # Algorithm
//!
//! 1. Lower-case the input unless `case_sensitive` is set.
//! 2. Replace every character that is not a letter, digit, whitespace,
//!    or hyphen with a space.
//! 3. Split on whitespace runs.
//! 4. Drop tokens of one character or less.
//!
//! # Example
//!
//! ```rust
//! use connector_retrieval_core::tokenize::tokenize;
//!
//! let tokens = tokenize("Hello, World! A well-known e-mail.", false);
//! assert_eq!(tokens, vec!["hello", "world", "well-known", "e-mail"]);
//! ```

use std::collections::HashSet;

/// Tokenize `text` into normalized terms.
///
/// Empty or whitespace-only input yields zero tokens.
pub fn tokenize(text: &str, case_sensitive: bool) -> Vec<String> {
    let cased = if case_sensitive {
        text.to_string()
    } else {
        text.to_lowercase()
    };

    let cleaned: String = cased
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || c == '-' {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|t| t.chars().count() > 1)
        .map(String::from)
        .collect()
}

/// Deduplicate a token sequence, keeping first-occurrence order.
pub fn unique_terms(tokens: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tokens
        .iter()
        .filter(|t| seen.insert(t.as_str()))
        .cloned()
        .collect()
}
