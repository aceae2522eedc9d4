//! Case folding and the reversible apostrophe escape.
//!
//! Apostrophes are common inside Zapotec words and are stored as a backtick
//! so they survive exact-match filters on the store side.

use super::punctuation::is_punctuation;

pub const APOSTROPHE: char = '\'';
pub const APOSTROPHE_PLACEHOLDER: char = '`';

/// Lowercase and escape apostrophes. Used as the cache key.
pub fn normalize(text: &str) -> String {
    escape_apostrophes(&text.to_lowercase())
}

pub fn escape_apostrophes(text: &str) -> String {
    text.replace(APOSTROPHE, &APOSTROPHE_PLACEHOLDER.to_string())
}

pub fn denormalize(text: &str) -> String {
    text.replace(APOSTROPHE_PLACEHOLDER, &APOSTROPHE.to_string())
}

/// Split text into lookup tokens.
///
/// Punctuation is stripped before the apostrophe escape, since the
/// placeholder itself belongs to the punctuation set.
pub fn tokenize(text: &str) -> Vec<String> {
    let stripped: String = text
        .to_lowercase()
        .chars()
        .filter(|c| !is_punctuation(*c))
        .collect();

    escape_apostrophes(&stripped)
        .split_whitespace()
        .map(|s| s.to_string())
        .collect()
}
