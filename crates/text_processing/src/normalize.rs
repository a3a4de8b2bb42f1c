//! Text normalization for keyword matching

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Punctuation removed before matching
const STRIPPED_PUNCTUATION: &[char] = &[
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '-', '_', '`', '~',
    '(', ')',
];

/// Lowercase, strip accents and punctuation, trim.
///
/// Idempotent: `normalize_text(&normalize_text(s)) == normalize_text(s)`.
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| !STRIPPED_PUNCTUATION.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// True when any keyword is a substring of the (already normalized) text
pub fn contains_any(normalized: &str, keywords: &[&str]) -> bool {
    !normalized.is_empty() && keywords.iter().any(|keyword| normalized.contains(keyword))
}
