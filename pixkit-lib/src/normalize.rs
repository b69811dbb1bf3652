//! Text normalization for free-text BR Code fields (merchant name, city,
//! description).
//!
//! Scanners only accept a restricted alphabet in these fields, so input is
//! decomposed (NFD), combining marks are dropped, anything outside
//! `[A-Za-z0-9 ]` is removed, and the result is uppercased, trimmed and
//! truncated.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize `text` and truncate it to at most `max_len` characters.
///
/// Total function: never fails. An empty result is valid; callers substitute
/// their own default before placing it in a payload.
///
/// # Examples
///
/// ```rust
/// use pixkit_lib::normalize::normalize;
///
/// assert_eq!(normalize("  São Paulo ", 15), "SAO PAULO");
/// assert_eq!(normalize("Café & Cia.", 25), "CAFE  CIA");
/// ```
pub fn normalize(text: &str, max_len: usize) -> String {
    let cleaned: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .map(|c| c.to_ascii_uppercase())
        .collect();

    cleaned.trim().chars().take(max_len).collect()
}

/// Normalize `text`, falling back to `default` when nothing survives.
pub fn normalize_or(text: &str, max_len: usize, default: &str) -> String {
    let normalized = normalize(text, max_len);
    if normalized.is_empty() {
        normalize(default, max_len)
    } else {
        normalized
    }
}
