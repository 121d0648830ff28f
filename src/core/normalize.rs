use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::core::stopwords::is_stopword;

/// Normalize a string for indexing and querying
///
/// 1. Lowercase
/// 2. NFD decompose and drop combining marks ("pedreiro elétrico" -> "pedreiro eletrico")
/// 3. Replace anything outside `[a-z0-9]` and whitespace with a space
/// 4. Collapse whitespace runs and trim
///
/// Letters that do not decompose to ASCII (e.g. "ß", "ø") are treated as
/// separators, the same as punctuation.
pub fn normalize(raw: &str) -> String {
    let mapped: String = raw
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                ' '
            }
        })
        .collect();

    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize and split into tokens, dropping stopwords and empty tokens
///
/// Token order follows the input; duplicates are kept.
pub fn tokenize(raw: &str) -> Vec<String> {
    normalize(raw)
        .split(' ')
        .filter(|t| !is_stopword(t))
        .map(str::to_string)
        .collect()
}
