/// Portuguese function words excluded from indexing and querying
///
/// Entries are stored normalized ("até" -> "ate") because every token is
/// normalized before it is checked.
pub const STOPWORDS: &[&str] = &[
    // Articles
    "a", "o", "os", "as", "um", "uma", "uns", "umas",
    // "de" and contractions
    "de", "da", "do", "das", "dos", "d",
    // Conjunctions and prepositions
    "e", "ou", "com", "sem", "por", "para", "pra", "pro", "per",
    "no", "na", "nos", "nas", "em", "num", "numa", "nuns", "numas",
    "ao", "aos", "que", "se", "sobre", "ate", "apos", "entre", "contra",
];

/// Check whether a token should be dropped
///
/// Empty and whitespace-only tokens count as stopwords.
#[inline]
pub fn is_stopword(token: &str) -> bool {
    let token = token.trim();
    token.is_empty() || STOPWORDS.contains(&token)
}
