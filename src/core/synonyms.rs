//! Synonym table and query expansion

use std::collections::{HashMap, HashSet};

use crate::core::normalize::normalize;
use crate::core::stopwords::is_stopword;

/// normalized term -> alternate raw terms
#[derive(Debug, Default, Clone)]
pub struct SynonymTable {
    entries: HashMap<String, Vec<String>>,
}

impl SynonymTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(term, alternates)` pairs
    ///
    /// Terms are normalized here so lookups by query token always hit;
    /// entries whose terms normalize equal are merged. Alternates stay raw.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        let mut table = Self::new();
        for (term, alternates) in entries {
            let key = normalize(term.as_ref());
            if key.is_empty() {
                continue;
            }
            table
                .entries
                .entry(key)
                .or_default()
                .extend(alternates.into_iter().map(Into::into));
        }
        table
    }

    /// Alternates configured for a normalized term
    pub fn get(&self, term: &str) -> Option<&[String]> {
        self.entries.get(term).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add the normalized synonyms of each token
    ///
    /// Every input token is kept. Output is deduplicated in first-seen
    /// order; alternates that normalize to empty or to a stopword are
    /// dropped.
    pub fn expand_tokens(&self, tokens: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(tokens.len());

        for token in tokens {
            if seen.insert(token.clone()) {
                out.push(token.clone());
            }

            let Some(alternates) = self.get(token) else {
                continue;
            };

            for alternate in alternates {
                let normalized = normalize(alternate);
                if is_stopword(&normalized) {
                    continue;
                }
                if seen.insert(normalized.clone()) {
                    out.push(normalized);
                }
            }
        }

        out
    }
}

/// Expand `tokens` through `table`
pub fn expand_tokens(table: &SynonymTable, tokens: &[String]) -> Vec<String> {
    table.expand_tokens(tokens)
}
