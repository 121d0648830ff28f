//! Inverted index over the professionals catalog
//!
//! Maps each normalized token to the set of record identifiers whose name,
//! category or keywords contain it. Built once after load, read-only after.

use std::collections::{HashMap, HashSet};

use crate::core::normalize::tokenize;
use crate::models::ProfessionalRecord;

/// token -> Set<record id>
#[derive(Debug, Default, Clone)]
pub struct InvertedIndex {
    postings: HashMap<String, HashSet<String>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Posting set for a token, if any record contains it
    pub fn postings(&self, token: &str) -> Option<&HashSet<String>> {
        self.postings.get(token)
    }

    /// Whether `token`'s posting set contains `id`
    #[inline]
    pub fn contains(&self, token: &str, id: &str) -> bool {
        self.postings
            .get(token)
            .is_some_and(|ids| ids.contains(id))
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }

    /// Number of distinct tokens
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    fn insert(&mut self, token: String, id: &str) {
        self.postings.entry(token).or_default().insert(id.to_string());
    }
}

/// Distinct tokens of a record's keywords, category and name
///
/// Each field is tokenized on its own so tokens never straddle fields.
pub fn record_tokens(record: &ProfessionalRecord) -> HashSet<String> {
    record
        .keywords
        .iter()
        .map(String::as_str)
        .chain([record.category.as_str(), record.name.as_str()])
        .flat_map(tokenize)
        .collect()
}

/// Build the inverted index for a catalog
pub fn build_index(records: &[ProfessionalRecord]) -> InvertedIndex {
    let mut index = InvertedIndex::new();

    for record in records {
        for token in record_tokens(record) {
            index.insert(token, &record.id);
        }
    }

    tracing::debug!("Indexed {} records into {} tokens", records.len(), index.len());
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<ProfessionalRecord> {
        vec![
            ProfessionalRecord::new("1", "Carlos Pintor", "Pintura", vec!["pintor residencial".into(), "Pintor".into()]),
            ProfessionalRecord::new("2", "Maria de Souza", "Elétrica", vec!["eletricista".into(), "tomadas".into()]),
            ProfessionalRecord::new("3", "Pedro", "Pintura", vec!["grafite".into()]),
        ]
    }

    #[test]
    fn test_build_index_postings() {
        let index = build_index(&sample());

        let pintor = index.postings("pintor").unwrap();
        assert_eq!(pintor.len(), 1);
        assert!(pintor.contains("1"));

        let pintura = index.postings("pintura").unwrap();
        assert!(pintura.contains("1") && pintura.contains("3"));

        assert!(index.contains("eletrica", "2"));
        assert!(index.contains("souza", "2"));
    }

    #[test]
    fn test_stopwords_not_indexed() {
        let index = build_index(&sample());
        assert!(index.postings("de").is_none());
        assert!(index.tokens().all(|t| !t.is_empty()));
    }

    #[test]
    fn test_record_tokens_deduplicated() {
        let tokens = record_tokens(&sample()[0]);
        let mut sorted: Vec<_> = tokens.into_iter().collect();
        sorted.sort();
        assert_eq!(sorted, vec!["carlos", "pintor", "pintura", "residencial"]);
    }

    #[test]
    fn test_every_indexed_id_contains_token() {
        let records = sample();
        let index = build_index(&records);
        for token in index.tokens() {
            for id in index.postings(token).unwrap() {
                let record = records.iter().find(|r| &r.id == id).unwrap();
                assert!(record_tokens(record).contains(token));
            }
        }
    }

    #[test]
    fn test_empty_catalog() {
        let index = build_index(&[]);
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
    }
}
