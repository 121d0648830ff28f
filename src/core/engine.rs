use crate::core::{
    filters::geo_filter,
    index::{build_index, InvertedIndex},
    normalize::{normalize, tokenize},
    scoring::score_expanded,
    synonyms::SynonymTable,
};
use crate::models::{ProfessionalRecord, RankedResult, SearchQuery};

/// Immutable search state: catalog, inverted index and synonym table
///
/// Built once from a loaded catalog. Every query works on call-local data,
/// so a shared `&SearchEngine` serves concurrent searches without locking.
///
/// # Query paths
/// 1. No text, no geo: empty
/// 2. No text, geo: whole catalog filtered and sorted by distance (score 0)
/// 3. Only stopwords: empty, with or without geo
/// 4. Text: ranked by matching token count
/// 5. Text + geo: ranked, then geo-filtered and re-sorted by distance
#[derive(Debug, Clone)]
pub struct SearchEngine {
    records: Vec<ProfessionalRecord>,
    index: InvertedIndex,
    synonyms: SynonymTable,
}

impl SearchEngine {
    pub fn new(records: Vec<ProfessionalRecord>, synonyms: SynonymTable) -> Self {
        let index = build_index(&records);
        Self {
            records,
            index,
            synonyms,
        }
    }

    pub fn records(&self) -> &[ProfessionalRecord] {
        &self.records
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    pub fn synonyms(&self) -> &SynonymTable {
        &self.synonyms
    }

    /// Run a query against the loaded catalog
    pub fn search(&self, query: &SearchQuery) -> Vec<RankedResult> {
        let geo = query.geo_constraint();
        let base = tokenize(&query.text);

        if base.is_empty() {
            // Whitespace/punctuation-only text counts as no text; a
            // stopword-only query never matches
            let has_text = !normalize(&query.text).is_empty();
            return match geo {
                Some((center, radius)) if !has_text => {
                    tracing::trace!("Geo-only search within {} km", radius);
                    let all = self
                        .records
                        .iter()
                        .map(|r| RankedResult::new(r.clone(), 0))
                        .collect();
                    geo_filter(all, Some(center), radius)
                }
                _ => Vec::new(),
            };
        }

        let expanded = self.synonyms.expand_tokens(&base);
        tracing::trace!("Query tokens {:?} expanded to {:?}", base, expanded);

        let ranked = score_expanded(&base, &expanded, &self.index, &self.records);

        match geo {
            Some((center, radius)) => geo_filter(ranked, Some(center), radius),
            None => ranked,
        }
    }
}
