use std::collections::HashSet;

use crate::core::index::InvertedIndex;
use crate::models::{ProfessionalRecord, RankedResult};

/// Rank records against a token set
///
/// 1. Union the posting sets of every token into a candidate set
/// 2. If that is empty, keep every record whose normalized blob contains
///    any token as a raw substring (not token-boundary aware)
/// 3. Score = number of distinct tokens whose posting set holds the record
/// 4. Stable sort by score descending; ties keep the order in which
///    candidates were first encountered (token order, then catalog order)
///
/// An empty token list yields no results.
pub fn score_candidates(
    tokens: &[String],
    index: &InvertedIndex,
    records: &[ProfessionalRecord],
) -> Vec<RankedResult> {
    score_expanded(tokens, tokens, index, records)
}

/// Same as [`score_candidates`], with the fallback keyed on the base tokens
///
/// The substring scan runs when none of `base` has postings. It scans with
/// all of `expanded` and its matches are unioned with any index hits that
/// came from synonyms, so adding synonyms never shrinks the result set.
pub fn score_expanded(
    base: &[String],
    expanded: &[String],
    index: &InvertedIndex,
    records: &[ProfessionalRecord],
) -> Vec<RankedResult> {
    if expanded.is_empty() {
        return Vec::new();
    }

    // Encounter order: expanded-token order, each posting in catalog order,
    // then fallback additions
    let mut seen: HashSet<&str> = HashSet::new();
    let mut candidates: Vec<&ProfessionalRecord> = Vec::new();
    for token in expanded {
        let Some(posting) = index.postings(token) else {
            continue;
        };
        for record in records {
            if posting.contains(&record.id) && seen.insert(record.id.as_str()) {
                candidates.push(record);
            }
        }
    }

    let base_hit = base.iter().any(|t| index.postings(t).is_some());
    if !base_hit {
        let before = candidates.len();
        for record in records {
            if seen.contains(record.id.as_str()) {
                continue;
            }
            let blob = record.search_blob();
            if expanded.iter().any(|t| blob.contains(t.as_str())) {
                seen.insert(record.id.as_str());
                candidates.push(record);
            }
        }
        tracing::trace!(
            "Substring fallback added {} candidates",
            candidates.len() - before
        );
    }

    if candidates.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<RankedResult> = candidates
        .into_iter()
        .map(|record| {
            let score = expanded
                .iter()
                .filter(|t| index.contains(t, &record.id))
                .count() as u32;
            RankedResult::new(record.clone(), score)
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}
