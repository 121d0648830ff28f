// Core algorithm exports
pub mod distance;
pub mod engine;
pub mod filters;
pub mod index;
pub mod normalize;
pub mod scoring;
pub mod stopwords;
pub mod synonyms;

pub use distance::{distance_km, haversine_distance};
pub use engine::SearchEngine;
pub use filters::geo_filter;
pub use index::{build_index, InvertedIndex};
pub use normalize::{normalize, tokenize};
pub use scoring::{score_candidates, score_expanded};
pub use stopwords::is_stopword;
pub use synonyms::{expand_tokens, SynonymTable};
