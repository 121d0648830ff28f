//! Nommad Search - text and geographic search over the professionals catalog
//!
//! Free-text queries are normalized, stripped of Portuguese stopwords,
//! expanded through a synonym table and ranked against an inverted index.
//! An optional center and radius restrict results by great-circle distance.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{haversine_distance, normalize, SearchEngine};
pub use models::{GeoCenter, GeoPoint, ProfessionalRecord, RankedResult, SearchQuery};
pub use services::{DataSource, DocumentSource, LoadState, SearchError, SearchService, StaticSource};
