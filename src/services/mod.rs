// Service exports
pub mod catalog;
pub mod search;
pub mod source;

pub use catalog::{load_engine, parse_catalog, parse_synonyms, Catalog, CatalogError};
pub use search::{LoadState, SearchError, SearchService};
pub use source::{DataSource, DocumentLocation, DocumentSource, SourceError, StaticSource};
