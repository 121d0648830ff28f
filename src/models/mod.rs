// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{GeoCenter, GeoPoint, ProfessionalRecord, RankedResult, RecordError, SearchQuery};
pub use requests::SearchRequest;
pub use responses::{ErrorResponse, HealthResponse, SearchResponse};
