use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::config::SearchSettings;
use crate::models::{ErrorResponse, HealthResponse, SearchRequest, SearchResponse};
use crate::services::{DataSource, LoadState, SearchError, SearchService};

/// Application state shared across all handlers
pub struct AppState<S> {
    pub search: Arc<SearchService<S>>,
    pub settings: SearchSettings,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            search: Arc::clone(&self.search),
            settings: self.settings.clone(),
        }
    }
}

/// Configure all search-related routes
pub fn configure<S: DataSource + 'static>(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check::<S>))
        .route("/search", web::get().to(search::<S>));
}

/// Health check endpoint
async fn health_check<S: DataSource + 'static>(state: web::Data<AppState<S>>) -> impl Responder {
    let load_state = state.search.load_state();
    let status = if load_state == LoadState::Ready { "healthy" } else { "starting" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        load_state,
        catalog_size: state.search.engine().map(|e| e.records().len()),
    })
}

/// Search endpoint
///
/// GET /api/v1/search?q={text}&lat={lat}&lng={lng}&radiusKm={km}&limit={n}
///
/// Text and location are both optional. Without a usable center and
/// radius the search is text-only; without text it is location-only.
async fn search<S: DataSource + 'static>(
    state: web::Data<AppState<S>>,
    req: web::Query<SearchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for search request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let query = req.to_query();
    let limit = state.settings.effective_limit(req.limit);

    let mut results = match state
        .search
        .run_with_timeout(&query, state.settings.timeout())
        .await
    {
        Ok(results) => results,
        Err(e @ SearchError::LoadError(_)) => {
            tracing::error!("Search unavailable: {}", e);
            return HttpResponse::ServiceUnavailable().json(ErrorResponse {
                error: "Catalog unavailable".to_string(),
                message: e.to_string(),
                status_code: 503,
            });
        }
        Err(e @ SearchError::TimedOut(_)) => {
            return HttpResponse::GatewayTimeout().json(ErrorResponse {
                error: "Search timed out".to_string(),
                message: e.to_string(),
                status_code: 504,
            });
        }
    };

    let total_results = results.len();
    results.truncate(limit);

    tracing::info!(
        "Returning {} of {} results for query {:?}",
        results.len(),
        total_results,
        query.text
    );

    HttpResponse::Ok().json(SearchResponse {
        results,
        total_results,
        query: query.text,
    })
}
