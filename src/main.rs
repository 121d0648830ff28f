use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use nommad_search::config::Settings;
use nommad_search::routes::{self, search::AppState};
use nommad_search::services::{DocumentLocation, DocumentSource, SearchService};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// JSON error response for query string errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .json(self)
    }
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("Query payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load();

    // Logging comes from settings; RUST_LOG overrides the level
    let logging = settings.as_ref().map(|s| s.logging.clone()).unwrap_or_default();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| logging.env_filter());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if logging.is_pretty() {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Nommad search service...");

    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    info!("Configuration loaded successfully");

    let source = DocumentSource::new(
        DocumentLocation::parse(&settings.data.catalog),
        settings.data.synonyms.as_deref().map(DocumentLocation::parse),
        settings.data.fetch_timeout(),
    );

    info!("Catalog source: {}", source.catalog_location());

    let search = Arc::new(SearchService::new(source));

    // Optional eager load; on failure the first query retries
    if settings.data.preload {
        match search.load().await {
            Ok(engine) => info!("Catalog preloaded ({} professionals)", engine.records().len()),
            Err(e) => warn!("Catalog preload failed, will retry on first query: {}", e),
        }
    }

    let app_state = AppState {
        search,
        settings: settings.search.clone(),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes::<DocumentSource>)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
