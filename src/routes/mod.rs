// Route exports
pub mod search;

use actix_web::web;

use crate::services::DataSource;

pub fn configure_routes<S: DataSource + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(search::configure::<S>),
    );
}
