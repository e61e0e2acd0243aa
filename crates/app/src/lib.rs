#![forbid(unsafe_code)]

pub mod config;
pub mod dto;
pub mod error;
pub mod logging;
pub mod routes;

use axum::Router;
use services::AppServices;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use config::Config;
pub use error::AppError;
pub use routes::AppState;

/// Full HTTP app over the given services, with request tracing and permissive CORS.
pub fn create_app(services: &AppServices) -> Router {
    routes::router(AppState::new(services.quiz_loop()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
