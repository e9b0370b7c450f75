use axum::routing::{get, post};
use axum::Router;
use std::path::Path;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

pub mod health;
pub mod metrics;
pub mod render;

/// Build the HTTP application: render API plus the project's data, static and environment-map assets.
///
/// `/env` is a shorthand for `<static_dir>/env`.
pub fn router(state: AppState, data_dir: &Path, static_dir: &Path) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::prometheus_metrics))
        .route("/api/generate", post(render::generate_animation))
        .route("/api/status/{job_id}", get(render::get_status))
        .route("/api/download/{filename}", get(render::download_file))
        .nest_service("/data", ServeDir::new(data_dir))
        .nest_service("/static", ServeDir::new(static_dir))
        .nest_service("/env", ServeDir::new(static_dir.join("env")))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(1024 * 1024)) // 1 MB limit
}
