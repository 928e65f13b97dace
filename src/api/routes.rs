//! API route definitions

use axum::routing::get;
use axum::Router;

use super::envelope::ApiErrorResponse;
use super::handlers::{self, DashboardState};

/// Routes nested under `/api`.
pub fn api_routes(state: DashboardState) -> Router {
    Router::new()
        .route("/energy/summary", get(handlers::get_summary))
        .route("/energy/daily", get(handlers::get_daily))
        .route("/energy/timeline", get(handlers::get_timeline))
        .route("/energy/current", get(handlers::get_current))
        .route("/config", get(handlers::get_config).post(handlers::update_config))
        .route("/raw", get(handlers::get_raw))
        .fallback(|| async { ApiErrorResponse::not_found("No such API endpoint") })
        .with_state(state)
}

/// Liveness probe at the root.
pub fn health_routes() -> Router {
    Router::new().route("/health", get(handlers::health_check))
}
