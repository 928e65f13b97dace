//! REST API module using Axum
//!
//! JSON endpoints for the separator energy dashboard:
//! - `/api/energy/*` report endpoints (summary, daily, timeline, current)
//! - `/api/config` runtime electrical config (GET/POST)
//! - `/api/raw` raw tag inspection
//! - `/health` liveness

pub mod envelope;
pub mod handlers;
mod routes;

pub use handlers::DashboardState;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build a CORS layer that is restrictive by default (same-origin only).
///
/// `server.cors_origins` lists extra allowed origins for development
/// (e.g. `http://localhost:5173` for the Vite dev server).
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    if origins.is_empty() {
        return layer;
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.trim().parse() {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "CORS: ignoring unparseable origin");
                None
            }
        })
        .collect();
    tracing::info!(origins = ?origins, "CORS: allowing configured origins");
    layer.allow_origin(allowed)
}

/// Create the complete application router.
pub fn create_app(state: DashboardState) -> Router {
    let cors = build_cors_layer(&state.pipeline.facility().server.cors_origins);

    Router::new()
        .nest("/api", routes::api_routes(state))
        .merge(routes::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
}
