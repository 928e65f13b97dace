//! Raw tag inspection (debug)

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use super::DashboardState;
use crate::api::envelope::ApiErrorResponse;

#[derive(Debug, Deserialize)]
pub struct RawQuery {
    /// Lookback in hours (default 1)
    pub hours: Option<i64>,
}

/// GET /api/raw?hours=N - per-tag counts and first/last samples
pub async fn get_raw(
    State(state): State<DashboardState>,
    query: Result<Query<RawQuery>, QueryRejection>,
) -> Response {
    let hours = match query {
        Ok(Query(q)) => q.hours.unwrap_or(1),
        Err(rejection) => return ApiErrorResponse::bad_request(rejection.body_text()),
    };

    match state.pipeline.raw_debug(state.now(), hours).await {
        Ok(summaries) => Json(summaries).into_response(),
        Err(e) => ApiErrorResponse::bad_request(e.to_string()),
    }
}
