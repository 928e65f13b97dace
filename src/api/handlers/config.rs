//! Runtime electrical config endpoints

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::warn;

use super::DashboardState;
use crate::api::envelope::ApiErrorResponse;
use crate::config::{RuntimeConfig, RuntimeConfigError, RuntimeConfigUpdate};

/// GET /api/config - active rate, voltage and power factor
pub async fn get_config(State(state): State<DashboardState>) -> Json<RuntimeConfig> {
    Json(*state.pipeline.runtime().snapshot())
}

#[derive(Debug, Serialize)]
pub struct UpdateConfigResponse {
    pub status: &'static str,
    pub config: RuntimeConfig,
}

/// POST /api/config - partial update; absent fields keep their value
pub async fn update_config(
    State(state): State<DashboardState>,
    body: Result<Json<RuntimeConfigUpdate>, JsonRejection>,
) -> Response {
    let Json(update) = match body {
        Ok(body) => body,
        Err(rejection) => return ApiErrorResponse::bad_request(rejection.body_text()),
    };

    match state.pipeline.runtime().update(update) {
        Ok(config) => Json(UpdateConfigResponse {
            status: "ok",
            config: *config,
        })
        .into_response(),
        Err(RuntimeConfigError::Validation(errors)) => {
            warn!(errors = ?errors, "Rejected runtime config update");
            ApiErrorResponse::validation_failed(errors.join("; "))
        }
    }
}
