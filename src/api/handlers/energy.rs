//! Energy report endpoints

use axum::extract::State;
use axum::Json;

use super::DashboardState;
use crate::types::{CurrentSnapshot, DailyRecord, PeriodSummary, TimelinePoint};

/// GET /api/energy/summary - lookback totals by state and shift
pub async fn get_summary(State(state): State<DashboardState>) -> Json<PeriodSummary> {
    Json(state.pipeline.summary(state.now()).await)
}

/// GET /api/energy/daily - per-day breakdown, oldest first
pub async fn get_daily(State(state): State<DashboardState>) -> Json<Vec<DailyRecord>> {
    Json(state.pipeline.daily(state.now()).await)
}

/// GET /api/energy/timeline - last 24 h at one point per minute
pub async fn get_timeline(State(state): State<DashboardState>) -> Json<Vec<TimelinePoint>> {
    Json(state.pipeline.timeline(state.now()).await)
}

/// GET /api/energy/current - live snapshot
pub async fn get_current(State(state): State<DashboardState>) -> Json<CurrentSnapshot> {
    Json(state.pipeline.current(state.now()).await)
}
