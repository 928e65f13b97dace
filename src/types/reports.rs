//! Report shapes returned to the dashboard
//!
//! Field names and decimal precision are consumed directly by the frontend
//! formatters, so they must not drift:
//! - rollups: hours 1 dp, kWh 1 dp, cost 2 dp, percentages 1 dp
//! - timeline: kW 2 dp, kWh 4 dp, cost 4 dp, rate 4 dp
//! - current: amps 1 dp, kW 2 dp, cost/hour 2 dp, rate 4 dp

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::{OperatingState, RatePeriod, RawSample, ShiftName};

/// Per-state rollup inside a summary or a shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateMetrics {
    pub hours: f64,
    pub kwh: f64,
    pub cost_usd: f64,
    pub pct_time: f64,
    pub color: String,
}

/// Per-state rollup inside a daily record (no share-of-time column).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyStateMetrics {
    pub hours: f64,
    pub kwh: f64,
    pub cost_usd: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftMetrics {
    pub hours: f64,
    pub kwh: f64,
    pub cost_usd: f64,
    pub by_state: BTreeMap<OperatingState, StateMetrics>,
}

/// Whole-window totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// `"YYYY-MM-DD to YYYY-MM-DD"` or `"No data"`
    pub period: String,
    /// Flat rate from the runtime config at computation time
    pub rate_per_kwh: f64,
    pub total_cost_usd: f64,
    pub total_kwh: f64,
    pub by_state: BTreeMap<OperatingState, StateMetrics>,
    pub by_shift: BTreeMap<ShiftName, ShiftMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    /// Facility-local calendar date
    pub date: NaiveDate,
    pub total_cost_usd: f64,
    pub total_kwh: f64,
    pub by_state: BTreeMap<OperatingState, DailyStateMetrics>,
    pub by_shift: BTreeMap<ShiftName, ShiftMetrics>,
}

/// One per-minute point of the rolling 24 h chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    /// Serialized with a numeric offset: `2025-07-15T20:00:00+00:00`
    #[serde(serialize_with = "serialize_offset_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub kw: f64,
    pub kwh: f64,
    pub cost_usd: f64,
    pub state: OperatingState,
    pub color: String,
    pub tou_period: RatePeriod,
    pub tou_rate: f64,
    pub shift: ShiftName,
}

/// RFC 3339 with `+00:00` rather than `Z`, the form the dashboard formatters parse.
fn serialize_offset_timestamp<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::AutoSi, false))
}

/// Live "right now" figures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentSnapshot {
    pub amps: Option<f64>,
    pub kw: Option<f64>,
    pub cost_per_hour: Option<f64>,
    pub state: OperatingState,
    pub color: String,
    pub tou_period: RatePeriod,
    pub tou_rate: f64,
    pub shift: ShiftName,
}

/// Debug view of one tag's raw history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTagSummary {
    pub tag: String,
    pub point_count: usize,
    pub first: Option<RawSample>,
    pub last: Option<RawSample>,
}
