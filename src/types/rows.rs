//! Per-minute row types produced by the aligner and the cost annotator

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{OperatingState, RatePeriod, ShiftName};

/// One minute of reconciled tag data.
///
/// Only minutes with a motor-current reading inside the tolerance window are
/// emitted, so `current` is always present here; minutes without a reading
/// never become rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedRow {
    /// Minute-aligned UTC instant
    pub timestamp: DateTime<Utc>,
    /// Motor current (A)
    pub current: f64,
    pub running: bool,
    pub cip: bool,
    pub process: bool,
    pub state: OperatingState,
}

/// An aligned row with power, energy, cost and calendar labels attached.
///
/// Numeric fields keep full precision; rounding happens only when a report
/// shape is built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostRow {
    #[serde(flatten)]
    pub aligned: AlignedRow,
    pub power_kw: f64,
    /// `power_kw / 60` (one-minute interval)
    pub energy_kwh: f64,
    pub cost_usd: f64,
    pub shift: ShiftName,
    pub rate_period: RatePeriod,
    pub rate_usd_per_kwh: f64,
    /// Facility-local calendar date (UTC date when the timezone is unresolvable)
    pub local_date: NaiveDate,
}

impl CostRow {
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.aligned.timestamp
    }

    pub fn state(&self) -> OperatingState {
        self.aligned.state
    }
}
