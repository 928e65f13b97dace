//! System-wide default constants.
//!
//! Centralises magic numbers that would otherwise be scattered across the
//! engine and the HTTP layer. Grouped by subsystem for easy discovery.

// ============================================================================
// Electrical
// ============================================================================

/// √3 as used on the facility's motor load sheets (3-phase power).
pub const SQRT3: f64 = 1.732;

/// Line voltage (V, 3-phase).
pub const DEFAULT_VOLTAGE: f64 = 460.0;

/// Typical induction-motor power factor.
pub const DEFAULT_POWER_FACTOR: f64 = 0.88;

/// Blended flat rate ($/kWh). Used when the TOU schedule cannot be resolved.
pub const DEFAULT_RATE_PER_KWH: f64 = 0.30;

/// Motor current above this is logged as implausible (A).
pub const DEFAULT_MAX_MOTOR_AMPS: f64 = 100.0;

/// Accepted range for the flat rate ($/kWh).
pub const RATE_PER_KWH_RANGE: (f64, f64) = (0.01, 2.0);

/// Accepted range for line voltage (V).
pub const VOLTAGE_RANGE: (f64, f64) = (100.0, 600.0);

/// Accepted range for power factor.
pub const POWER_FACTOR_RANGE: (f64, f64) = (0.5, 1.0);

// ============================================================================
// Alignment
// ============================================================================

/// Maximum distance between a grid minute and the analog sample chosen for it.
pub const ANALOG_TOLERANCE_SECS: i64 = 30;

/// Every aligned row covers exactly this many minutes of an hour.
pub const MINUTES_PER_HOUR: f64 = 60.0;

// ============================================================================
// Reports
// ============================================================================

/// Timeline length: 24 h at one row per minute.
pub const TIMELINE_MAX_ROWS: usize = 1_440;

/// Fetch window for the timeline view (hours).
pub const TIMELINE_WINDOW_HOURS: i64 = 24;

/// Period label used when there are no rows.
pub const NO_DATA_PERIOD: &str = "No data";

// ============================================================================
// Historian
// ============================================================================

/// TimeBase quality code threshold for "good" samples.
pub const DEFAULT_MIN_GOOD_QUALITY: i32 = 192;

/// Summary/daily analysis window (days).
pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;

/// Window used to find the latest value of each tag (minutes).
pub const DEFAULT_CURRENT_WINDOW_MINUTES: i64 = 2;

/// HTTP timeout for a single historian request (seconds).
pub const DEFAULT_HISTORIAN_TIMEOUT_SECS: u64 = 30;

/// Bounds of the raw debug endpoint's `hours` parameter.
pub const RAW_DEBUG_HOURS_RANGE: (i64, i64) = (1, 168);
