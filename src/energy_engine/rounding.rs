//! Output rounding. Internal arithmetic keeps full precision; these helpers
//! run only when a report shape is built.

/// Hours in rollups.
pub const HOURS_DP: i32 = 1;
/// Energy in rollups (period/day/shift/state).
pub const ROLLUP_KWH_DP: i32 = 1;
/// Cost in rollups.
pub const ROLLUP_COST_DP: i32 = 2;
/// Share of time.
pub const PCT_DP: i32 = 1;
/// Instantaneous power.
pub const KW_DP: i32 = 2;
/// Per-minute energy on the timeline.
pub const MINUTE_KWH_DP: i32 = 4;
/// Per-minute cost on the timeline.
pub const MINUTE_COST_DP: i32 = 4;
/// $/kWh everywhere.
pub const RATE_DP: i32 = 4;
/// Live current draw.
pub const AMPS_DP: i32 = 1;

/// Round to `places` decimals, ties to even (0.25 -> 0.2, 0.35 -> 0.4).
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    let rounded = (value * factor).round_ties_even() / factor;
    // Normalise -0.0 so JSON never shows "-0.0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
