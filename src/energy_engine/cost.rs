//! Cost Annotator: power, energy, cost and calendar labels per aligned row.

use tracing::warn;

use super::calendar::CalendarResolver;
use crate::config::defaults::{MINUTES_PER_HOUR, SQRT3};
use crate::config::RuntimeConfig;
use crate::types::{AlignedRow, CostRow, ShiftName};

/// 3-phase real power (kW) for a motor current.
///
/// `P = I · V · √3 · PF / 1000`
pub fn power_kw(current: f64, config: &RuntimeConfig) -> f64 {
    current * config.voltage * SQRT3 * config.power_factor / 1000.0
}

/// Energy for one fixed one-minute interval.
pub fn minute_energy_kwh(power_kw: f64) -> f64 {
    power_kw / MINUTES_PER_HOUR
}

/// Attach power, energy, TOU cost, shift and rate period to every row.
///
/// `config` is the snapshot taken for this computation; its flat rate is
/// used only for rows whose local time cannot be resolved.
pub fn annotate(rows: &[AlignedRow], config: &RuntimeConfig, calendar: &CalendarResolver) -> Vec<CostRow> {
    let annotated: Vec<CostRow> = rows
        .iter()
        .map(|row| {
            let power_kw = power_kw(row.current, config);
            let energy_kwh = minute_energy_kwh(power_kw);
            let labels = calendar.resolve(row.timestamp, config.rate_per_kwh);
            CostRow {
                aligned: *row,
                power_kw,
                energy_kwh,
                cost_usd: energy_kwh * labels.rate_usd_per_kwh,
                shift: labels.shift,
                rate_period: labels.rate_period,
                rate_usd_per_kwh: labels.rate_usd_per_kwh,
                local_date: calendar.local_date(row.timestamp),
            }
        })
        .collect();

    let fallback_rows = annotated.iter().filter(|r| r.shift == ShiftName::Unknown).count();
    if fallback_rows > 0 {
        warn!(
            rows = fallback_rows,
            flat_rate = config.rate_per_kwh,
            "Local time unavailable, flat rate applied"
        );
    }

    annotated
}
