//! Runtime electrical parameters (flat rate, voltage, power factor).
//!
//! These are the only values that change while the process runs. Readers
//! take a snapshot at the start of a computation; writers replace the whole
//! struct at once, so a computation never sees a half-applied update.

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::defaults::{POWER_FACTOR_RANGE, RATE_PER_KWH_RANGE, VOLTAGE_RANGE};
use super::ElectricalConfig;
use crate::energy_engine::rounding::round_to;

/// Electrical parameters read by every cost computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Flat fallback rate ($/kWh)
    pub rate_per_kwh: f64,
    /// Line voltage (V)
    pub voltage: f64,
    pub power_factor: f64,
}

impl RuntimeConfig {
    pub fn from_electrical(electrical: &ElectricalConfig) -> Self {
        Self {
            rate_per_kwh: electrical.default_rate_per_kwh,
            voltage: electrical.voltage,
            power_factor: electrical.power_factor,
        }
    }
}

/// Partial update; absent fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfigUpdate {
    #[serde(default)]
    pub rate_per_kwh: Option<f64>,
    #[serde(default)]
    pub voltage: Option<f64>,
    #[serde(default)]
    pub power_factor: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RuntimeConfigError {
    #[error("invalid runtime config: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// Range-check electrical values. Shared with facility config validation.
pub fn check_electrical(rate_per_kwh: f64, voltage: f64, power_factor: f64) -> Vec<String> {
    let mut errors = Vec::new();
    check_range("rate_per_kwh", rate_per_kwh, RATE_PER_KWH_RANGE, &mut errors);
    check_range("voltage", voltage, VOLTAGE_RANGE, &mut errors);
    check_range("power_factor", power_factor, POWER_FACTOR_RANGE, &mut errors);
    errors
}

pub(crate) fn check_range(name: &str, value: f64, (min, max): (f64, f64), errors: &mut Vec<String>) {
    // NaN compares false against both bounds
    if !value.is_finite() {
        errors.push(format!("{name} must be a finite number (got {value})"));
    } else if value < min || value > max {
        errors.push(format!("{name} = {value} is outside the accepted range ({min}-{max})"));
    }
}

/// Single ownership point for the process-wide [`RuntimeConfig`].
#[derive(Debug)]
pub struct RuntimeConfigManager {
    current: ArcSwap<RuntimeConfig>,
}

impl RuntimeConfigManager {
    pub fn new(initial: RuntimeConfig) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    /// Value snapshot for one computation.
    pub fn snapshot(&self) -> Arc<RuntimeConfig> {
        self.current.load_full()
    }

    /// Validate and atomically apply a partial update.
    ///
    /// On rejection the active config is left untouched. Accepted rates are
    /// stored rounded to 4 decimals.
    pub fn update(&self, update: RuntimeConfigUpdate) -> Result<Arc<RuntimeConfig>, RuntimeConfigError> {
        let base = self.snapshot();
        let next = RuntimeConfig {
            rate_per_kwh: update.rate_per_kwh.unwrap_or(base.rate_per_kwh),
            voltage: update.voltage.unwrap_or(base.voltage),
            power_factor: update.power_factor.unwrap_or(base.power_factor),
        };

        let errors = check_electrical(next.rate_per_kwh, next.voltage, next.power_factor);
        if !errors.is_empty() {
            return Err(RuntimeConfigError::Validation(errors));
        }

        let next = Arc::new(RuntimeConfig {
            rate_per_kwh: round_to(next.rate_per_kwh, 4),
            ..next
        });
        self.current.store(Arc::clone(&next));

        info!(
            rate_per_kwh = next.rate_per_kwh,
            voltage = next.voltage,
            power_factor = next.power_factor,
            "Runtime config updated"
        );
        Ok(next)
    }
}
