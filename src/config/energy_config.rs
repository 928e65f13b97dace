//! Facility Configuration - historian, tags, electrical and tariff settings
//!
//! Each struct implements `Default` with the values of the El Monte
//! separator installation, so the service runs unchanged with no file present.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::defaults::*;
use crate::types::Tag;

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "SEPARATOR_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "energy_config.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one separator deployment.
///
/// Load with `FacilityConfig::load()` which searches:
/// 1. `$SEPARATOR_CONFIG` env var
/// 2. `./energy_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacilityConfig {
    /// Site identification and local timezone
    #[serde(default)]
    pub facility: FacilityInfo,

    /// TimeBase historian connection
    #[serde(default)]
    pub historian: HistorianConfig,

    /// Full historian paths for each signal
    #[serde(default)]
    pub tags: TagPaths,

    /// Initial electrical parameters and plausibility ceiling
    #[serde(default)]
    pub electrical: ElectricalConfig,

    /// Time-of-use rates
    #[serde(default)]
    pub tariff: TariffConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl FacilityConfig {
    /// Load configuration using the standard search order:
    /// 1. `$SEPARATOR_CONFIG` environment variable
    /// 2. `./energy_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), facility = %config.facility.name, "Loaded facility config from SEPARATOR_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from SEPARATOR_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "SEPARATOR_CONFIG points to non-existent file, falling back");
            }
        }

        // 2. Check ./energy_config.toml
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(facility = %config.facility.name, "Loaded facility config from ./energy_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./energy_config.toml, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No energy_config.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let config = Self::from_toml_str(&contents)
            .map_err(|e| match e {
                ConfigError::Toml(err) => ConfigError::Parse(path.to_path_buf(), err),
                other => other,
            })?;
        Ok(config)
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are reported as warnings and never fail the load.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents).map_err(ConfigError::Toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate every section, collecting all problems before failing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (errors, warnings) = super::validation::validate_physical_ranges(self);
        for w in &warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, std::io::Error),
    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, toml::de::Error),
    #[error("Config parse error: {0}")]
    Toml(toml::de::Error),
    #[error("Config serialization error: {0}")]
    Serialize(toml::ser::Error),
    #[error("Config validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
}

// ============================================================================
// Facility Info
// ============================================================================

/// Identification metadata plus the timezone every calendar rule runs in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityInfo {
    #[serde(default = "default_facility_name")]
    pub name: String,

    /// IANA timezone identifier for shift and TOU boundaries
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_facility_name() -> String {
    "Separator 1".to_string()
}
fn default_timezone() -> String {
    "US/Pacific".to_string()
}

impl Default for FacilityInfo {
    fn default() -> Self {
        Self {
            name: default_facility_name(),
            timezone: default_timezone(),
        }
    }
}

// ============================================================================
// Historian
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorianConfig {
    /// Scheme, host and port of the TimeBase REST API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_dataset")]
    pub dataset: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Samples below this quality code are discarded by the client
    #[serde(default = "default_min_good_quality")]
    pub min_good_quality: i32,

    /// Summary and daily window (days)
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,

    /// Window searched for the latest value of each tag (minutes)
    #[serde(default = "default_current_window")]
    pub current_window_minutes: i64,
}

fn default_base_url() -> String {
    "http://192.254.155.2:4511".to_string()
}
fn default_dataset() -> String {
    "Driftwood Historian".to_string()
}
fn default_request_timeout() -> u64 { DEFAULT_HISTORIAN_TIMEOUT_SECS }
fn default_min_good_quality() -> i32 { DEFAULT_MIN_GOOD_QUALITY }
fn default_lookback_days() -> i64 { DEFAULT_LOOKBACK_DAYS }
fn default_current_window() -> i64 { DEFAULT_CURRENT_WINDOW_MINUTES }

impl Default for HistorianConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            dataset: default_dataset(),
            request_timeout_secs: default_request_timeout(),
            min_good_quality: default_min_good_quality(),
            lookback_days: default_lookback_days(),
            current_window_minutes: default_current_window(),
        }
    }
}

// ============================================================================
// Tag Paths
// ============================================================================

const DEFAULT_TAG_BASE: &str = "Driftwood Dairy/El Monte CA/Raw Side/Seperator/1/Edge";

/// UNS paths of the four separator tags as stored in the historian.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagPaths {
    #[serde(default = "default_motor_amps_path")]
    pub motor_amps: String,
    #[serde(default = "default_running_path")]
    pub running: String,
    #[serde(default = "default_cip_path")]
    pub cip: String,
    #[serde(default = "default_process_path")]
    pub process: String,
}

fn default_motor_amps_path() -> String {
    format!("{DEFAULT_TAG_BASE}/Motor Amps")
}
fn default_running_path() -> String {
    format!("{DEFAULT_TAG_BASE}/Process Values/Running")
}
fn default_cip_path() -> String {
    format!("{DEFAULT_TAG_BASE}/Process Values/CIP")
}
fn default_process_path() -> String {
    format!("{DEFAULT_TAG_BASE}/Process Values/Process")
}

impl TagPaths {
    pub fn path(&self, tag: Tag) -> &str {
        match tag {
            Tag::MotorAmps => &self.motor_amps,
            Tag::Running => &self.running,
            Tag::Cip => &self.cip,
            Tag::Process => &self.process,
        }
    }
}

impl Default for TagPaths {
    fn default() -> Self {
        Self {
            motor_amps: default_motor_amps_path(),
            running: default_running_path(),
            cip: default_cip_path(),
            process: default_process_path(),
        }
    }
}

// ============================================================================
// Electrical
// ============================================================================

/// Startup values of the runtime electrical parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectricalConfig {
    #[serde(default = "default_voltage")]
    pub voltage: f64,

    #[serde(default = "default_power_factor")]
    pub power_factor: f64,

    #[serde(default = "default_rate")]
    pub default_rate_per_kwh: f64,

    /// Readings above this pass through but are flagged in the logs
    #[serde(default = "default_max_motor_amps")]
    pub max_motor_amps: f64,
}

fn default_voltage() -> f64 { DEFAULT_VOLTAGE }
fn default_power_factor() -> f64 { DEFAULT_POWER_FACTOR }
fn default_rate() -> f64 { DEFAULT_RATE_PER_KWH }
fn default_max_motor_amps() -> f64 { DEFAULT_MAX_MOTOR_AMPS }

impl Default for ElectricalConfig {
    fn default() -> Self {
        Self {
            voltage: default_voltage(),
            power_factor: default_power_factor(),
            default_rate_per_kwh: default_rate(),
            max_motor_amps: default_max_motor_amps(),
        }
    }
}

// ============================================================================
// Tariff
// ============================================================================

/// Seasonal TOU rates ($/kWh). Hour windows are fixed by the schedule tables
/// in the calendar resolver; only the prices are tunable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TariffConfig {
    #[serde(default)]
    pub summer: SummerRates,
    #[serde(default)]
    pub winter: WinterRates,
}

/// June through September.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummerRates {
    #[serde(default = "default_summer_on_peak")]
    pub on_peak: f64,
    #[serde(default = "default_summer_mid_peak")]
    pub mid_peak: f64,
    #[serde(default = "default_summer_off_peak")]
    pub off_peak: f64,
}

fn default_summer_on_peak() -> f64 { 0.38 }
fn default_summer_mid_peak() -> f64 { 0.28 }
fn default_summer_off_peak() -> f64 { 0.18 }

impl Default for SummerRates {
    fn default() -> Self {
        Self {
            on_peak: default_summer_on_peak(),
            mid_peak: default_summer_mid_peak(),
            off_peak: default_summer_off_peak(),
        }
    }
}

/// October through May.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinterRates {
    #[serde(default = "default_winter_mid_peak")]
    pub mid_peak: f64,
    #[serde(default = "default_winter_off_peak")]
    pub off_peak: f64,
    #[serde(default = "default_winter_super_off_peak")]
    pub super_off_peak: f64,
}

fn default_winter_mid_peak() -> f64 { 0.30 }
fn default_winter_off_peak() -> f64 { 0.22 }
fn default_winter_super_off_peak() -> f64 { 0.16 }

impl Default for WinterRates {
    fn default() -> Self {
        Self {
            mid_peak: default_winter_mid_peak(),
            off_peak: default_winter_off_peak(),
            super_off_peak: default_winter_super_off_peak(),
        }
    }
}

// ============================================================================
// Server
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_addr")]
    pub addr: String,

    /// Extra origins allowed by CORS (Vite dev server etc.). Empty = same-origin only.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_server_addr() -> String {
    "0.0.0.0:3030".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
            cors_origins: Vec::new(),
        }
    }
}
