//! Config validation: unknown-key detection with Levenshtein suggestions
//! and range checks.
//!
//! The raw TOML is walked first and compared against the known field names,
//! producing "did you mean?" warnings. Serde deserialization runs afterwards,
//! so a typo never breaks an otherwise valid file.

use std::collections::HashSet;
use std::net::SocketAddr;

use chrono_tz::Tz;

use super::defaults::{POWER_FACTOR_RANGE, RATE_PER_KWH_RANGE, VOLTAGE_RANGE};
use super::runtime::check_range;
use super::FacilityConfig;
use crate::types::Tag;

/// Rates above this ($/kWh) are accepted but almost certainly a unit mistake.
const SUSPICIOUS_TARIFF_RATE: f64 = 2.0;

/// Longest window the in-memory pipeline is sized for.
const MAX_LOOKBACK_DAYS: i64 = 31;

/// Widest live-value window; the snapshot is meant to be "right now".
const MAX_CURRENT_WINDOW_MINUTES: i64 = 60;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Every valid dotted key path of `FacilityConfig`.
///
/// Kept by hand in step with energy_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [facility]
        "facility",
        "facility.name",
        "facility.timezone",
        // [historian]
        "historian",
        "historian.base_url",
        "historian.dataset",
        "historian.request_timeout_secs",
        "historian.min_good_quality",
        "historian.lookback_days",
        "historian.current_window_minutes",
        // [tags]
        "tags",
        "tags.motor_amps",
        "tags.running",
        "tags.cip",
        "tags.process",
        // [electrical]
        "electrical",
        "electrical.voltage",
        "electrical.power_factor",
        "electrical.default_rate_per_kwh",
        "electrical.max_motor_amps",
        // [tariff]
        "tariff",
        "tariff.summer",
        "tariff.summer.on_peak",
        "tariff.summer.mid_peak",
        "tariff.summer.off_peak",
        "tariff.winter",
        "tariff.winter.mid_peak",
        "tariff.winter.off_peak",
        "tariff.winter.super_off_peak",
        // [server]
        "server",
        "server.addr",
        "server.cors_origins",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively collect the dotted key paths of a `toml::Value` tree.
///
/// `{ a = { b = 1, c = 2 } }` yields `["a", "a.b", "a.c"]`.
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Closest known key within edit distance 3, if any.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (k, levenshtein(unknown, k)))
        .filter(|&(_, dist)| dist <= 3)
        .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Warnings for every key in `raw_toml` that `FacilityConfig` does not know.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // serde reports parse errors
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Range Validation
// ============================================================================

/// Validate value ranges on a parsed config.
///
/// Returns (errors, warnings). Errors block startup; warnings are logged.
/// An unresolvable timezone is only a warning: the calendar resolver falls
/// back to the flat rate and the "Unknown" shift instead.
pub fn validate_physical_ranges(config: &FacilityConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Electrical
    let e = &config.electrical;
    check_range("electrical.default_rate_per_kwh", e.default_rate_per_kwh, RATE_PER_KWH_RANGE, &mut errors);
    check_range("electrical.voltage", e.voltage, VOLTAGE_RANGE, &mut errors);
    check_range("electrical.power_factor", e.power_factor, POWER_FACTOR_RANGE, &mut errors);
    if !(e.max_motor_amps.is_finite() && e.max_motor_amps > 0.0) {
        errors.push(format!("electrical.max_motor_amps = {} must be > 0", e.max_motor_amps));
    }

    // Tariff
    let s = &config.tariff.summer;
    let w = &config.tariff.winter;
    for (field, rate) in [
        ("tariff.summer.on_peak", s.on_peak),
        ("tariff.summer.mid_peak", s.mid_peak),
        ("tariff.summer.off_peak", s.off_peak),
        ("tariff.winter.mid_peak", w.mid_peak),
        ("tariff.winter.off_peak", w.off_peak),
        ("tariff.winter.super_off_peak", w.super_off_peak),
    ] {
        if !(rate.is_finite() && rate > 0.0) {
            errors.push(format!("{field} = {rate} must be a positive number"));
        } else if rate > SUSPICIOUS_TARIFF_RATE {
            warnings.push(ValidationWarning {
                field: field.to_string(),
                message: format!("{field} = {rate} $/kWh is unusually high"),
                suggestion: None,
            });
        }
    }

    // Historian
    let h = &config.historian;
    if h.base_url.trim().is_empty() {
        errors.push("historian.base_url must not be empty".to_string());
    } else if reqwest::Url::parse(&h.base_url).is_err() {
        errors.push(format!("historian.base_url = '{}' is not a valid URL", h.base_url));
    }
    if h.dataset.trim().is_empty() {
        errors.push("historian.dataset must not be empty".to_string());
    }
    if h.request_timeout_secs == 0 {
        errors.push("historian.request_timeout_secs must be > 0".to_string());
    }
    if !(1..=MAX_LOOKBACK_DAYS).contains(&h.lookback_days) {
        errors.push(format!(
            "historian.lookback_days = {} is outside the accepted range (1-{MAX_LOOKBACK_DAYS})",
            h.lookback_days
        ));
    }
    if !(1..=MAX_CURRENT_WINDOW_MINUTES).contains(&h.current_window_minutes) {
        errors.push(format!(
            "historian.current_window_minutes = {} is outside the accepted range (1-{MAX_CURRENT_WINDOW_MINUTES})",
            h.current_window_minutes
        ));
    }

    // Tags
    for tag in Tag::ALL {
        if config.tags.path(tag).trim().is_empty() {
            errors.push(format!("tags.{} must not be empty", tag.alias()));
        }
    }

    // Facility
    if config.facility.timezone.parse::<Tz>().is_err() {
        warnings.push(ValidationWarning {
            field: "facility.timezone".to_string(),
            message: format!(
                "facility.timezone = '{}' is not a known IANA timezone; shift and TOU labels will fall back",
                config.facility.timezone
            ),
            suggestion: None,
        });
    }

    // Server
    if config.server.addr.parse::<SocketAddr>().is_err() {
        errors.push(format!("server.addr = '{}' is not a valid socket address", config.server.addr));
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_basics() {
        assert_eq!(levenshtein("voltage", "voltage"), 0);
        assert_eq!(levenshtein("votage", "voltage"), 1);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
    }

    #[test]
    fn test_walk_toml_keys_nested() {
        let toml: toml::Value = r#"
            [tariff.summer]
            on_peak = 0.38
        "#
        .parse()
        .unwrap();
        let keys = walk_toml_keys(&toml, "");
        assert!(keys.contains(&"tariff".to_string()));
        assert!(keys.contains(&"tariff.summer".to_string()));
        assert!(keys.contains(&"tariff.summer.on_peak".to_string()));
    }

    #[test]
    fn test_typo_key_produces_warning_with_suggestion() {
        let warnings = validate_unknown_keys(
            r#"
[electrical]
power_facter = 0.9
"#,
        );
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "electrical.power_facter");
        assert_eq!(warnings[0].suggestion.as_deref(), Some("electrical.power_factor"));
    }

    #[test]
    fn test_valid_keys_produce_no_warnings() {
        let warnings = validate_unknown_keys(
            r#"
[facility]
name = "Separator 1"
timezone = "America/Los_Angeles"

[tariff.winter]
super_off_peak = 0.15

[server]
cors_origins = ["http://localhost:5173"]
"#,
        );
        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    }

    #[test]
    fn test_suggest_correction_no_match_for_garbage() {
        let known = known_config_keys();
        assert!(suggest_correction("completely_unrelated_garbage_key", &known).is_none());
    }

    #[test]
    fn test_defaults_clean() {
        let (errors, warnings) = validate_physical_ranges(&FacilityConfig::default());
        assert!(errors.is_empty(), "{errors:?}");
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn test_unknown_timezone_is_warning_only() {
        let mut config = FacilityConfig::default();
        config.facility.timezone = "Mars/Olympus_Mons".to_string();
        let (errors, warnings) = validate_physical_ranges(&config);
        assert!(errors.is_empty());
        assert!(warnings.iter().any(|w| w.field == "facility.timezone"));
    }

    #[test]
    fn test_electrical_out_of_range() {
        let mut config = FacilityConfig::default();
        config.electrical.voltage = 50.0;
        config.electrical.default_rate_per_kwh = 3.0;
        let (errors, _) = validate_physical_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("electrical.voltage")));
        assert!(errors.iter().any(|e| e.contains("electrical.default_rate_per_kwh")));
    }

    #[test]
    fn test_non_positive_tariff_is_error_and_high_tariff_is_warning() {
        let mut config = FacilityConfig::default();
        config.tariff.summer.on_peak = -0.1;
        config.tariff.winter.mid_peak = 4.5;
        let (errors, warnings) = validate_physical_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("tariff.summer.on_peak")));
        assert!(warnings.iter().any(|w| w.field == "tariff.winter.mid_peak"));
    }

    #[test]
    fn test_historian_window_must_be_positive() {
        let mut config = FacilityConfig::default();
        config.historian.lookback_days = 0;
        config.historian.base_url = "not a url".to_string();
        let (errors, _) = validate_physical_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("lookback_days")));
        assert!(errors.iter().any(|e| e.contains("base_url")));
    }

    #[test]
    fn test_bad_server_addr() {
        let mut config = FacilityConfig::default();
        config.server.addr = "localhost".to_string();
        let (errors, _) = validate_physical_ranges(&config);
        assert!(errors.iter().any(|e| e.contains("server.addr")));
    }
}
