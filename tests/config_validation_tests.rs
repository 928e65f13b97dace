//! Config Validation Tests
//!
//! Typo detection and range validation for the facility config, plus
//! loading from real files on disk.

use std::io::Write;

use separator_energy::config::validation::{
    known_config_keys, suggest_correction, validate_physical_ranges, validate_unknown_keys,
};
use separator_energy::config::{ConfigError, FacilityConfig};

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_tariff_key_warns_with_suggestion() {
    let toml_str = r#"
[tariff.summer]
on_peek = 0.40
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert_eq!(warnings[0].field, "tariff.summer.on_peek");
    assert_eq!(warnings[0].suggestion.as_deref(), Some("tariff.summer.on_peak"));
}

#[test]
fn typo_does_not_break_loading() {
    let config = FacilityConfig::from_toml_str(
        r#"
[electrical]
voltge = 480.0
power_factor = 0.9
"#,
    )
    .unwrap();
    assert_eq!(config.electrical.voltage, 460.0, "misspelled key falls back to default");
    assert_eq!(config.electrical.power_factor, 0.9);
}

#[test]
fn unrelated_key_gets_no_suggestion() {
    let known = known_config_keys();
    assert_eq!(suggest_correction("completely_unrelated_section", &known), None);
}

#[test]
fn valid_file_has_no_unknown_keys() {
    let text = FacilityConfig::default().to_toml().unwrap();
    assert!(validate_unknown_keys(&text).is_empty());
}

// ============================================================================
// Range Validation
// ============================================================================

#[test]
fn defaults_have_no_errors_or_warnings() {
    let (errors, warnings) = validate_physical_ranges(&FacilityConfig::default());
    assert!(errors.is_empty(), "{errors:?}");
    assert!(warnings.is_empty());
}

#[test]
fn all_problems_reported_together() {
    let mut config = FacilityConfig::default();
    config.electrical.voltage = 50.0;
    config.tariff.winter.off_peak = 0.0;
    config.historian.lookback_days = 90;
    config.server.addr = "not-an-address".to_string();

    let (errors, _) = validate_physical_ranges(&config);
    assert_eq!(errors.len(), 4, "{errors:?}");
    assert!(errors.iter().any(|e| e.contains("electrical.voltage")));
    assert!(errors.iter().any(|e| e.contains("tariff.winter.off_peak")));
    assert!(errors.iter().any(|e| e.contains("historian.lookback_days")));
    assert!(errors.iter().any(|e| e.contains("server.addr")));
}

#[test]
fn current_window_is_bounded() {
    let mut config = FacilityConfig::default();
    config.historian.current_window_minutes = 60;
    assert!(validate_physical_ranges(&config).0.is_empty());

    for minutes in [0, 61, i64::MAX] {
        config.historian.current_window_minutes = minutes;
        let (errors, _) = validate_physical_ranges(&config);
        assert_eq!(errors.len(), 1, "{minutes}: {errors:?}");
        assert!(errors[0].contains("historian.current_window_minutes"));
    }
}

#[test]
fn non_finite_values_rejected() {
    let mut config = FacilityConfig::default();
    config.electrical.power_factor = f64::NAN;
    config.tariff.summer.on_peak = f64::INFINITY;
    let (errors, _) = validate_physical_ranges(&config);
    assert_eq!(errors.len(), 2, "{errors:?}");
}

#[test]
fn unknown_timezone_is_only_a_warning() {
    let mut config = FacilityConfig::default();
    config.facility.timezone = "Mars/Olympus".to_string();
    let (errors, warnings) = validate_physical_ranges(&config);
    assert!(errors.is_empty());
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].field, "facility.timezone");
    assert!(config.validate().is_ok());
}

#[test]
fn high_tariff_rate_warns() {
    let mut config = FacilityConfig::default();
    config.tariff.summer.on_peak = 3.8;
    let (errors, warnings) = validate_physical_ranges(&config);
    assert!(errors.is_empty());
    assert!(warnings.iter().any(|w| w.field == "tariff.summer.on_peak"));
}

// ============================================================================
// File Loading
// ============================================================================

#[test]
fn load_from_file_reads_overrides() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[facility]
name = "Separator 3"
timezone = "America/Chicago"

[historian]
dataset = "Plant B"
lookback_days = 14

[server]
cors_origins = ["http://localhost:5173"]
"#
    )
    .unwrap();

    let config = FacilityConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.facility.name, "Separator 3");
    assert_eq!(config.facility.timezone, "America/Chicago");
    assert_eq!(config.historian.dataset, "Plant B");
    assert_eq!(config.historian.lookback_days, 14);
    assert_eq!(config.historian.min_good_quality, 192);
    assert_eq!(config.server.cors_origins.len(), 1);
}

#[test]
fn load_from_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = FacilityConfig::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io(..)));
}

#[test]
fn malformed_file_reports_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[electrical\nvoltage = ").unwrap();
    let err = FacilityConfig::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(..)));
    assert!(err.to_string().contains(&file.path().display().to_string()));
}

#[test]
fn out_of_range_file_fails_validation() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[historian]\nlookback_days = 0").unwrap();
    let err = FacilityConfig::load_from_file(file.path()).unwrap_err();
    match err {
        ConfigError::Validation(errors) => assert_eq!(errors.len(), 1),
        other => panic!("expected validation error, got {other}"),
    }
}
