//! Calendar/Rate Resolver
//!
//! Maps a UTC instant to facility-local time and from there to a shift, a
//! TOU rate period and a $/kWh rate. Timezone failures are explicit: the
//! fallible path returns [`CalendarError`], and [`CalendarResolver::resolve`]
//! turns that into a [`RateResolution`] flagged `fallback = true`.

use std::ops::Range;

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use tracing::warn;

use crate::config::{FacilityConfig, TariffConfig};
use crate::types::{RatePeriod, ShiftName};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("unknown facility timezone '{0}'")]
    UnknownTimezone(String),
}

// ============================================================================
// Pure Calendar Rules
// ============================================================================

/// Shift for a facility-local hour. `[start, end)` boundaries, so hours 6, 14
/// and 22 belong to the shift that starts there.
pub fn shift_for_hour(hour: u32) -> ShiftName {
    match hour {
        6..=13 => ShiftName::First,
        14..=21 => ShiftName::Second,
        _ => ShiftName::Third,
    }
}

/// June through September.
pub fn is_summer(month: u32) -> bool {
    (6..=9).contains(&month)
}

/// Monday through Friday. Holidays are not modelled.
pub fn is_weekday(weekday: Weekday) -> bool {
    !matches!(weekday, Weekday::Sat | Weekday::Sun)
}

/// One row of a seasonal TOU table.
#[derive(Debug, Clone)]
struct TouWindow {
    period: RatePeriod,
    weekdays_only: bool,
    hours: Range<u32>,
}

static SUMMER_WINDOWS: [TouWindow; 2] = [
    TouWindow { period: RatePeriod::OnPeak, weekdays_only: true, hours: 16..21 },
    TouWindow { period: RatePeriod::MidPeak, weekdays_only: true, hours: 8..16 },
];

static WINTER_WINDOWS: [TouWindow; 2] = [
    TouWindow { period: RatePeriod::MidPeak, weekdays_only: true, hours: 16..21 },
    // Applies on weekends too
    TouWindow { period: RatePeriod::SuperOffPeak, weekdays_only: false, hours: 8..16 },
];

/// Rate period for a facility-local hour and weekday.
///
/// Windows are checked in table order and the first match wins; anything
/// unmatched is Off-Peak on every day.
pub fn rate_period(hour: u32, weekday: Weekday, summer: bool) -> RatePeriod {
    let table: &[TouWindow] = if summer { &SUMMER_WINDOWS } else { &WINTER_WINDOWS };
    let business_day = is_weekday(weekday);
    table
        .iter()
        .find(|w| w.hours.contains(&hour) && (business_day || !w.weekdays_only))
        .map_or(RatePeriod::OffPeak, |w| w.period)
}

/// $/kWh for a period in the given season.
///
/// Combinations that no schedule produces (summer Super Off-Peak, winter
/// On-Peak) price at the season's off-peak rate.
pub fn tariff_rate(tariff: &TariffConfig, period: RatePeriod, summer: bool) -> f64 {
    if summer {
        let r = &tariff.summer;
        match period {
            RatePeriod::OnPeak => r.on_peak,
            RatePeriod::MidPeak => r.mid_peak,
            RatePeriod::OffPeak | RatePeriod::SuperOffPeak => r.off_peak,
        }
    } else {
        let r = &tariff.winter;
        match period {
            RatePeriod::MidPeak => r.mid_peak,
            RatePeriod::SuperOffPeak => r.super_off_peak,
            RatePeriod::OnPeak | RatePeriod::OffPeak => r.off_peak,
        }
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Facility-local calendar fields of one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalCalendar {
    pub date: NaiveDate,
    pub hour: u32,
    pub weekday: Weekday,
    pub month: u32,
}

/// Shift and TOU labels for one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateResolution {
    pub shift: ShiftName,
    pub rate_period: RatePeriod,
    pub rate_usd_per_kwh: f64,
    /// Set when local time was unavailable and the flat rate was used
    pub fallback: bool,
}

impl RateResolution {
    /// Flat rate, Off-Peak label, Unknown shift.
    pub fn fallback(flat_rate: f64) -> Self {
        Self {
            shift: ShiftName::Unknown,
            rate_period: RatePeriod::OffPeak,
            rate_usd_per_kwh: flat_rate,
            fallback: true,
        }
    }
}

/// Resolves calendar labels in the facility timezone.
#[derive(Debug, Clone)]
pub struct CalendarResolver {
    zone: Result<Tz, CalendarError>,
    tariff: TariffConfig,
}

impl CalendarResolver {
    /// An unknown timezone name is accepted here; every lookup then takes the
    /// fallback path.
    pub fn new(timezone: &str, tariff: TariffConfig) -> Self {
        let zone = timezone
            .parse::<Tz>()
            .map_err(|_| CalendarError::UnknownTimezone(timezone.to_string()));
        if let Err(ref e) = zone {
            warn!(error = %e, "Calendar resolver will use the flat-rate fallback");
        }
        Self { zone, tariff }
    }

    pub fn from_config(config: &FacilityConfig) -> Self {
        Self::new(&config.facility.timezone, config.tariff.clone())
    }

    pub fn timezone(&self) -> Result<Tz, CalendarError> {
        self.zone.clone()
    }

    pub fn local(&self, ts: DateTime<Utc>) -> Result<LocalCalendar, CalendarError> {
        let local = ts.with_timezone(&self.timezone()?);
        Ok(LocalCalendar {
            date: local.date_naive(),
            hour: local.hour(),
            weekday: local.weekday(),
            month: local.month(),
        })
    }

    pub fn try_resolve(&self, ts: DateTime<Utc>) -> Result<RateResolution, CalendarError> {
        let local = self.local(ts)?;
        let summer = is_summer(local.month);
        let period = rate_period(local.hour, local.weekday, summer);
        Ok(RateResolution {
            shift: shift_for_hour(local.hour),
            rate_period: period,
            rate_usd_per_kwh: tariff_rate(&self.tariff, period, summer),
            fallback: false,
        })
    }

    /// Never fails: on error returns [`RateResolution::fallback`] with `flat_rate`.
    pub fn resolve(&self, ts: DateTime<Utc>, flat_rate: f64) -> RateResolution {
        self.try_resolve(ts)
            .unwrap_or_else(|_| RateResolution::fallback(flat_rate))
    }

    /// Facility-local date, or the UTC date when local time is unavailable.
    pub fn local_date(&self, ts: DateTime<Utc>) -> NaiveDate {
        self.local(ts).map_or_else(|_| ts.date_naive(), |l| l.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn resolver() -> CalendarResolver {
        CalendarResolver::new("US/Pacific", TariffConfig::default())
    }

    fn pacific(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        chrono_tz::US::Pacific
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_summer_weekday_evening_is_on_peak() {
        // Tuesday
        let r = resolver().try_resolve(pacific(2025, 7, 15, 17)).unwrap();
        assert_eq!(r.rate_period, RatePeriod::OnPeak);
        assert_eq!(r.shift, ShiftName::Second);
        assert_eq!(r.rate_usd_per_kwh, 0.38);
        assert!(!r.fallback);
    }

    #[test]
    fn test_winter_saturday_morning_is_super_off_peak() {
        let r = resolver().try_resolve(pacific(2025, 12, 20, 10)).unwrap();
        assert_eq!(r.rate_period, RatePeriod::SuperOffPeak);
        assert_eq!(r.shift, ShiftName::First);
        assert_eq!(r.rate_usd_per_kwh, 0.16);
    }

    #[test]
    fn test_summer_weekend_is_off_peak() {
        // Saturday 2025-07-19
        let r = resolver().try_resolve(pacific(2025, 7, 19, 17)).unwrap();
        assert_eq!(r.rate_period, RatePeriod::OffPeak);
        assert_eq!(r.rate_usd_per_kwh, 0.18);
    }

    #[test]
    fn test_winter_weekday_evening_is_mid_peak() {
        // Wednesday 2025-01-15
        let r = resolver().try_resolve(pacific(2025, 1, 15, 18)).unwrap();
        assert_eq!(r.rate_period, RatePeriod::MidPeak);
        assert_eq!(r.rate_usd_per_kwh, 0.30);
        let r = resolver().try_resolve(pacific(2025, 1, 15, 22)).unwrap();
        assert_eq!(r.rate_period, RatePeriod::OffPeak);
        assert_eq!(r.rate_usd_per_kwh, 0.22);
    }

    #[test]
    fn test_shift_boundaries_start_inclusive() {
        assert_eq!(shift_for_hour(5), ShiftName::Third);
        assert_eq!(shift_for_hour(6), ShiftName::First);
        assert_eq!(shift_for_hour(13), ShiftName::First);
        assert_eq!(shift_for_hour(14), ShiftName::Second);
        assert_eq!(shift_for_hour(21), ShiftName::Second);
        assert_eq!(shift_for_hour(22), ShiftName::Third);
        assert_eq!(shift_for_hour(0), ShiftName::Third);
    }

    #[test]
    fn test_tou_hour_boundaries() {
        assert_eq!(rate_period(7, Weekday::Mon, true), RatePeriod::OffPeak);
        assert_eq!(rate_period(8, Weekday::Mon, true), RatePeriod::MidPeak);
        assert_eq!(rate_period(16, Weekday::Mon, true), RatePeriod::OnPeak);
        assert_eq!(rate_period(21, Weekday::Mon, true), RatePeriod::OffPeak);
        assert_eq!(rate_period(8, Weekday::Sun, false), RatePeriod::SuperOffPeak);
        assert_eq!(rate_period(16, Weekday::Sun, false), RatePeriod::OffPeak);
    }

    #[test]
    fn test_season_boundaries() {
        assert!(!is_summer(5));
        assert!(is_summer(6));
        assert!(is_summer(9));
        assert!(!is_summer(10));
    }

    #[test]
    fn test_unknown_timezone_falls_back_explicitly() {
        let r = CalendarResolver::new("Nowhere/Special", TariffConfig::default());
        let ts = Utc.with_ymd_and_hms(2025, 7, 15, 0, 0, 0).unwrap();
        assert_eq!(
            r.try_resolve(ts),
            Err(CalendarError::UnknownTimezone("Nowhere/Special".to_string()))
        );
        let res = r.resolve(ts, 0.30);
        assert!(res.fallback);
        assert_eq!(res.shift, ShiftName::Unknown);
        assert_eq!(res.rate_period, RatePeriod::OffPeak);
        assert_eq!(res.rate_usd_per_kwh, 0.30);
        assert_eq!(r.local_date(ts), ts.date_naive());
    }

    #[test]
    fn test_local_date_crosses_utc_midnight() {
        // 03:00 UTC on the 16th is still the 15th in California
        let ts = Utc.with_ymd_and_hms(2025, 7, 16, 3, 0, 0).unwrap();
        assert_eq!(
            resolver().local_date(ts),
            NaiveDate::from_ymd_opt(2025, 7, 15).unwrap()
        );
    }
}
