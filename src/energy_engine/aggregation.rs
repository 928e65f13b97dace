//! Aggregator: period, daily, timeline and live views over cost rows.
//!
//! Every rollup is built from the same [`Tally`] accumulator at full
//! precision and rounded only when the output shape is produced, so totals
//! at different granularities agree up to the final rounding step.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::calendar::RateResolution;
use super::classifier::classify;
use super::cost::power_kw;
use super::rounding::{
    round_to, AMPS_DP, HOURS_DP, KW_DP, MINUTE_COST_DP, MINUTE_KWH_DP, PCT_DP, RATE_DP,
    ROLLUP_COST_DP, ROLLUP_KWH_DP,
};
use crate::config::defaults::{MINUTES_PER_HOUR, NO_DATA_PERIOD, TIMELINE_MAX_ROWS};
use crate::config::RuntimeConfig;
use crate::types::{
    CostRow, CurrentSnapshot, CurrentValues, DailyRecord, DailyStateMetrics, OperatingState,
    PeriodSummary, ShiftMetrics, ShiftName, StateMetrics, Tag, TimelinePoint,
};

// ============================================================================
// Accumulators
// ============================================================================

/// Row count, energy and cost of one bucket. Each row is one minute.
#[derive(Debug, Clone, Copy, Default)]
struct Tally {
    minutes: usize,
    kwh: f64,
    cost_usd: f64,
}

impl Tally {
    fn add(&mut self, row: &CostRow) {
        self.minutes += 1;
        self.kwh += row.energy_kwh;
        self.cost_usd += row.cost_usd;
    }

    #[allow(clippy::cast_precision_loss)]
    fn hours(&self) -> f64 {
        round_to(self.minutes as f64 / MINUTES_PER_HOUR, HOURS_DP)
    }

    fn kwh(&self) -> f64 {
        round_to(self.kwh, ROLLUP_KWH_DP)
    }

    fn cost(&self) -> f64 {
        round_to(self.cost_usd, ROLLUP_COST_DP)
    }

    /// Share of `of`, in percent. An empty denominator counts as one row.
    #[allow(clippy::cast_precision_loss)]
    fn pct_of(&self, of: &Tally) -> f64 {
        round_to(self.minutes as f64 / of.minutes.max(1) as f64 * 100.0, PCT_DP)
    }
}

/// A bucket plus its per-state split.
#[derive(Debug, Clone, Copy, Default)]
struct Breakdown {
    total: Tally,
    by_state: [Tally; 4],
}

impl Breakdown {
    fn add(&mut self, row: &CostRow) {
        self.total.add(row);
        self.by_state[row.state().index()].add(row);
    }

    fn state_metrics(&self) -> BTreeMap<OperatingState, StateMetrics> {
        OperatingState::ALL
            .into_iter()
            .map(|state| {
                let t = &self.by_state[state.index()];
                let metrics = StateMetrics {
                    hours: t.hours(),
                    kwh: t.kwh(),
                    cost_usd: t.cost(),
                    pct_time: t.pct_of(&self.total),
                    color: state.color().to_string(),
                };
                (state, metrics)
            })
            .collect()
    }

    fn daily_state_metrics(&self) -> BTreeMap<OperatingState, DailyStateMetrics> {
        OperatingState::ALL
            .into_iter()
            .map(|state| {
                let t = &self.by_state[state.index()];
                let metrics = DailyStateMetrics {
                    hours: t.hours(),
                    kwh: t.kwh(),
                    cost_usd: t.cost(),
                    color: state.color().to_string(),
                };
                (state, metrics)
            })
            .collect()
    }

    fn shift_metrics(&self) -> ShiftMetrics {
        ShiftMetrics {
            hours: self.total.hours(),
            kwh: self.total.kwh(),
            cost_usd: self.total.cost(),
            by_state: self.state_metrics(),
        }
    }
}

/// Whole-set breakdown plus one breakdown per shift.
#[derive(Debug, Clone, Default)]
struct Rollup {
    all: Breakdown,
    shifts: BTreeMap<ShiftName, Breakdown>,
}

impl Rollup {
    fn add(&mut self, row: &CostRow) {
        self.all.add(row);
        self.shifts.entry(row.shift).or_default().add(row);
    }

    /// The three reported shifts always appear; `Unknown` only when some rows
    /// fell back, so shift totals still sum to the period total.
    fn by_shift(&self) -> BTreeMap<ShiftName, ShiftMetrics> {
        let mut out: BTreeMap<ShiftName, ShiftMetrics> = ShiftName::REPORTED
            .into_iter()
            .map(|shift| {
                let b = self.shifts.get(&shift).copied().unwrap_or_default();
                (shift, b.shift_metrics())
            })
            .collect();
        if let Some(unknown) = self.shifts.get(&ShiftName::Unknown) {
            out.insert(ShiftName::Unknown, unknown.shift_metrics());
        }
        out
    }
}

impl<'a> FromIterator<&'a CostRow> for Rollup {
    fn from_iter<I: IntoIterator<Item = &'a CostRow>>(iter: I) -> Self {
        let mut rollup = Self::default();
        for row in iter {
            rollup.add(row);
        }
        rollup
    }
}

// ============================================================================
// Entry Points
// ============================================================================

/// Totals over the whole window.
///
/// `period` spans the UTC dates of the earliest and latest rows, unlike
/// [`daily`] which groups by facility-local date. An empty input gives the
/// zero-valued "No data" summary.
pub fn summary(rows: &[CostRow], config: &RuntimeConfig) -> PeriodSummary {
    let (Some(first), Some(last)) = (
        rows.iter().map(CostRow::timestamp).min(),
        rows.iter().map(CostRow::timestamp).max(),
    ) else {
        return empty_summary(config);
    };

    let rollup: Rollup = rows.iter().collect();
    PeriodSummary {
        period: format!("{} to {}", format_date(first.date_naive()), format_date(last.date_naive())),
        rate_per_kwh: config.rate_per_kwh,
        total_cost_usd: rollup.all.total.cost(),
        total_kwh: rollup.all.total.kwh(),
        by_state: rollup.all.state_metrics(),
        by_shift: rollup.by_shift(),
    }
}

/// Zero-valued summary with every state and reported shift present.
pub fn empty_summary(config: &RuntimeConfig) -> PeriodSummary {
    let rollup = Rollup::default();
    PeriodSummary {
        period: NO_DATA_PERIOD.to_string(),
        rate_per_kwh: config.rate_per_kwh,
        total_cost_usd: 0.0,
        total_kwh: 0.0,
        by_state: rollup.all.state_metrics(),
        by_shift: rollup.by_shift(),
    }
}

/// One record per facility-local date, ascending.
pub fn daily(rows: &[CostRow]) -> Vec<DailyRecord> {
    let mut days: BTreeMap<NaiveDate, Rollup> = BTreeMap::new();
    for row in rows {
        days.entry(row.local_date).or_default().add(row);
    }

    days.into_iter()
        .map(|(date, rollup)| DailyRecord {
            date,
            total_cost_usd: rollup.all.total.cost(),
            total_kwh: rollup.all.total.kwh(),
            by_state: rollup.all.daily_state_metrics(),
            by_shift: rollup.by_shift(),
        })
        .collect()
}

/// The most recent rows (at most 24 h of minutes), one point each.
pub fn timeline(rows: &[CostRow]) -> Vec<TimelinePoint> {
    let start = rows.len().saturating_sub(TIMELINE_MAX_ROWS);
    rows[start..]
        .iter()
        .map(|row| TimelinePoint {
            timestamp: row.timestamp(),
            kw: round_to(row.power_kw, KW_DP),
            kwh: round_to(row.energy_kwh, MINUTE_KWH_DP),
            cost_usd: round_to(row.cost_usd, MINUTE_COST_DP),
            state: row.state(),
            color: row.state().color().to_string(),
            tou_period: row.rate_period,
            tou_rate: round_to(row.rate_usd_per_kwh, RATE_DP),
            shift: row.shift,
        })
        .collect()
}

/// Live snapshot from the latest value of each tag.
///
/// State and calendar labels never depend on the current reading; without
/// one, the power and cost fields are `None`.
pub fn current(values: &CurrentValues, labels: &RateResolution, config: &RuntimeConfig) -> CurrentSnapshot {
    let state = classify(
        values.flag(Tag::Process),
        values.flag(Tag::Cip),
        values.flag(Tag::Running),
    );
    let rate = labels.rate_usd_per_kwh;
    let amps = values.motor_amps().filter(|a| a.is_finite());
    let kw = amps.map(|a| power_kw(a, config));

    CurrentSnapshot {
        amps: amps.map(|a| round_to(a, AMPS_DP)),
        kw: kw.map(|k| round_to(k, KW_DP)),
        cost_per_hour: kw.map(|k| round_to(k * rate, ROLLUP_COST_DP)),
        state,
        color: state.color().to_string(),
        tou_period: labels.rate_period,
        tou_rate: round_to(rate, RATE_DP),
        shift: labels.shift,
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AlignedRow, RatePeriod, SampleValue};
    use chrono::{Duration, TimeZone, Utc};

    fn config() -> RuntimeConfig {
        RuntimeConfig {
            rate_per_kwh: 0.30,
            voltage: 460.0,
            power_factor: 0.88,
        }
    }

    fn cost_row(minute: i64, state: OperatingState, shift: ShiftName, day: u32) -> CostRow {
        let kw = 30.0;
        CostRow {
            aligned: AlignedRow {
                timestamp: Utc.with_ymd_and_hms(2025, 7, 14, 0, 0, 0).unwrap() + Duration::minutes(minute),
                current: 42.8,
                running: true,
                cip: state == OperatingState::Cip,
                process: state == OperatingState::Processing,
                state,
            },
            power_kw: kw,
            energy_kwh: kw / 60.0,
            cost_usd: kw / 60.0 * 0.28,
            shift,
            rate_period: RatePeriod::MidPeak,
            rate_usd_per_kwh: 0.28,
            local_date: NaiveDate::from_ymd_opt(2025, 7, day).unwrap(),
        }
    }

    fn sample_rows() -> Vec<CostRow> {
        let mut rows = Vec::new();
        let mut minute = 0;
        for (count, state, shift, day) in [
            (90, OperatingState::Processing, ShiftName::First, 14),
            (30, OperatingState::Cip, ShiftName::First, 14),
            (45, OperatingState::Idle, ShiftName::Second, 14),
            (15, OperatingState::Shutdown, ShiftName::Third, 15),
            (60, OperatingState::Processing, ShiftName::Third, 15),
        ] {
            for _ in 0..count {
                rows.push(cost_row(minute, state, shift, day));
                minute += 1;
            }
        }
        rows
    }

    #[test]
    fn test_empty_summary_is_zeroed() {
        let s = summary(&[], &config());
        assert_eq!(s.period, "No data");
        assert_eq!(s.total_cost_usd, 0.0);
        assert_eq!(s.total_kwh, 0.0);
        assert_eq!(s.rate_per_kwh, 0.30);
        assert_eq!(s.by_state.len(), 4);
        assert_eq!(s.by_shift.len(), 3);
        for metrics in s.by_state.values() {
            assert_eq!(metrics.hours, 0.0);
            assert_eq!(metrics.pct_time, 0.0);
        }
        for shift in s.by_shift.values() {
            assert_eq!(shift.cost_usd, 0.0);
            assert_eq!(shift.by_state.len(), 4);
        }
    }

    #[test]
    fn test_summary_breakdowns() {
        let s = summary(&sample_rows(), &config());
        assert_eq!(s.period, "2025-07-14 to 2025-07-14");

        let processing = &s.by_state[&OperatingState::Processing];
        assert_eq!(processing.hours, 2.5);
        assert_eq!(processing.pct_time, 62.5);
        assert_eq!(processing.kwh, 75.0);
        assert_eq!(processing.cost_usd, 21.0);
        assert_eq!(processing.color, "#22C55E");

        let first = &s.by_shift[&ShiftName::First];
        assert_eq!(first.hours, 2.0);
        assert_eq!(first.by_state[&OperatingState::Cip].pct_time, 25.0);
        assert!(!s.by_shift.contains_key(&ShiftName::Unknown));
    }

    #[test]
    fn test_sums_agree_across_granularities() {
        let rows = sample_rows();
        let s = summary(&rows, &config());
        let tolerance = 0.011;

        let by_state_cost: f64 = s.by_state.values().map(|m| m.cost_usd).sum();
        let by_shift_cost: f64 = s.by_shift.values().map(|m| m.cost_usd).sum();
        assert!((by_state_cost - s.total_cost_usd).abs() < tolerance);
        assert!((by_shift_cost - s.total_cost_usd).abs() < tolerance);

        let by_state_hours: f64 = s.by_state.values().map(|m| m.hours).sum();
        assert!((by_state_hours - 4.0).abs() < 0.11);

        let days = daily(&rows);
        let daily_cost: f64 = days.iter().map(|d| d.total_cost_usd).sum();
        assert!((daily_cost - s.total_cost_usd).abs() < tolerance);
    }

    #[test]
    fn test_daily_groups_by_local_date() {
        let days = daily(&sample_rows());
        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date.to_string(), "2025-07-14");
        assert_eq!(days[1].date.to_string(), "2025-07-15");
        assert_eq!(days[0].by_state[&OperatingState::Idle].hours, 0.8);
        assert_eq!(days[1].by_shift[&ShiftName::Third].hours, 1.2);
        assert_eq!(days[1].by_shift[&ShiftName::First].hours, 0.0);
        assert!(daily(&[]).is_empty());
    }

    #[test]
    fn test_period_label_uses_utc_dates() {
        // 2025-07-16 03:00 UTC is still 2025-07-15 in the facility
        let mut row = cost_row(0, OperatingState::Processing, ShiftName::Second, 15);
        row.aligned.timestamp = Utc.with_ymd_and_hms(2025, 7, 16, 3, 0, 0).unwrap();
        let rows = [row];

        assert_eq!(summary(&rows, &config()).period, "2025-07-16 to 2025-07-16");
        assert_eq!(daily(&rows)[0].date.to_string(), "2025-07-15");
    }

    #[test]
    fn test_quarter_hour_buckets_round_to_even() {
        let rows: Vec<_> = (0..15)
            .map(|m| cost_row(m, OperatingState::Processing, ShiftName::First, 14))
            .collect();
        let s = summary(&rows, &config());
        assert_eq!(s.by_state[&OperatingState::Processing].hours, 0.2);
        assert_eq!(s.by_shift[&ShiftName::First].hours, 0.2);

        let rows: Vec<_> = (0..75)
            .map(|m| cost_row(m, OperatingState::Idle, ShiftName::Second, 14))
            .collect();
        assert_eq!(summary(&rows, &config()).by_state[&OperatingState::Idle].hours, 1.2);
    }

    #[test]
    fn test_unknown_shift_reported_when_present() {
        let rows = vec![cost_row(0, OperatingState::Idle, ShiftName::Unknown, 14)];
        let s = summary(&rows, &config());
        assert_eq!(s.by_shift.len(), 4);
        assert_eq!(s.by_shift[&ShiftName::Unknown].by_state[&OperatingState::Idle].pct_time, 100.0);
    }

    #[test]
    fn test_timeline_keeps_last_day_with_fine_precision() {
        let rows: Vec<_> = (0..1500)
            .map(|m| cost_row(m, OperatingState::Processing, ShiftName::First, 14))
            .collect();
        let points = timeline(&rows);
        assert_eq!(points.len(), 1440);
        assert_eq!(points[0].timestamp, rows[60].timestamp());
        assert_eq!(points[0].kw, 30.0);
        assert_eq!(points[0].kwh, 0.5);
        assert_eq!(points[0].cost_usd, 0.14);
        assert_eq!(points[0].tou_rate, 0.28);
        assert!(timeline(&[]).is_empty());
    }

    #[test]
    fn test_current_snapshot() {
        let mut values = CurrentValues::new();
        values.set(Tag::MotorAmps, SampleValue::Number(47.04));
        values.set(Tag::Process, SampleValue::Bool(true));
        let labels = RateResolution {
            shift: ShiftName::Second,
            rate_period: RatePeriod::OnPeak,
            rate_usd_per_kwh: 0.38,
            fallback: false,
        };
        let snap = current(&values, &labels, &config());
        assert_eq!(snap.amps, Some(47.0));
        assert_eq!(snap.kw, Some(32.98));
        assert_eq!(snap.cost_per_hour, Some(12.53));
        assert_eq!(snap.state, OperatingState::Processing);
        assert_eq!(snap.tou_period, RatePeriod::OnPeak);
        assert_eq!(snap.shift, ShiftName::Second);
    }

    #[test]
    fn test_current_without_amps_keeps_labels() {
        let mut values = CurrentValues::new();
        values.set(Tag::Running, SampleValue::Number(1.0));
        let snap = current(&values, &RateResolution::fallback(0.30), &config());
        assert_eq!(snap.amps, None);
        assert_eq!(snap.kw, None);
        assert_eq!(snap.cost_per_hour, None);
        assert_eq!(snap.state, OperatingState::Idle);
        assert_eq!(snap.tou_rate, 0.30);
        assert_eq!(snap.shift, ShiftName::Unknown);
    }
}
