//! Energy Pipeline - fetch, align, annotate, aggregate

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::config::defaults::{
    DEFAULT_CURRENT_WINDOW_MINUTES, DEFAULT_LOOKBACK_DAYS, RAW_DEBUG_HOURS_RANGE, TIMELINE_WINDOW_HOURS,
};
use crate::config::{FacilityConfig, RuntimeConfig, RuntimeConfigManager};
use crate::energy_engine::{self, AlignerSettings, CalendarResolver};
use crate::historian::{fetch_all_tags, fetch_current_values, HistorianSource};
use crate::types::{
    CostRow, CurrentSnapshot, DailyRecord, PeriodSummary, RawTagSummary, TimelinePoint,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    #[error("hours must be between {min} and {max} (got {hours})")]
    InvalidHours { hours: i64, min: i64, max: i64 },
}

/// Wires the historian, static facility settings and the live runtime
/// config into the engine stages.
pub struct EnergyPipeline {
    historian: Arc<dyn HistorianSource>,
    facility: Arc<FacilityConfig>,
    runtime: Arc<RuntimeConfigManager>,
    calendar: CalendarResolver,
    aligner: AlignerSettings,
}

impl EnergyPipeline {
    pub fn new(
        historian: Arc<dyn HistorianSource>,
        facility: Arc<FacilityConfig>,
        runtime: Arc<RuntimeConfigManager>,
    ) -> Self {
        let calendar = CalendarResolver::from_config(&facility);
        let aligner = AlignerSettings::from_electrical(&facility.electrical);
        Self {
            historian,
            facility,
            runtime,
            calendar,
            aligner,
        }
    }

    pub fn facility(&self) -> &FacilityConfig {
        &self.facility
    }

    pub fn runtime(&self) -> &RuntimeConfigManager {
        &self.runtime
    }

    pub fn calendar(&self) -> &CalendarResolver {
        &self.calendar
    }

    fn lookback(&self) -> Duration {
        Duration::try_days(self.facility.historian.lookback_days)
            .unwrap_or_else(|| Duration::days(DEFAULT_LOOKBACK_DAYS))
    }

    /// Live-value window. Out-of-range values from an unvalidated config use
    /// the default instead of overflowing.
    fn current_window(&self) -> Duration {
        Duration::try_minutes(self.facility.historian.current_window_minutes)
            .unwrap_or_else(|| Duration::minutes(DEFAULT_CURRENT_WINDOW_MINUTES))
    }

    /// Stages 1-3 for one window.
    async fn cost_rows(&self, start: DateTime<Utc>, end: DateTime<Utc>, config: &RuntimeConfig) -> Vec<CostRow> {
        let streams = fetch_all_tags(self.historian.as_ref(), &self.facility.tags, start, end).await;
        let alignment = energy_engine::align(&streams, &self.aligner);
        let rows = energy_engine::annotate(&alignment.rows, config, &self.calendar);
        info!(
            source = self.historian.source_name(),
            rows = rows.len(),
            dropped_minutes = alignment.diagnostics.dropped_minutes,
            "Computed cost rows"
        );
        rows
    }

    /// Lookback-window totals by state and shift.
    pub async fn summary(&self, now: DateTime<Utc>) -> PeriodSummary {
        let config = self.runtime.snapshot();
        let rows = self.cost_rows(now - self.lookback(), now, &config).await;
        energy_engine::summary(&rows, &config)
    }

    /// Lookback-window totals per facility-local day.
    pub async fn daily(&self, now: DateTime<Utc>) -> Vec<DailyRecord> {
        let config = self.runtime.snapshot();
        let rows = self.cost_rows(now - self.lookback(), now, &config).await;
        energy_engine::daily(&rows)
    }

    /// Per-minute points for the last 24 hours.
    pub async fn timeline(&self, now: DateTime<Utc>) -> Vec<TimelinePoint> {
        let config = self.runtime.snapshot();
        let start = now - Duration::hours(TIMELINE_WINDOW_HOURS);
        let rows = self.cost_rows(start, now, &config).await;
        energy_engine::timeline(&rows)
    }

    /// Live snapshot from the latest value of each tag.
    pub async fn current(&self, now: DateTime<Utc>) -> CurrentSnapshot {
        let config = self.runtime.snapshot();
        let window = self.current_window();
        let values = fetch_current_values(self.historian.as_ref(), &self.facility.tags, now, window).await;
        let labels = self.calendar.resolve(now, config.rate_per_kwh);
        energy_engine::current(&values, &labels, &config)
    }

    /// Per-tag sample counts and first/last samples over the last `hours`.
    pub async fn raw_debug(&self, now: DateTime<Utc>, hours: i64) -> Result<Vec<RawTagSummary>, PipelineError> {
        let (min, max) = RAW_DEBUG_HOURS_RANGE;
        if !(min..=max).contains(&hours) {
            return Err(PipelineError::InvalidHours { hours, min, max });
        }

        let streams = fetch_all_tags(
            self.historian.as_ref(),
            &self.facility.tags,
            now - Duration::hours(hours),
            now,
        )
        .await;

        Ok(streams
            .iter()
            .map(|(tag, samples)| RawTagSummary {
                tag: tag.alias().to_string(),
                point_count: samples.len(),
                first: samples.first().cloned(),
                last: samples.last().cloned(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TagPaths;
    use crate::historian::MemoryHistorian;
    use crate::types::{OperatingState, RawSample, ShiftName, Tag};
    use chrono::TimeZone;

    fn pipeline(historian: MemoryHistorian) -> EnergyPipeline {
        let facility = Arc::new(FacilityConfig::default());
        let runtime = Arc::new(RuntimeConfigManager::new(RuntimeConfig::from_electrical(
            &facility.electrical,
        )));
        EnergyPipeline::new(Arc::new(historian), facility, runtime)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 16, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_unreachable_data_gives_well_formed_answers() {
        let p = pipeline(MemoryHistorian::new(192));
        let summary = p.summary(now()).await;
        assert_eq!(summary.period, "No data");
        assert!(p.daily(now()).await.is_empty());
        assert!(p.timeline(now()).await.is_empty());

        let current = p.current(now()).await;
        assert_eq!(current.amps, None);
        assert_eq!(current.state, OperatingState::Shutdown);
    }

    #[tokio::test]
    async fn test_current_uses_calendar_at_now() {
        let tags = TagPaths::default();
        let mut h = MemoryHistorian::new(192);
        // 2025-07-16 00:00 UTC = Tuesday 17:00 PDT
        h.insert(tags.path(Tag::MotorAmps), vec![RawSample::new(now() - Duration::seconds(30), 47.0, 192)]);
        let current = pipeline(h).current(now()).await;
        assert_eq!(current.kw, Some(32.95));
        assert_eq!(current.shift, ShiftName::Second);
        assert_eq!(current.tou_rate, 0.38);
    }

    #[tokio::test]
    async fn test_huge_current_window_does_not_overflow() {
        let mut facility = FacilityConfig::default();
        facility.historian.current_window_minutes = i64::MAX;
        facility.historian.lookback_days = i64::MAX;
        let facility = Arc::new(facility);
        let runtime = Arc::new(RuntimeConfigManager::new(RuntimeConfig::from_electrical(
            &facility.electrical,
        )));
        let p = EnergyPipeline::new(Arc::new(MemoryHistorian::new(192)), facility, runtime);

        assert_eq!(p.current_window(), Duration::minutes(2));
        assert_eq!(p.lookback(), Duration::days(7));
        assert_eq!(p.current(now()).await.amps, None);
    }

    #[tokio::test]
    async fn test_raw_debug_bounds() {
        let p = pipeline(MemoryHistorian::new(192));
        assert!(matches!(
            p.raw_debug(now(), 0).await,
            Err(PipelineError::InvalidHours { hours: 0, .. })
        ));
        assert!(p.raw_debug(now(), 169).await.is_err());
        let list = p.raw_debug(now(), 1).await.unwrap();
        assert_eq!(list.len(), 4);
        assert!(list.iter().all(|t| t.point_count == 0 && t.first.is_none()));
    }

    #[tokio::test]
    async fn test_summary_rate_reflects_runtime_update() {
        let p = pipeline(MemoryHistorian::new(192));
        p.runtime()
            .update(crate::config::RuntimeConfigUpdate {
                rate_per_kwh: Some(0.25),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(p.summary(now()).await.rate_per_kwh, 0.25);
    }
}
