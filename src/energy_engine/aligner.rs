//! Timeline Aligner
//!
//! Reconciles the asynchronously sampled tag streams onto one per-minute grid:
//!
//! 1. Grid = every minute from `floor(min t)` to `floor(max t)` over all tags
//! 2. Boolean tags: last observation carried forward, `false` before the first
//! 3. Motor current: nearest sample within the tolerance, no interpolation
//! 4. Minutes without a current reading are dropped
//! 5. Each surviving minute is classified

use chrono::{DateTime, Duration, Timelike, Utc};
use tracing::{info, warn};

use super::classifier::classify;
use crate::config::defaults::{ANALOG_TOLERANCE_SECS, DEFAULT_MAX_MOTOR_AMPS};
use crate::config::ElectricalConfig;
use crate::types::{AlignedRow, OperatingState, RawSample, Tag, TagStreams};

// ============================================================================
// Settings & Output
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignerSettings {
    /// Furthest a current sample may sit from the grid minute it fills
    pub analog_tolerance: Duration,
    /// Readings above this pass through but are counted and logged
    pub max_current: f64,
}

impl AlignerSettings {
    pub fn from_electrical(electrical: &ElectricalConfig) -> Self {
        Self {
            max_current: electrical.max_motor_amps,
            ..Self::default()
        }
    }
}

impl Default for AlignerSettings {
    fn default() -> Self {
        Self {
            analog_tolerance: Duration::seconds(ANALOG_TOLERANCE_SECS),
            max_current: DEFAULT_MAX_MOTOR_AMPS,
        }
    }
}

/// What happened during one alignment, for logs and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignmentDiagnostics {
    /// Minutes in the constructed grid
    pub grid_minutes: usize,
    /// Grid minutes with no current reading within tolerance
    pub dropped_minutes: usize,
    /// Emitted rows whose current exceeds `max_current`
    pub implausible_current_rows: usize,
    /// Tags that supplied no samples
    pub empty_tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alignment {
    pub rows: Vec<AlignedRow>,
    pub diagnostics: AlignmentDiagnostics,
}

// ============================================================================
// Alignment
// ============================================================================

/// Align raw tag streams into classified per-minute rows.
///
/// Input may be unsorted and contain duplicate timestamps; at an exact
/// duplicate the later sample in input order wins.
pub fn align(streams: &TagStreams, settings: &AlignerSettings) -> Alignment {
    let mut diagnostics = AlignmentDiagnostics {
        empty_tags: Tag::ALL
            .into_iter()
            .filter(|tag| streams.get(*tag).is_empty())
            .collect(),
        ..Default::default()
    };

    if streams.is_empty() {
        warn!("All tag streams are empty");
        return Alignment { rows: Vec::new(), diagnostics };
    }
    for tag in &diagnostics.empty_tags {
        warn!(tag = %tag, "Tag has no data");
    }

    let Some(grid) = minute_grid(streams) else {
        return Alignment { rows: Vec::new(), diagnostics };
    };
    diagnostics.grid_minutes = grid.len();

    let running = forward_fill(streams.get(Tag::Running), &grid);
    let cip = forward_fill(streams.get(Tag::Cip), &grid);
    let process = forward_fill(streams.get(Tag::Process), &grid);
    let current = nearest_within(streams.get(Tag::MotorAmps), &grid, settings.analog_tolerance);

    let mut rows = Vec::with_capacity(grid.len());
    for (i, &timestamp) in grid.iter().enumerate() {
        let Some(current) = current[i] else {
            diagnostics.dropped_minutes += 1;
            continue;
        };
        rows.push(AlignedRow {
            timestamp,
            current,
            running: running[i],
            cip: cip[i],
            process: process[i],
            state: classify(process[i], cip[i], running[i]),
        });
    }

    diagnostics.implausible_current_rows = rows
        .iter()
        .filter(|r| r.current > settings.max_current)
        .count();
    if diagnostics.implausible_current_rows > 0 {
        warn!(
            rows = diagnostics.implausible_current_rows,
            max_current = settings.max_current,
            "Motor current above plausible maximum"
        );
    }

    let mut state_counts = [0usize; 4];
    for row in &rows {
        state_counts[row.state.index()] += 1;
    }
    info!(
        rows = rows.len(),
        grid_minutes = diagnostics.grid_minutes,
        dropped_minutes = diagnostics.dropped_minutes,
        processing = state_counts[OperatingState::Processing.index()],
        cip = state_counts[OperatingState::Cip.index()],
        idle = state_counts[OperatingState::Idle.index()],
        shutdown = state_counts[OperatingState::Shutdown.index()],
        "Aligned per-minute timeline"
    );

    Alignment { rows, diagnostics }
}

pub fn floor_to_minute(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

/// Inclusive minute grid over every sample of every tag.
fn minute_grid(streams: &TagStreams) -> Option<Vec<DateTime<Utc>>> {
    let times = streams.iter().flat_map(|(_, samples)| samples.iter().map(|s| s.timestamp));
    let (min, max) = times.fold(None, |acc: Option<(DateTime<Utc>, DateTime<Utc>)>, t| match acc {
        None => Some((t, t)),
        Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
    })?;

    let start = floor_to_minute(min);
    let end = floor_to_minute(max);
    let minutes = usize::try_from((end - start).num_minutes()).unwrap_or(0) + 1;
    Some(
        (0..minutes)
            .map(|i| start + Duration::minutes(i64::try_from(i).unwrap_or(i64::MAX)))
            .collect(),
    )
}

/// Samples ordered by time; stable, so duplicates keep input order.
fn sorted(samples: &[RawSample]) -> Vec<&RawSample> {
    let mut sorted: Vec<&RawSample> = samples.iter().collect();
    sorted.sort_by_key(|s| s.timestamp);
    sorted
}

/// Last-known-value tracker for an event-driven boolean tag.
fn forward_fill(samples: &[RawSample], grid: &[DateTime<Utc>]) -> Vec<bool> {
    let samples = sorted(samples);
    let mut next = 0;
    let mut last: Option<bool> = None;

    grid.iter()
        .map(|&minute| {
            while next < samples.len() && samples[next].timestamp <= minute {
                last = Some(samples[next].value.as_bool());
                next += 1;
            }
            last.unwrap_or(false)
        })
        .collect()
}

/// Nearest analog sample per grid minute, if within `tolerance` (inclusive).
///
/// Equidistant samples on both sides resolve to the later one.
fn nearest_within(
    samples: &[RawSample],
    grid: &[DateTime<Utc>],
    tolerance: Duration,
) -> Vec<Option<f64>> {
    let samples: Vec<&RawSample> = sorted(samples)
        .into_iter()
        .filter(|s| s.value.as_f64().is_finite())
        .collect();

    grid.iter()
        .map(|&minute| {
            let split = samples.partition_point(|s| s.timestamp < minute);

            // Last sample strictly before the minute
            let before = split.checked_sub(1).map(|i| samples[i]);
            // Last sample at the earliest timestamp >= minute
            let after = samples.get(split).map(|first| {
                let ts = first.timestamp;
                let end = samples.partition_point(|s| s.timestamp <= ts);
                samples[end - 1]
            });

            let pick = match (before, after) {
                (Some(b), Some(a)) => {
                    if minute - b.timestamp < a.timestamp - minute {
                        b
                    } else {
                        a
                    }
                }
                (Some(b), None) => b,
                (None, Some(a)) => a,
                (None, None) => return None,
            };

            let distance = (pick.timestamp - minute).abs();
            (distance <= tolerance).then(|| pick.value.as_f64())
        })
        .collect()
}
