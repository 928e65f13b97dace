//! Shared data structures for the separator energy pipeline
//!
//! This module defines the types that flow through each stage:
//! - Historian input: RawSample, TagStreams, CurrentValues
//! - Classification: OperatingState, ShiftName, RatePeriod
//! - Per-minute rows: AlignedRow (aligner), CostRow (cost annotator)
//! - Report shapes: PeriodSummary, DailyRecord, TimelinePoint, CurrentSnapshot

mod reports;
mod rows;
mod samples;
mod state;

pub use reports::*;
pub use rows::*;
pub use samples::*;
pub use state::*;
