//! Separator Energy: per-minute operating state and time-of-use cost engine
//!
//! Turns raw historian samples for one separator motor into per-minute
//! operating state, power, energy and cost, then rolls them up for the
//! energy dashboard.
//!
//! ## Architecture
//!
//! - **Historian**: TimeBase REST client behind the [`historian::HistorianSource`] trait
//! - **Energy Engine**: aligner, classifier, calendar/rate resolver, cost annotator, aggregator
//! - **Pipeline**: per-request fetch → align → annotate → aggregate
//! - **API**: axum router serving the dashboard JSON

pub mod api;
pub mod config;
pub mod energy_engine;
pub mod historian;
pub mod pipeline;
pub mod types;

// Re-export configuration
pub use config::{FacilityConfig, RuntimeConfig, RuntimeConfigManager};

// Re-export commonly used types
pub use types::{
    AlignedRow, CostRow, CurrentSnapshot, DailyRecord, OperatingState, PeriodSummary, RatePeriod,
    RawSample, ShiftName, Tag, TagStreams, TimelinePoint,
};

// Re-export the engine entry points
pub use energy_engine::{align, annotate, classify, AlignerSettings, CalendarResolver};

pub use historian::{HistorianSource, MemoryHistorian, TimeBaseClient};
pub use pipeline::{Clock, EnergyPipeline};
