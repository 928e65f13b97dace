//! Energy Engine Module
//!
//! Pure, synchronous computation over one request's data. Nothing here does
//! I/O or holds state between calls.
//!
//! ## Stages
//! - `align()` - raw tag streams to classified per-minute rows
//! - `annotate()` - power, energy, TOU cost, shift per row
//! - `summary()` / `daily()` / `timeline()` / `current()` - report shapes
//!
//! ## Building Blocks
//! - `classify()` - three booleans to an operating state
//! - `CalendarResolver` - facility-local shift and TOU lookup

pub mod aggregation;
pub mod aligner;
pub mod calendar;
pub mod classifier;
pub mod cost;
pub mod rounding;

pub use aggregation::{current, daily, empty_summary, summary, timeline};
pub use aligner::{align, AlignerSettings, Alignment, AlignmentDiagnostics};
pub use calendar::{CalendarError, CalendarResolver, RateResolution};
pub use classifier::classify;
pub use cost::{annotate, power_kw};
