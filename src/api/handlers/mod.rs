//! API route handlers
//!
//! Thin wrappers: read "now" from the clock, call the pipeline, serialize.

mod config;
mod energy;
mod raw;
mod status;

pub use config::*;
pub use energy::*;
pub use raw::*;
pub use status::*;

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::pipeline::{Clock, EnergyPipeline};

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Clone)]
pub struct DashboardState {
    pub pipeline: Arc<EnergyPipeline>,
    /// System clock, or pinned to the end of replayed data
    pub clock: Clock,
}

impl DashboardState {
    pub fn new(pipeline: Arc<EnergyPipeline>, clock: Clock) -> Self {
        Self { pipeline, clock }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
