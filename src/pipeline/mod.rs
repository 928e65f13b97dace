//! Request Pipeline Module
//!
//! ```text
//! STAGE 1: Historian fetch (concurrent, one request per tag)
//! STAGE 2: Timeline alignment (per-minute grid, state classification)
//! STAGE 3: Cost annotation (runtime config snapshot + calendar resolver)
//! STAGE 4: Aggregation (summary / daily / timeline / current)
//! ```
//!
//! Every request runs its own pipeline instance; nothing computed here is
//! cached between requests.

mod clock;
mod energy;

pub use clock::Clock;
pub use energy::{EnergyPipeline, PipelineError};
