//! Facility Configuration Module
//!
//! Static facility settings are loaded once from TOML; the three electrical
//! parameters an operator may tune live in a [`RuntimeConfigManager`].
//!
//! ## Loading Order
//!
//! 1. `SEPARATOR_CONFIG` environment variable (path to TOML file)
//! 2. `energy_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ```ignore
//! let facility = Arc::new(FacilityConfig::load());
//! let runtime = RuntimeConfigManager::new(RuntimeConfig::from_electrical(&facility.electrical));
//! ```

mod energy_config;
mod runtime;
pub mod defaults;
pub mod validation;

pub use energy_config::*;
pub use runtime::*;
