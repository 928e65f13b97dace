//! State Classifier: three boolean signals to one operating state.

use crate::types::OperatingState;

/// Map reconciled booleans to an operating state.
///
/// Fixed priority: `process` wins, then `cip`, then `running` (Idle),
/// otherwise Shutdown. Total over all eight inputs.
pub fn classify(process: bool, cip: bool, running: bool) -> OperatingState {
    if process {
        OperatingState::Processing
    } else if cip {
        OperatingState::Cip
    } else if running {
        OperatingState::Idle
    } else {
        OperatingState::Shutdown
    }
}
