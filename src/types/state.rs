//! Core classification types: OperatingState, ShiftName, RatePeriod

use serde::{Deserialize, Serialize};

// ============================================================================
// Operating State
// ============================================================================

/// Operating state of the separator for one minute.
///
/// Mutually exclusive and total. Declaration order is the report order and
/// also the classification priority (Processing wins over everything).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OperatingState {
    Processing,
    #[serde(rename = "CIP")]
    Cip,
    Idle,
    Shutdown,
}

impl OperatingState {
    pub const ALL: [OperatingState; 4] = [
        OperatingState::Processing,
        OperatingState::Cip,
        OperatingState::Idle,
        OperatingState::Shutdown,
    ];

    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            OperatingState::Processing => "Processing",
            OperatingState::Cip => "CIP",
            OperatingState::Idle => "Idle",
            OperatingState::Shutdown => "Shutdown",
        }
    }

    /// Chart colour shared with the dashboard frontend.
    pub fn color(&self) -> &'static str {
        match self {
            OperatingState::Processing => "#22C55E",
            OperatingState::Cip => "#3B82F6",
            OperatingState::Idle => "#F59E0B",
            OperatingState::Shutdown => "#6B7280",
        }
    }

    /// Position in [`OperatingState::ALL`].
    pub fn index(&self) -> usize {
        match self {
            OperatingState::Processing => 0,
            OperatingState::Cip => 1,
            OperatingState::Idle => 2,
            OperatingState::Shutdown => 3,
        }
    }
}

impl std::fmt::Display for OperatingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Shift
// ============================================================================

/// Facility-local 8-hour work period.
///
/// `Unknown` only appears when the facility timezone cannot be resolved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ShiftName {
    #[serde(rename = "1st Shift")]
    First,
    #[serde(rename = "2nd Shift")]
    Second,
    #[serde(rename = "3rd Shift")]
    Third,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl ShiftName {
    /// Shifts that always appear in reports, even with no data.
    pub const REPORTED: [ShiftName; 3] = [ShiftName::First, ShiftName::Second, ShiftName::Third];

    pub fn display_name(&self) -> &'static str {
        match self {
            ShiftName::First => "1st Shift",
            ShiftName::Second => "2nd Shift",
            ShiftName::Third => "3rd Shift",
            ShiftName::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for ShiftName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Time-of-Use Rate Period
// ============================================================================

/// TOU tier label active at a facility-local instant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RatePeriod {
    #[serde(rename = "On-Peak")]
    OnPeak,
    #[serde(rename = "Mid-Peak")]
    MidPeak,
    #[serde(rename = "Off-Peak")]
    OffPeak,
    #[serde(rename = "Super Off-Peak")]
    SuperOffPeak,
}

impl RatePeriod {
    pub fn display_name(&self) -> &'static str {
        match self {
            RatePeriod::OnPeak => "On-Peak",
            RatePeriod::MidPeak => "Mid-Peak",
            RatePeriod::OffPeak => "Off-Peak",
            RatePeriod::SuperOffPeak => "Super Off-Peak",
        }
    }
}

impl std::fmt::Display for RatePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
