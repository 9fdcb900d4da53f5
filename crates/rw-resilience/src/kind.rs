//! Error taxonomy and the records kept for each report.

use std::fmt;

use rw_core::{AgentId, RoomId};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ErrorType {
    MovementFailed,
    PathfindingError,
    ConfigurationError,
    PerformanceDegradation,
    UnknownError,
}

impl ErrorType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MovementFailed         => "MOVEMENT_FAILED",
            Self::PathfindingError       => "PATHFINDING_ERROR",
            Self::ConfigurationError     => "CONFIGURATION_ERROR",
            Self::PerformanceDegradation => "PERFORMANCE_DEGRADATION",
            Self::UnknownError           => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Contribution to the rolling degradation weight.  `Critical` bypasses
    /// the weight and forces the top level.
    pub fn weight(self) -> u32 {
        match self {
            Self::Low      => 0,
            Self::Medium   => 1,
            Self::High     => 4,
            Self::Critical => 0,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low      => "LOW",
            Self::Medium   => "MEDIUM",
            Self::High     => "HIGH",
            Self::Critical => "CRITICAL",
        })
    }
}

/// Where an error happened.  Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorContext {
    pub agent:     Option<AgentId>,
    pub room:      Option<RoomId>,
    pub operation: Option<String>,
}

impl ErrorContext {
    pub fn agent(agent: AgentId) -> Self {
        Self { agent: Some(agent), ..Self::default() }
    }

    pub fn in_room(mut self, room: RoomId) -> Self {
        self.room = Some(room);
        self
    }

    pub fn during(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }
}

#[derive(Clone, Debug)]
pub struct ErrorRecord {
    pub id:           u64,
    pub error_type:   ErrorType,
    pub severity:     Severity,
    pub message:      String,
    pub context:      ErrorContext,
    /// Present only when backtraces are enabled (`RUST_BACKTRACE`) and
    /// capture is configured.
    pub backtrace:    Option<String>,
    pub timestamp_ms: u64,
}
