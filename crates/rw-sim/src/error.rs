use rw_core::{AgentId, RoomId};
use rw_policy::PolicyError;
use rw_presence::PresenceError;
use rw_resilience::{ErrorType, Severity};
use rw_schedule::ScheduleError;
use rw_zone::ZoneError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("orchestrator configuration error: {0}")]
    Config(String),

    #[error("orchestrator is not running")]
    NotRunning,

    #[error("agent {0} is not registered")]
    UnknownAgent(AgentId),

    #[error("agent {0} is already registered")]
    DuplicateAgent(AgentId),

    #[error("room {0} is not in the room registry")]
    UnknownRoom(RoomId),

    #[error("no legal move for {agent}: {reason}")]
    NoLegalMove { agent: AgentId, reason: String },

    #[error("zone rules block {agent} from entering {to}: {reason}")]
    ZoneBlocked { agent: AgentId, to: RoomId, reason: String },

    #[error("policy error: {0}")]
    Policy(#[from] PolicyError),

    #[error("presence error: {0}")]
    Presence(#[from] PresenceError),

    #[error("zone configuration error: {0}")]
    Zone(#[from] ZoneError),

    #[error("scheduler error: {0}")]
    Schedule(#[from] ScheduleError),
}

impl SimError {
    /// How a failed move attempt is filed with the resilience controller.
    /// `None` for errors that are the caller's fault or already reported.
    pub(crate) fn classify(&self) -> Option<(ErrorType, Severity)> {
        match self {
            SimError::NoLegalMove { .. } => Some((ErrorType::MovementFailed, Severity::Low)),
            SimError::Presence(_) => Some((ErrorType::MovementFailed, Severity::Medium)),
            SimError::Policy(_) => Some((ErrorType::ConfigurationError, Severity::Medium)),
            // Filed at the veto, before alternatives were tried.
            SimError::ZoneBlocked { .. } => None,
            SimError::Config(_)
            | SimError::NotRunning
            | SimError::UnknownAgent(_)
            | SimError::DuplicateAgent(_)
            | SimError::UnknownRoom(_)
            | SimError::Zone(_)
            | SimError::Schedule(_) => None,
        }
    }
}

pub type SimResult<T> = Result<T, SimError>;
