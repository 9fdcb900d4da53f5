use rw_core::{AgentId, RoomId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PresenceError {
    #[error("presence tracker is stopped")]
    Stopped,

    #[error("agent {0} is not tracked")]
    UnknownAgent(AgentId),

    #[error("agent {0} is already moving")]
    AlreadyMoving(AgentId),

    #[error("agent {0} has no move in flight")]
    NotMoving(AgentId),

    #[error("room {0} is at capacity")]
    RoomFull(RoomId),

    #[error("agent {agent} is in room {actual}, not {claimed}")]
    WrongOrigin { agent: AgentId, claimed: RoomId, actual: RoomId },
}

pub type PresenceResult<T> = Result<T, PresenceError>;
