//! Per-agent presence state.

use rw_core::{AgentId, RoomId};

/// Where one agent is, and where it is going if a move is in flight.
///
/// While `is_moving` the agent is still an occupant of `current_room`; it
/// only changes rooms when the move completes.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentPresenceState {
    pub agent:         AgentId,
    pub current_room:  RoomId,
    /// Simulated time of the last completed move (or registration).
    pub last_move_ms:  u64,
    pub is_moving:     bool,
    pub move_start_ms: Option<u64>,
    pub target_room:   Option<RoomId>,
}

impl AgentPresenceState {
    #[inline]
    pub fn stationary(agent: AgentId, room: RoomId, now_ms: u64) -> Self {
        Self {
            agent,
            current_room:  room,
            last_move_ms:  now_ms,
            is_moving:     false,
            move_start_ms: None,
            target_room:   None,
        }
    }

    /// Clear any in-flight move fields, leaving the agent where it is.
    pub(crate) fn settle(&mut self) {
        self.is_moving = false;
        self.move_start_ms = None;
        self.target_room = None;
    }
}
