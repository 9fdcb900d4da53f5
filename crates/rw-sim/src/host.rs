//! What the orchestrator reads from the host application on demand.

use rw_core::RoomId;
use rw_policy::RoomAccess;

/// Read-only view of host state consulted while building move contexts.
pub trait WorldHost {
    /// Where the player currently is, if anywhere.
    fn player_room(&self) -> Option<RoomId>;

    /// Accessibility movement-speed multiplier.  `1.0` is normal; lower is
    /// slower and `0` stops movement.
    fn movement_speed_multiplier(&self) -> f64 {
        1.0
    }

    /// Quest gates and locked doors.
    fn room_access(&self) -> &RoomAccess;
}

/// A [`WorldHost`] backed by plain fields, for tools, demos, and tests.
#[derive(Debug, Clone)]
pub struct StaticHost {
    pub player_room:      Option<RoomId>,
    pub speed_multiplier: f64,
    pub access:           RoomAccess,
}

impl Default for StaticHost {
    fn default() -> Self {
        Self { player_room: None, speed_multiplier: 1.0, access: RoomAccess::default() }
    }
}

impl WorldHost for StaticHost {
    fn player_room(&self) -> Option<RoomId> {
        self.player_room
    }

    fn movement_speed_multiplier(&self) -> f64 {
        self.speed_multiplier
    }

    fn room_access(&self) -> &RoomAccess {
        &self.access
    }
}
