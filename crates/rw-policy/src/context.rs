//! Read-only snapshot passed to every policy decision.

use std::collections::HashMap;

use rw_core::{AgentId, RoomId};
use rw_spatial::RoomDistance;

// ── RoomLoad ──────────────────────────────────────────────────────────────────

/// Room capacities and current head-counts.
///
/// A capacity of `0` (or no entry) means unlimited.
#[derive(Debug, Clone, Default)]
pub struct RoomLoad {
    pub capacity:  HashMap<RoomId, u32>,
    pub occupancy: HashMap<RoomId, usize>,
}

impl RoomLoad {
    pub fn new(capacity: HashMap<RoomId, u32>, occupancy: HashMap<RoomId, usize>) -> Self {
        Self { capacity, occupancy }
    }

    pub fn occupants(&self, room: RoomId) -> usize {
        self.occupancy.get(&room).copied().unwrap_or(0)
    }

    /// `true` if `room` has a nonzero capacity that is already reached.
    pub fn is_full(&self, room: RoomId) -> bool {
        match self.capacity.get(&room).copied() {
            None | Some(0) => false,
            Some(cap) => self.occupants(room) >= cap as usize,
        }
    }
}

// ── RoomAccess ────────────────────────────────────────────────────────────────

/// Quest gates and locked doors.  A room with no entry in either map is
/// passable.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RoomAccess {
    /// `false` = the gate's quest condition is not yet met.
    pub quest_gates:  HashMap<RoomId, bool>,
    /// `true` = the door into the room is locked.
    pub locked_doors: HashMap<RoomId, bool>,
}

impl RoomAccess {
    pub fn is_passable(&self, room: RoomId) -> bool {
        let gate_open = self.quest_gates.get(&room).copied().unwrap_or(true);
        let locked = self.locked_doors.get(&room).copied().unwrap_or(false);
        gate_open && !locked
    }

    pub fn set_gate(&mut self, room: RoomId, open: bool) {
        self.quest_gates.insert(room, open);
    }

    pub fn set_locked(&mut self, room: RoomId, locked: bool) {
        self.locked_doors.insert(room, locked);
    }
}

// ── MoveContext ───────────────────────────────────────────────────────────────

/// Everything a policy may look at for one decision.
///
/// Built fresh for every decision and dropped right after; all borrows live
/// only for that call.
pub struct MoveContext<'a> {
    pub agent:            AgentId,
    pub current_room:     RoomId,
    /// Neighbors of `current_room` the agent is allowed to step into.
    pub allowed_adjacent: &'a [RoomId],
    pub home_room:        Option<RoomId>,
    /// Maximum distance from `home_room`; only applied when both are set.
    pub roam_radius:      Option<u32>,
    pub avoid_rooms:      &'a [RoomId],
    pub prefer_rooms:     &'a [RoomId],
    pub player_room:      Option<RoomId>,
    pub load:             &'a RoomLoad,
    pub access:           &'a RoomAccess,
    pub distance:         &'a dyn RoomDistance,
}

impl<'a> MoveContext<'a> {
    /// Build a context with no home, no lists, and no player.
    pub fn new(
        agent:            AgentId,
        current_room:     RoomId,
        allowed_adjacent: &'a [RoomId],
        load:             &'a RoomLoad,
        access:           &'a RoomAccess,
        distance:         &'a dyn RoomDistance,
    ) -> Self {
        Self {
            agent,
            current_room,
            allowed_adjacent,
            home_room: None,
            roam_radius: None,
            avoid_rooms: &[],
            prefer_rooms: &[],
            player_room: None,
            load,
            access,
            distance,
        }
    }

    pub fn with_home(mut self, home: RoomId, roam_radius: Option<u32>) -> Self {
        self.home_room = Some(home);
        self.roam_radius = roam_radius;
        self
    }

    pub fn with_room_lists(mut self, avoid: &'a [RoomId], prefer: &'a [RoomId]) -> Self {
        self.avoid_rooms = avoid;
        self.prefer_rooms = prefer;
        self
    }

    pub fn with_player(mut self, player_room: Option<RoomId>) -> Self {
        self.player_room = player_room;
        self
    }

    #[inline]
    pub(crate) fn dist(&self, a: RoomId, b: RoomId) -> u32 {
        self.distance.distance(a, b)
    }
}
