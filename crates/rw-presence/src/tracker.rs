//! The `PresenceTracker`: sole owner of agent→room and room→occupants.

use std::collections::{BTreeSet, HashMap};

use rw_core::{AgentId, RoomId};
use tracing::{debug, trace};

use crate::{
    AgentPresenceState, ListenerId, PresenceError, PresenceEvent, PresenceEventKind,
    PresenceListener, PresenceResult,
};

#[cfg(feature = "fx-hash")]
type Map<K, V> = rustc_hash::FxHashMap<K, V>;
#[cfg(not(feature = "fx-hash"))]
type Map<K, V> = HashMap<K, V>;

/// Point-in-time view of one room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomOccupancy {
    pub room:     RoomId,
    /// Occupants in ascending id order.
    pub agents:   Vec<AgentId>,
    /// `0` = unlimited.
    pub capacity: u32,
    pub is_full:  bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PresenceStats {
    pub total_agents:  usize,
    pub moving_agents: usize,
    /// Rooms holding an occupant set.  A room's set is dropped when its
    /// last occupant leaves.
    pub total_rooms:   usize,
}

/// Authoritative presence map.
///
/// Every mutation goes through `register_agent`, `unregister_agent`, or the
/// `start_move` / `complete_move` / `cancel_move` transaction.  At any instant
/// an agent is in exactly one room's occupant set.  While the tracker is
/// stopped every operation fails with [`PresenceError::Stopped`].
pub struct PresenceTracker {
    running:       bool,
    states:        Map<AgentId, AgentPresenceState>,
    rooms:         Map<RoomId, BTreeSet<AgentId>>,
    /// Agents currently moving toward each room.
    inbound:       Map<RoomId, usize>,
    capacities:    Map<RoomId, u32>,
    listeners:     Vec<(ListenerId, Box<dyn PresenceListener>)>,
    next_listener: u32,
}

impl Default for PresenceTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PresenceTracker {
    /// A stopped, empty tracker.
    pub fn new() -> Self {
        Self {
            running:       false,
            states:        Map::default(),
            rooms:         Map::default(),
            inbound:       Map::default(),
            capacities:    Map::default(),
            listeners:     Vec::new(),
            next_listener: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stop accepting operations.  Tracked state is kept for a later restart.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    fn ensure_running(&self) -> PresenceResult<()> {
        if self.running { Ok(()) } else { Err(PresenceError::Stopped) }
    }

    // ── Listeners ─────────────────────────────────────────────────────────

    pub fn add_listener<L: PresenceListener + 'static>(&mut self, listener: L) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if `id` was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    fn emit(
        &mut self,
        kind:          PresenceEventKind,
        agent:         AgentId,
        room:          RoomId,
        previous_room: Option<RoomId>,
        now_ms:        u64,
    ) {
        let event = PresenceEvent { kind, agent, room, previous_room, timestamp_ms: now_ms };
        trace!(?event, "presence event");
        for (_, listener) in &mut self.listeners {
            listener.on_event(&event);
        }
    }

    // ── Registration ──────────────────────────────────────────────────────

    /// Place `agent` in `room`.
    ///
    /// Re-registering a tracked agent relocates it: any in-flight move is
    /// dropped and it leaves its previous room before entering the new one.
    pub fn register_agent(&mut self, agent: AgentId, room: RoomId, now_ms: u64) -> PresenceResult<()> {
        self.ensure_running()?;

        let previous = match self.states.get(&agent) {
            Some(state) if state.current_room == room && !state.is_moving => return Ok(()),
            Some(state) => Some((state.current_room, state.target_room)),
            None => None,
        };
        if let Some((old_room, target)) = previous {
            if let Some(target) = target {
                self.release_inbound(target);
            }
            self.remove_occupant(old_room, agent);
        }

        self.states.insert(agent, AgentPresenceState::stationary(agent, room, now_ms));
        self.rooms.entry(room).or_default().insert(agent);
        debug!(%agent, %room, "agent registered");

        let from = previous.map(|(old, _)| old);
        self.emit(PresenceEventKind::Entered, agent, room, from, now_ms);
        if let Some(old) = from.filter(|&old| old != room) {
            self.emit(PresenceEventKind::Left, agent, old, None, now_ms);
        }
        Ok(())
    }

    /// Forget `agent`.  A move in flight is reported `stopped` before the
    /// agent `left` its room.
    pub fn unregister_agent(&mut self, agent: AgentId, now_ms: u64) -> PresenceResult<()> {
        self.ensure_running()?;
        let state = self.states.remove(&agent).ok_or(PresenceError::UnknownAgent(agent))?;

        if let Some(target) = state.target_room {
            self.release_inbound(target);
            self.emit(PresenceEventKind::Stopped, agent, state.current_room, None, now_ms);
        }
        self.remove_occupant(state.current_room, agent);
        debug!(%agent, room = %state.current_room, "agent unregistered");
        self.emit(PresenceEventKind::Left, agent, state.current_room, None, now_ms);
        Ok(())
    }

    // ── Move transaction ──────────────────────────────────────────────────

    /// Begin moving `agent` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// `UnknownAgent`, `AlreadyMoving`, `WrongOrigin` if `from` is not the
    /// agent's room, or `RoomFull` if `to` has no free slot once inbound
    /// agents are counted.
    pub fn start_move(&mut self, agent: AgentId, from: RoomId, to: RoomId, now_ms: u64) -> PresenceResult<()> {
        self.ensure_running()?;
        let state = self.states.get(&agent).ok_or(PresenceError::UnknownAgent(agent))?;
        if state.is_moving {
            return Err(PresenceError::AlreadyMoving(agent));
        }
        if state.current_room != from {
            return Err(PresenceError::WrongOrigin { agent, claimed: from, actual: state.current_room });
        }
        if !self.has_free_slot(to) {
            return Err(PresenceError::RoomFull(to));
        }

        if let Some(state) = self.states.get_mut(&agent) {
            state.is_moving = true;
            state.move_start_ms = Some(now_ms);
            state.target_room = Some(to);
        }
        *self.inbound.entry(to).or_insert(0) += 1;
        self.emit(PresenceEventKind::Moving, agent, to, Some(from), now_ms);
        Ok(())
    }

    /// Finish `agent`'s in-flight move and return the room it now occupies.
    pub fn complete_move(&mut self, agent: AgentId, now_ms: u64) -> PresenceResult<RoomId> {
        self.ensure_running()?;
        let state = self.states.get_mut(&agent).ok_or(PresenceError::UnknownAgent(agent))?;
        let Some(to) = state.target_room.filter(|_| state.is_moving) else {
            return Err(PresenceError::NotMoving(agent));
        };
        let from = state.current_room;
        state.current_room = to;
        state.last_move_ms = now_ms;
        state.settle();

        self.release_inbound(to);
        self.remove_occupant(from, agent);
        self.rooms.entry(to).or_default().insert(agent);
        debug!(%agent, %from, %to, "move completed");

        self.emit(PresenceEventKind::Entered, agent, to, Some(from), now_ms);
        self.emit(PresenceEventKind::Left, agent, from, None, now_ms);
        Ok(to)
    }

    /// Abandon `agent`'s in-flight move.  Occupancy is unchanged.
    pub fn cancel_move(&mut self, agent: AgentId, now_ms: u64) -> PresenceResult<()> {
        self.ensure_running()?;
        let state = self.states.get_mut(&agent).ok_or(PresenceError::UnknownAgent(agent))?;
        let Some(target) = state.target_room.filter(|_| state.is_moving) else {
            return Err(PresenceError::NotMoving(agent));
        };
        let room = state.current_room;
        state.settle();

        self.release_inbound(target);
        self.emit(PresenceEventKind::Stopped, agent, room, None, now_ms);
        Ok(())
    }

    // ── Capacity ──────────────────────────────────────────────────────────

    /// `0` removes the limit.
    pub fn set_room_capacity(&mut self, room: RoomId, capacity: u32) {
        if capacity == 0 {
            self.capacities.remove(&room);
        } else {
            self.capacities.insert(room, capacity);
        }
    }

    pub fn room_capacity(&self, room: RoomId) -> u32 {
        self.capacities.get(&room).copied().unwrap_or(0)
    }

    /// Whether one more agent may head into `room`, counting agents already
    /// in transit toward it.
    pub fn has_free_slot(&self, room: RoomId) -> bool {
        match self.room_capacity(room) {
            0 => true,
            cap => {
                let inbound = self.inbound.get(&room).copied().unwrap_or(0);
                self.occupant_count(room) + inbound < cap as usize
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────────────────

    pub fn agent_room(&self, agent: AgentId) -> Option<RoomId> {
        self.states.get(&agent).map(|s| s.current_room)
    }

    pub fn state(&self, agent: AgentId) -> Option<&AgentPresenceState> {
        self.states.get(&agent)
    }

    pub fn is_tracked(&self, agent: AgentId) -> bool {
        self.states.contains_key(&agent)
    }

    pub fn is_moving(&self, agent: AgentId) -> bool {
        self.states.get(&agent).is_some_and(|s| s.is_moving)
    }

    pub fn occupant_count(&self, room: RoomId) -> usize {
        self.rooms.get(&room).map_or(0, BTreeSet::len)
    }

    /// Occupants of `room` in ascending id order.
    pub fn occupants(&self, room: RoomId) -> Vec<AgentId> {
        self.rooms.get(&room).map(|s| s.iter().copied().collect()).unwrap_or_default()
    }

    pub fn occupancy(&self, room: RoomId) -> RoomOccupancy {
        let agents = self.occupants(room);
        let capacity = self.room_capacity(room);
        let is_full = capacity > 0 && agents.len() >= capacity as usize;
        RoomOccupancy { room, agents, capacity, is_full }
    }

    /// Head-count per non-empty room.
    pub fn occupancy_counts(&self) -> HashMap<RoomId, usize> {
        self.rooms
            .iter()
            .filter(|(_, agents)| !agents.is_empty())
            .map(|(&room, agents)| (room, agents.len()))
            .collect()
    }

    /// Every room with a capacity limit.
    pub fn capacities(&self) -> HashMap<RoomId, u32> {
        self.capacities.iter().map(|(&r, &c)| (r, c)).collect()
    }

    pub fn stats(&self) -> PresenceStats {
        PresenceStats {
            total_agents:  self.states.len(),
            moving_agents: self.states.values().filter(|s| s.is_moving).count(),
            total_rooms:   self.rooms.len(),
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn remove_occupant(&mut self, room: RoomId, agent: AgentId) {
        if let Some(set) = self.rooms.get_mut(&room) {
            set.remove(&agent);
            if set.is_empty() {
                self.rooms.remove(&room);
            }
        }
    }

    fn release_inbound(&mut self, room: RoomId) {
        if let Some(n) = self.inbound.get_mut(&room) {
            *n = n.saturating_sub(1);
            if *n == 0 {
                self.inbound.remove(&room);
            }
        }
    }
}
