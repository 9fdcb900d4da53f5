//! The room registry and adjacency arena.
//!
//! # Data layout
//!
//! Room names are interned once and never removed, so a `RoomId` stays valid
//! for the lifetime of the graph even when the adjacency relation is replaced
//! wholesale.  Adjacency is stored as one `Vec<RoomId>` per room, indexed by
//! `RoomId`:
//!
//! ```text
//! adjacency[room.index()] = rooms reachable from `room` in one step
//! ```
//!
//! Adjacency is **directed** exactly as supplied by the content loader; use
//! [`RoomGraph::connect`] for the common two-way doorway.

use std::collections::HashMap;

use rw_core::RoomId;

use crate::{SpatialError, SpatialResult};

/// Interned room registry plus directed adjacency lists.
#[derive(Debug, Default, Clone)]
pub struct RoomGraph {
    names:      Vec<String>,
    index:      HashMap<String, RoomId>,
    adjacency:  Vec<Vec<RoomId>>,
    generation: u64,
}

impl RoomGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Interning ─────────────────────────────────────────────────────────

    /// Return the id for `name`, registering the room if it is new.
    pub fn intern(&mut self, name: &str) -> RoomId {
        if let Some(&id) = self.index.get(name) {
            return id;
        }
        let id = RoomId(self.names.len() as u32);
        self.names.push(name.to_owned());
        self.index.insert(name.to_owned(), id);
        self.adjacency.push(Vec::new());
        id
    }

    /// Look up an already-registered room by name.
    pub fn room_id(&self, name: &str) -> Option<RoomId> {
        self.index.get(name).copied()
    }

    /// The registered name of `room`, if it exists.
    pub fn name(&self, room: RoomId) -> Option<&str> {
        self.names.get(room.index()).map(String::as_str)
    }

    /// Display label used in log lines and decision reasons.
    pub fn label(&self, room: RoomId) -> String {
        self.name(room).map_or_else(|| room.to_string(), str::to_owned)
    }

    /// The zone prefix of a room name: everything before the first `_` or
    /// `-`, or the whole name when neither is present.
    pub fn zone_prefix(&self, room: RoomId) -> Option<&str> {
        self.name(room)
            .map(|n| n.split(['_', '-']).next().unwrap_or(n))
    }

    pub fn contains(&self, room: RoomId) -> bool {
        room.index() < self.names.len()
    }

    pub fn room_count(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All registered room ids in ascending order.
    pub fn rooms(&self) -> impl Iterator<Item = RoomId> + '_ {
        (0..self.names.len() as u32).map(RoomId)
    }

    // ── Adjacency ─────────────────────────────────────────────────────────

    /// Rooms reachable from `room` in one step.  Empty for unknown rooms.
    #[inline]
    pub fn neighbors(&self, room: RoomId) -> &[RoomId] {
        self.adjacency
            .get(room.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `true` if either room lists the other as a neighbor.
    pub fn are_adjacent(&self, a: RoomId, b: RoomId) -> bool {
        self.neighbors(a).contains(&b) || self.neighbors(b).contains(&a)
    }

    /// Bumped on every adjacency mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the whole adjacency relation (bulk registry input).
    ///
    /// Room names are kept, so previously issued `RoomId`s remain valid; rooms
    /// absent from `entries` simply end up with no neighbors.
    pub fn set_registry<I, S, A>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (S, A)>,
        S: AsRef<str>,
        A: IntoIterator,
        A::Item: AsRef<str>,
    {
        for list in &mut self.adjacency {
            list.clear();
        }
        for (room, adjacent) in entries {
            let adjacent: Vec<String> = adjacent
                .into_iter()
                .map(|a| a.as_ref().to_owned())
                .collect();
            self.set_adjacency(room.as_ref(), &adjacent);
        }
        self.generation += 1;
    }

    /// Replace the neighbor list of a single room (incremental input).
    pub fn set_adjacency<S: AsRef<str>>(&mut self, room: &str, adjacent: &[S]) -> RoomId {
        let id = self.intern(room);
        let ids: Vec<RoomId> = adjacent.iter().map(|a| self.intern(a.as_ref())).collect();
        self.store_neighbors(id, ids);
        id
    }

    /// Id-based variant of [`set_adjacency`][Self::set_adjacency].
    pub fn set_adjacency_ids(&mut self, room: RoomId, adjacent: Vec<RoomId>) -> SpatialResult<()> {
        if !self.contains(room) {
            return Err(SpatialError::RoomNotFound(room));
        }
        if let Some(&bad) = adjacent.iter().find(|r| !self.contains(**r)) {
            return Err(SpatialError::RoomNotFound(bad));
        }
        self.store_neighbors(room, adjacent);
        Ok(())
    }

    /// Add a two-way doorway between `a` and `b`.
    pub fn connect(&mut self, a: &str, b: &str) -> (RoomId, RoomId) {
        let a = self.intern(a);
        let b = self.intern(b);
        if a != b {
            if !self.adjacency[a.index()].contains(&b) {
                self.adjacency[a.index()].push(b);
            }
            if !self.adjacency[b.index()].contains(&a) {
                self.adjacency[b.index()].push(a);
            }
            self.generation += 1;
        }
        (a, b)
    }

    /// Dedupe, drop self-loops, and store.
    fn store_neighbors(&mut self, room: RoomId, mut adjacent: Vec<RoomId>) {
        let mut seen = Vec::with_capacity(adjacent.len());
        adjacent.retain(|&r| {
            if r == room || seen.contains(&r) {
                false
            } else {
                seen.push(r);
                true
            }
        });
        self.adjacency[room.index()] = adjacent;
        self.generation += 1;
    }
}
