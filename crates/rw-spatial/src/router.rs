//! Routing trait and default breadth-first implementation.
//!
//! # Pluggability
//!
//! The performance layer calls routing via the [`Router`] trait, so hosts can
//! swap in weighted or scripted routers without touching the framework core.
//! Rooms are unweighted, so the default [`BfsRouter`] already returns a
//! shortest path by hop count.

use std::collections::VecDeque;

use rw_core::RoomId;

use crate::graph::RoomGraph;
use crate::{SpatialError, SpatialResult};

// ── RoomPath ──────────────────────────────────────────────────────────────────

/// The result of a routing query: every room visited, source and destination
/// included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomPath {
    pub rooms: Vec<RoomId>,
}

impl RoomPath {
    /// The first room to step into, or `None` for a trivial path.
    pub fn first_step(&self) -> Option<RoomId> {
        self.rooms.get(1).copied()
    }

    /// Number of moves needed to walk the path.
    pub fn hops(&self) -> usize {
        self.rooms.len().saturating_sub(1)
    }

    /// `true` if the source and destination are the same room.
    pub fn is_trivial(&self) -> bool {
        self.rooms.len() <= 1
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
pub trait Router: Send + Sync {
    /// Compute a path from `from` to `to`.
    ///
    /// `from == to` is an empty (trivial) path, not an error.
    fn route(&self, graph: &RoomGraph, from: RoomId, to: RoomId) -> SpatialResult<RoomPath>;
}

// ── BfsRouter ─────────────────────────────────────────────────────────────────

/// Breadth-first search over the directed adjacency lists.
///
/// Neighbors are expanded in registry order, so ties between equally short
/// paths always resolve the same way.
pub struct BfsRouter;

impl Router for BfsRouter {
    fn route(&self, graph: &RoomGraph, from: RoomId, to: RoomId) -> SpatialResult<RoomPath> {
        for room in [from, to] {
            if !graph.contains(room) {
                return Err(SpatialError::RoomNotFound(room));
            }
        }
        bfs_path(graph, from, to)
            .map(|rooms| RoomPath { rooms })
            .ok_or(SpatialError::NoRoute { from, to })
    }
}

/// Hop count of the shortest path, or `None` if `to` is unreachable.
pub fn bfs_hops(graph: &RoomGraph, from: RoomId, to: RoomId) -> Option<u32> {
    bfs_path(graph, from, to).map(|p| (p.len() - 1) as u32)
}

fn bfs_path(graph: &RoomGraph, from: RoomId, to: RoomId) -> Option<Vec<RoomId>> {
    if !graph.contains(from) || !graph.contains(to) {
        return None;
    }
    if from == to {
        return Some(vec![from]);
    }

    let n = graph.room_count();
    // prev[v] = room that first reached v; INVALID for unreached rooms.
    let mut prev = vec![RoomId::INVALID; n];
    let mut visited = vec![false; n];
    let mut queue = VecDeque::new();
    visited[from.index()] = true;
    queue.push_back(from);

    while let Some(room) = queue.pop_front() {
        for &next in graph.neighbors(room) {
            if visited[next.index()] {
                continue;
            }
            visited[next.index()] = true;
            prev[next.index()] = room;
            if next == to {
                return Some(reconstruct(&prev, from, to));
            }
            queue.push_back(next);
        }
    }
    None
}

fn reconstruct(prev: &[RoomId], from: RoomId, to: RoomId) -> Vec<RoomId> {
    let mut rooms = vec![to];
    let mut cur = to;
    while cur != from {
        cur = prev[cur.index()];
        rooms.push(cur);
    }
    rooms.reverse();
    rooms
}
