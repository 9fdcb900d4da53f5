//! Room-to-room distance metrics used by movement policies.
//!
//! Two metrics are available:
//!
//! | Metric                | Values                                         |
//! |-----------------------|------------------------------------------------|
//! | [`HeuristicDistance`] | 0 same room, 1 adjacent, 2 same zone prefix, 4 otherwise |
//! | [`GraphDistance`]     | exact BFS hop count, [`UNREACHABLE`] if none   |
//!
//! The heuristic is cheap and needs no traversal but disagrees with the true
//! graph distance for rooms more than one hop apart.  [`DistanceMode`] selects
//! which one the orchestrator binds into each move context.

use rw_core::RoomId;

use crate::graph::RoomGraph;
use crate::router::bfs_hops;

/// Distance reported for rooms with no connecting path.
pub const UNREACHABLE: u32 = u32::MAX;

/// A symmetric-enough notion of "how far apart are two rooms".
pub trait RoomDistance {
    fn distance(&self, a: RoomId, b: RoomId) -> u32;
}

// ── Heuristic ─────────────────────────────────────────────────────────────────

/// Approximate distance: adjacency and shared name prefix only.
pub struct HeuristicDistance<'a> {
    graph: &'a RoomGraph,
}

impl<'a> HeuristicDistance<'a> {
    pub fn new(graph: &'a RoomGraph) -> Self {
        Self { graph }
    }
}

impl RoomDistance for HeuristicDistance<'_> {
    fn distance(&self, a: RoomId, b: RoomId) -> u32 {
        if a == b {
            return 0;
        }
        if self.graph.are_adjacent(a, b) {
            return 1;
        }
        match (self.graph.zone_prefix(a), self.graph.zone_prefix(b)) {
            (Some(pa), Some(pb)) if pa == pb => 2,
            _ => 4,
        }
    }
}

// ── Exact ─────────────────────────────────────────────────────────────────────

/// Exact shortest-path hop count.
pub struct GraphDistance<'a> {
    graph: &'a RoomGraph,
}

impl<'a> GraphDistance<'a> {
    pub fn new(graph: &'a RoomGraph) -> Self {
        Self { graph }
    }
}

impl RoomDistance for GraphDistance<'_> {
    fn distance(&self, a: RoomId, b: RoomId) -> u32 {
        bfs_hops(self.graph, a, b).unwrap_or(UNREACHABLE)
    }
}

// ── Mode selection ────────────────────────────────────────────────────────────

/// Which metric policies should see.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum DistanceMode {
    #[default]
    Heuristic,
    ShortestPath,
}

impl DistanceMode {
    /// Bind this mode to a graph.
    pub fn bind(self, graph: &RoomGraph) -> Distance<'_> {
        match self {
            DistanceMode::Heuristic    => Distance::Heuristic(HeuristicDistance::new(graph)),
            DistanceMode::ShortestPath => Distance::Exact(GraphDistance::new(graph)),
        }
    }
}

/// A metric bound to a graph, chosen at runtime without boxing.
pub enum Distance<'a> {
    Heuristic(HeuristicDistance<'a>),
    Exact(GraphDistance<'a>),
}

impl RoomDistance for Distance<'_> {
    #[inline]
    fn distance(&self, a: RoomId, b: RoomId) -> u32 {
        match self {
            Distance::Heuristic(d) => d.distance(a, b),
            Distance::Exact(d)     => d.distance(a, b),
        }
    }
}
