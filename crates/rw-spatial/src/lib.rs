//! `rw-spatial`: room registry, adjacency, distance, and routing.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`graph`]    | `RoomGraph`: interned room names + adjacency arena        |
//! | [`router`]   | `Router` trait, `RoomPath`, `BfsRouter`                    |
//! | [`distance`] | `RoomDistance` trait, heuristic and exact metrics          |
//! | [`loader`]   | `load_adjacency_csv`, `load_adjacency_reader`              |
//! | [`error`]    | `SpatialError`, `SpatialResult<T>`                         |
//!
//! Rooms are discrete nodes; there are no coordinates.  All mutation of the
//! adjacency relation bumps [`RoomGraph::generation`] so caches built on top
//! of the graph can tell when they are stale.

pub mod distance;
pub mod error;
pub mod graph;
pub mod loader;
pub mod router;


pub use distance::{Distance, DistanceMode, GraphDistance, HeuristicDistance, RoomDistance, UNREACHABLE};
pub use error::{SpatialError, SpatialResult};
pub use graph::RoomGraph;
pub use loader::{load_adjacency_csv, load_adjacency_reader};
pub use router::{BfsRouter, RoomPath, Router};
