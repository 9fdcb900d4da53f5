//! `rw-perf`: keeping the tick loop cheap.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                         |
//! |---------------|------------------------------------------------------------------|
//! | [`cache`]     | `PathCache`: bounded `(from, to) → path` cache with negatives    |
//! | [`pool`]      | `ObjectPool<T>`, `Poolable`, `MovementRecord`                    |
//! | [`optimizer`] | `PerformanceOptimizer<R>`, `OptimizerConfig`, `PerformanceMetrics` |
//! | [`error`]     | `PerfError`, `PerfResult<T>`                                     |
//!
//! The cache is tied to a graph generation: any adjacency change bumps
//! [`RoomGraph::generation`][rw_spatial::RoomGraph::generation] and the next
//! query starts from an empty cache.

pub mod cache;
pub mod error;
pub mod optimizer;
pub mod pool;


pub use cache::PathCache;
pub use error::{PerfError, PerfResult};
pub use optimizer::{OptimizerConfig, PerformanceMetrics, PerformanceOptimizer};
pub use pool::{MovementRecord, ObjectPool, Poolable};
