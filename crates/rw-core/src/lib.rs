//! `rw-core`: foundational types for the `room_wander` simulation.
//!
//! This crate is a dependency of every other `rw-*` crate.  It has no `rw-*`
//! dependencies and minimal external ones (only `rand`, plus optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                          |
//! |-----------|---------------------------------------------------|
//! | [`ids`]   | `AgentId`, `RoomId`, `ZoneId`, `AgentType`        |
//! | [`time`]  | `Tick`, `SimClock`                                |
//! | [`rng`]   | `AgentRng` (per-agent, seeded)                    |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use ids::{AgentId, AgentType, RoomId, ZoneId};
pub use rng::AgentRng;
pub use time::{SimClock, Tick};
