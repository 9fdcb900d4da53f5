//! `rw-presence`: who is in which room.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`state`]   | `AgentPresenceState`: one agent's room and in-flight move     |
//! | [`event`]   | `PresenceEvent`, `PresenceEventKind`, `PresenceListener`      |
//! | [`tracker`] | `PresenceTracker`: the agent→room and room→occupants maps     |
//! | [`error`]   | `PresenceError`, `PresenceResult<T>`                          |
//!
//! # Move transaction
//!
//! ```text
//! start_move(a, from, to)   moving:  a still counted in `from`
//!         │
//!         ├── complete_move(a)  entered(to), then left(from)
//!         └── cancel_move(a)    stopped; occupancy untouched
//! ```
//!
//! A room's capacity is checked at `start_move` against its occupants plus
//! agents already inbound, so two concurrent moves can never overfill it.

pub mod error;
pub mod event;
pub mod state;
pub mod tracker;


pub use error::{PresenceError, PresenceResult};
pub use event::{ListenerId, PresenceEvent, PresenceEventKind, PresenceListener};
pub use state::AgentPresenceState;
pub use tracker::{PresenceStats, PresenceTracker, RoomOccupancy};
