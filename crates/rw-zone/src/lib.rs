//! `rw-zone`: zone-level movement legality.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                         |
//! |--------------|------------------------------------------------------------------|
//! | [`model`]    | `ZoneInfo`, `RoomZoneMapping`, `ZoneTransitionRule`, `AgentZonePreference`, `ZoneSetup` |
//! | [`provider`] | `ZoneConstraintProvider`, `ZoneVerdict`                          |
//! | [`error`]    | `ZoneError`, `ZoneResult<T>`                                     |
//!
//! # Rules
//!
//! A room maps to at most one zone; unmapped rooms are unconstrained.
//! Entering a zone requires that the agent's type is not restricted there,
//! is on the zone's allow-list when that list is non-empty, and that the
//! agent's own preference record does not forbid the zone.  Crossing from
//! zone A to zone B additionally needs a matching transition rule whenever
//! any rule leaves A.

pub mod error;
pub mod model;
pub mod provider;

#[cfg(test)]
mod tests;

pub use error::{ZoneError, ZoneResult};
pub use model::{AgentZonePreference, RoomZoneMapping, ZoneInfo, ZoneSetup, ZoneTransitionRule};
pub use provider::{ZoneConstraintProvider, ZoneVerdict};
