//! `rw-policy`: movement-policy decisions.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`context`]  | `MoveContext<'a>`, `RoomLoad`, `RoomAccess`                  |
//! | [`config`]   | `MovePolicyConfig`, `PolicyMode`                             |
//! | [`decision`] | `MoveDecision`                                               |
//! | [`policy`]   | `MovePolicy` trait, `StayPut`                                |
//! | [`modes`]    | the per-mode decision functions                              |
//! | [`error`]    | `PolicyError`, `PolicyResult<T>`                             |
//!
//! # Design notes
//!
//! A decision is a pure function of a read-only [`MoveContext`], a
//! [`MovePolicyConfig`], and the agent's own [`AgentRng`][rw_core::AgentRng].
//! Nothing here holds state between calls or touches occupancy; the caller
//! executes (or discards) the returned [`MoveDecision`].
//!
//! Distances come from whatever [`RoomDistance`][rw_spatial::RoomDistance]
//! the caller binds into the context, so the same policy runs against the
//! approximate heuristic or exact graph distance.

pub mod config;
pub mod context;
pub mod decision;
pub mod error;
pub mod modes;
pub mod policy;

#[cfg(test)]
mod tests;

pub use config::{MovePolicyConfig, PolicyMode};
pub use context::{MoveContext, RoomAccess, RoomLoad};
pub use decision::MoveDecision;
pub use error::{PolicyError, PolicyResult};
pub use policy::{MovePolicy, StayPut};
