//! `rw-schedule`: when each agent gets to move.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                    |
//! |----------------|-------------------------------------------------------------|
//! | [`wake_queue`] | `WakeQueue` (`BTreeMap<due_ms, Vec<AgentId>>`)              |
//! | [`scope`]      | `PauseScope`, `PauseTarget`                                 |
//! | [`state`]      | `AgentWanderState`                                          |
//! | [`scheduler`]  | `TickScheduler`, `MoveHandler`, `SchedulerConfig`, `TickReport` |
//! | [`gate`]       | `ActivationGate`, `WorldSnapshot`, `GamePhase`, `GateConfig` |
//! | [`error`]      | `ScheduleError`, `ScheduleResult<T>`                        |
//!
//! # Cadence model
//!
//! ```text
//! register:        next_move = now + jitter
//! after attempt:   next_move = now + wait
//!                  wait      = base_tick × cadence_scale + jitter   (×2 on failure)
//! ```
//!
//! `jitter` is drawn once per agent from `(seed, agent)`, so two schedulers
//! with the same seed give every agent the same jitter.  Each tick drains
//! only the agents whose `next_move` has passed, and calls the handler at
//! most once per agent.

pub mod error;
pub mod gate;
pub mod scheduler;
pub mod scope;
pub mod state;
pub mod wake_queue;

#[cfg(test)]
mod tests;

pub use error::{ScheduleError, ScheduleResult};
pub use gate::{ActivationGate, GamePhase, GateConfig, WorldFlags, WorldSnapshot};
pub use scheduler::{derive_jitter, MoveHandler, SchedulerConfig, SchedulerStats, TickReport, TickScheduler};
pub use scope::{PauseScope, PauseTarget};
pub use state::AgentWanderState;
pub use wake_queue::WakeQueue;
