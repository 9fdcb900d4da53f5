//! `rw-sim`: the movement orchestrator for the `room_wander` simulation.
//!
//! # Crate layout
//!
//! | Module           | Contents                                                  |
//! |------------------|-----------------------------------------------------------|
//! | [`orchestrator`] | `MovementOrchestrator` (façade + tick loop)               |
//! | [`builder`]      | `OrchestratorBuilder`                                     |
//! | [`agent`]        | `AgentConfig`, `AgentPatch`                               |
//! | [`host`]         | `WorldHost` trait, `StaticHost`                           |
//! | [`config`]       | `OrchestratorConfig`                                      |
//! | [`observer`]     | `SimObserver`, `NoopObserver`                             |
//! | [`world`]        | `MovementStatistics` and the per-attempt pipeline         |
//! | [`error`]        | `SimError`, `SimResult<T>`                                |
//!
//! # One tick
//!
//! ```text
//! tick():
//!   ① Arrivals:  in-flight moves whose transit has elapsed complete in
//!                PresenceTracker (entered, then left).
//!   ② Gate:      a debounced world-state verdict pauses or resumes the
//!                scheduler's gate scope.
//!   ③ Cadence:   wait scale = 1 / (speed multiplier × performance multiplier).
//!   ④ Attempts:  TickScheduler calls execute_movement once per due agent:
//!
//!        build MoveContext ─► MovePolicy::decide
//!          ─► first step of cached shortest path   (complex-pathfinding)
//!          ─► ZoneConstraintProvider::can_move      (zone-awareness)
//!          ─► PresenceTracker::start_move [─► complete_move]
//!          ─► statistics, MovementRecord ─► SimObserver::on_move
//!
//!      Failures are filed with the ResilienceController and the scheduler
//!      doubles that agent's wait.
//! ```
//!
//! As the degradation level rises, features shed in order: complex
//! pathfinding, zone awareness, pathfinding (everyone wanders randomly),
//! random movement (nobody moves), all.  The scheduler keeps ticking at
//! every level.
//!
//! # Cargo features
//!
//! | Feature   | Effect                                                    |
//! |-----------|-----------------------------------------------------------|
//! | `serde`   | `Serialize`/`Deserialize` on configs and agent records.   |
//! | `fx-hash` | FxHash for the presence maps.                             |

pub mod agent;
pub mod builder;
pub mod config;
pub mod error;
pub mod host;
pub mod observer;
pub mod orchestrator;
pub mod world;


pub use agent::{AgentConfig, AgentPatch};
pub use builder::OrchestratorBuilder;
pub use config::OrchestratorConfig;
pub use error::{SimError, SimResult};
pub use host::{StaticHost, WorldHost};
pub use observer::{NoopObserver, SimObserver};
pub use orchestrator::MovementOrchestrator;
pub use world::MovementStatistics;
