//! `rw-resilience`: failures degrade movement, they never crash it.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                      |
//! |----------------|---------------------------------------------------------------|
//! | [`kind`]       | `ErrorType`, `Severity`, `ErrorContext`, `ErrorRecord`        |
//! | [`feature`]    | `MovementFeature` and the shedding order                      |
//! | [`breaker`]    | `CircuitBreaker`, `CircuitState`                              |
//! | [`controller`] | `ResilienceController`, `ResilienceConfig`, `ErrorStatistics` |
//! | [`error`]      | `ResilienceError<E>`, `ParseFeatureError`                     |
//!
//! # Degradation ladder
//!
//! | Level | Newly disabled          |
//! |-------|-------------------------|
//! | 1     | `complex-pathfinding`   |
//! | 2     | `zone-awareness`        |
//! | 3     | `pathfinding`           |
//! | 4     | `random-movement`       |
//! | 5     | `all`                   |
//!
//! The level only rises while errors arrive; [`ResilienceController::reset`]
//! is the only way down.

pub mod breaker;
pub mod controller;
pub mod error;
pub mod feature;
pub mod kind;

#[cfg(test)]
mod tests;

pub use breaker::{CircuitBreaker, CircuitState};
pub use controller::{ErrorStatistics, ResilienceConfig, ResilienceController, MAX_DEGRADATION};
pub use error::{ParseFeatureError, ResilienceError};
pub use feature::MovementFeature;
pub use kind::{ErrorContext, ErrorRecord, ErrorType, Severity};
