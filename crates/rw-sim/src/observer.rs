//! Tick observer for progress reporting and data collection.

use rw_core::Tick;
use rw_perf::MovementRecord;
use rw_schedule::TickReport;

/// Callbacks invoked by [`MovementOrchestrator::run_ticks`][crate::MovementOrchestrator::run_ticks]
/// around every tick.
///
/// All methods default to no-ops so implementors only override what they
/// care about.
///
/// # Example: move logger
///
/// ```rust,ignore
/// struct MoveLog(Vec<(AgentId, RoomId)>);
///
/// impl SimObserver for MoveLog {
///     fn on_move(&mut self, record: &MovementRecord) {
///         if let Some(to) = record.to {
///             self.0.push((record.agent, to));
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called before arrivals and move attempts for `tick`.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once per move started during the tick, in attempt order.
    /// The record goes back to the pool right after the call.
    fn on_move(&mut self, _record: &MovementRecord) {}

    /// Called after every due agent has had its attempt.
    fn on_tick_end(&mut self, _report: &TickReport) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
