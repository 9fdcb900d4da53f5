//! Orchestrator configuration.

use rw_perf::OptimizerConfig;
use rw_resilience::ResilienceConfig;
use rw_schedule::{GateConfig, SchedulerConfig};
use rw_spatial::DistanceMode;

use crate::{SimError, SimResult};

/// Configuration for every component the orchestrator owns.
///
/// With the `serde` feature this is the shape of the demo's JSON config;
/// missing sections take their defaults.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OrchestratorConfig {
    pub scheduler:          SchedulerConfig,
    pub gate:               GateConfig,
    pub optimizer:          OptimizerConfig,
    pub resilience:         ResilienceConfig,
    /// Metric handed to policies.  Default: the coarse heuristic.
    pub distance:           DistanceMode,
    /// Simulated time between `start_move` and `complete_move` at normal
    /// speed.  `0` completes moves instantly.
    pub transit_ms:         u64,
    /// Consecutive failed attempts after which an agent's trouble is
    /// escalated as a `HIGH` movement failure.  `0` disables escalation.
    pub failure_escalation: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            scheduler:          SchedulerConfig::default(),
            gate:               GateConfig::default(),
            optimizer:          OptimizerConfig::default(),
            resilience:         ResilienceConfig::default(),
            distance:           DistanceMode::Heuristic,
            transit_ms:         0,
            failure_escalation: 3,
        }
    }
}

impl OrchestratorConfig {
    pub(crate) fn validate(&self) -> SimResult<()> {
        if self.scheduler.base_tick_ms == 0 {
            return Err(SimError::Config("scheduler.base_tick_ms must be positive".into()));
        }
        if self.resilience.weight_per_level == 0 {
            return Err(SimError::Config("resilience.weight_per_level must be positive".into()));
        }
        Ok(())
    }
}
