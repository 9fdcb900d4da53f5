//! The `TickScheduler`.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use rw_core::{AgentId, AgentRng, SimClock, Tick};
use tracing::{debug, trace};

use crate::{AgentWanderState, PauseScope, ScheduleError, ScheduleResult, WakeQueue};

/// RNG stream reserved for jitter draws, separate from policy decisions.
const JITTER_STREAM: u64 = 0x6a17;

/// Bounds for [`TickScheduler::set_cadence_scale`].
const MIN_CADENCE_SCALE: f64 = 0.1;
const MAX_CADENCE_SCALE: f64 = 100.0;

// ── MoveHandler ───────────────────────────────────────────────────────────────

/// What the scheduler calls for each due agent.
///
/// The scheduler is borrowed separately from the handler, so a handler can
/// own everything else in the simulation.
pub trait MoveHandler {
    type Error: fmt::Display;

    fn attempt_move(&mut self, agent: AgentId, now_ms: u64) -> Result<(), Self::Error>;
}

impl<F, E> MoveHandler for F
where
    F: FnMut(AgentId, u64) -> Result<(), E>,
    E: fmt::Display,
{
    type Error = E;

    fn attempt_move(&mut self, agent: AgentId, now_ms: u64) -> Result<(), E> {
        self(agent, now_ms)
    }
}

// ── Config / reports ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SchedulerConfig {
    /// Fixed tick period and base wait between moves, in simulated ms.
    pub base_tick_ms:  u64,
    /// Per-agent jitter is drawn from `0..=max_jitter_ms`.
    pub max_jitter_ms: u64,
    pub seed:          u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { base_tick_ms: 1_000, max_jitter_ms: 500, seed: 0x5eed }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick:           Tick,
    pub now_ms:         u64,
    pub attempted:      usize,
    pub succeeded:      usize,
    pub failed:         usize,
    pub skipped_paused: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    pub is_running:        bool,
    pub total_ticks:       u64,
    pub registered_agents: usize,
    pub paused_agents:     usize,
}

/// Jitter for `agent` under `seed`, in `0..=max_jitter_ms`.
pub fn derive_jitter(seed: u64, agent: AgentId, max_jitter_ms: u64) -> u64 {
    if max_jitter_ms == 0 {
        return 0;
    }
    AgentRng::with_stream(seed, agent, JITTER_STREAM).gen_range(0..=max_jitter_ms)
}

// ── TickScheduler ─────────────────────────────────────────────────────────────

pub struct TickScheduler {
    config:        SchedulerConfig,
    clock:         SimClock,
    running:       bool,
    cadence_scale: f64,
    agents:        BTreeMap<AgentId, AgentWanderState>,
    queue:         WakeQueue,
    scopes:        BTreeSet<PauseScope>,
}

impl TickScheduler {
    /// # Errors
    ///
    /// `Config` if `base_tick_ms` is zero.
    pub fn new(config: SchedulerConfig) -> ScheduleResult<Self> {
        if config.base_tick_ms == 0 {
            return Err(ScheduleError::Config("base_tick_ms must be positive".into()));
        }
        Ok(Self {
            clock:         SimClock::new(config.base_tick_ms),
            running:       false,
            cadence_scale: 1.0,
            agents:        BTreeMap::new(),
            queue:         WakeQueue::new(),
            scopes:        BTreeSet::new(),
            config,
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    pub fn start(&mut self) {
        if !self.running {
            debug!(agents = self.agents.len(), "scheduler started");
            self.running = true;
        }
    }

    /// Stop ticking.  Registrations and scopes are kept.
    pub fn stop(&mut self) {
        if self.running {
            debug!(ticks = self.clock.current_tick.0, "scheduler stopped");
            self.running = false;
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick
    }

    // ── Agents ────────────────────────────────────────────────────────────

    /// Start scheduling `agent`.  Returns `false` if already registered.
    pub fn register_agent(&mut self, agent: AgentId) -> bool {
        if self.agents.contains_key(&agent) {
            return false;
        }
        let jitter = derive_jitter(self.config.seed, agent, self.config.max_jitter_ms);
        let next = self.now_ms() + jitter;
        let mut state = AgentWanderState::new(agent, next, jitter);
        self.apply_pause(&mut state);
        self.agents.insert(agent, state);
        self.queue.push(next, agent);
        trace!(%agent, jitter, next, "agent scheduled");
        true
    }

    /// Stop scheduling `agent`.  Unknown agents are a no-op returning `false`.
    pub fn unregister_agent(&mut self, agent: AgentId) -> bool {
        self.agents.remove(&agent).is_some()
    }

    pub fn is_registered(&self, agent: AgentId) -> bool {
        self.agents.contains_key(&agent)
    }

    pub fn agent_state(&self, agent: AgentId) -> Option<&AgentWanderState> {
        self.agents.get(&agent)
    }

    pub fn jitter_of(&self, agent: AgentId) -> Option<u64> {
        self.agents.get(&agent).map(|s| s.jitter_ms)
    }

    // ── Pausing ───────────────────────────────────────────────────────────

    /// Activate `scope`.  Returns `false` if the identical scope is already
    /// active.
    pub fn pause(&mut self, scope: PauseScope) -> bool {
        debug!(reason = %scope.reason, global = scope.is_global(), "pause scope added");
        let added = self.scopes.insert(scope);
        self.refresh_pauses();
        added
    }

    /// Lift `scope`.  Resuming a scope that was never paused is a no-op
    /// returning `false`.
    pub fn resume(&mut self, scope: &PauseScope) -> bool {
        let removed = self.scopes.remove(scope);
        if removed {
            debug!(reason = %scope.reason, "pause scope removed");
            self.refresh_pauses();
        }
        removed
    }

    /// Lift every scope.
    pub fn resume_all(&mut self) {
        self.scopes.clear();
        self.refresh_pauses();
    }

    pub fn is_agent_paused(&self, agent: AgentId) -> bool {
        self.scopes.iter().any(|s| s.covers(agent))
    }

    pub fn is_globally_paused(&self) -> bool {
        self.scopes.iter().any(PauseScope::is_global)
    }

    pub fn active_scopes(&self) -> impl Iterator<Item = &PauseScope> {
        self.scopes.iter()
    }

    fn apply_pause(&self, state: &mut AgentWanderState) {
        let covering = self.scopes.iter().find(|s| s.covers(state.agent));
        state.is_paused = covering.is_some();
        state.pause_reason = covering.map(|s| s.reason.clone());
    }

    fn refresh_pauses(&mut self) {
        let mut agents = std::mem::take(&mut self.agents);
        for state in agents.values_mut() {
            self.apply_pause(state);
        }
        self.agents = agents;
    }

    // ── Cadence ───────────────────────────────────────────────────────────

    /// Stretch (> 1) or shrink (< 1) the wait between moves.  Takes effect
    /// from each agent's next reschedule.  Non-finite values reset to 1.
    pub fn set_cadence_scale(&mut self, scale: f64) {
        self.cadence_scale = if scale.is_finite() {
            scale.clamp(MIN_CADENCE_SCALE, MAX_CADENCE_SCALE)
        } else {
            1.0
        };
    }

    pub fn cadence_scale(&self) -> f64 {
        self.cadence_scale
    }

    fn wait_ms(&self, jitter_ms: u64) -> u64 {
        (self.config.base_tick_ms as f64 * self.cadence_scale).round() as u64 + jitter_ms
    }

    // ── Ticking ───────────────────────────────────────────────────────────

    /// Advance one base tick and give every due, unpaused agent one move
    /// attempt through `handler`.
    ///
    /// A stopped scheduler does nothing and returns an empty report.
    pub fn advance<H: MoveHandler>(&mut self, handler: &mut H) -> TickReport {
        if !self.running {
            return TickReport { tick: self.clock.current_tick, now_ms: self.now_ms(), ..TickReport::default() };
        }
        self.clock.advance();
        let now = self.now_ms();
        let mut report = TickReport { tick: self.clock.current_tick, now_ms: now, ..TickReport::default() };

        let mut seen = HashSet::new();
        for (due, agent) in self.queue.drain_due(now) {
            let Some(state) = self.agents.get(&agent) else { continue };
            if state.next_move_ms != due || !seen.insert(agent) {
                continue;
            }
            let jitter = state.jitter_ms;
            let wait = self.wait_ms(jitter);

            if state.is_paused {
                report.skipped_paused += 1;
                self.reschedule(agent, now + wait, None);
                continue;
            }

            report.attempted += 1;
            match handler.attempt_move(agent, now) {
                Ok(()) => {
                    report.succeeded += 1;
                    self.reschedule(agent, now + wait, Some(now));
                }
                Err(e) => {
                    report.failed += 1;
                    debug!(%agent, error = %e, "move attempt failed; backing off");
                    self.reschedule(agent, now + wait * 2, Some(now));
                }
            }
        }

        trace!(
            tick = %report.tick,
            attempted = report.attempted,
            failed = report.failed,
            paused = report.skipped_paused,
            "tick"
        );
        report
    }

    fn reschedule(&mut self, agent: AgentId, next: u64, attempted_at: Option<u64>) {
        if let Some(state) = self.agents.get_mut(&agent) {
            state.next_move_ms = next;
            if attempted_at.is_some() {
                state.last_move_ms = attempted_at;
            }
            self.queue.push(next, agent);
        }
    }

    pub fn stats(&self) -> SchedulerStats {
        SchedulerStats {
            is_running:        self.running,
            total_ticks:       self.clock.current_tick.0,
            registered_agents: self.agents.len(),
            paused_agents:     self.agents.values().filter(|s| s.is_paused).count(),
        }
    }
}
