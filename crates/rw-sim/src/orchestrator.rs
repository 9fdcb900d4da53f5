//! The `MovementOrchestrator` façade and its tick loop.

use rw_core::{AgentId, RoomId, Tick};
use rw_perf::PerformanceMetrics;
use rw_policy::{MovePolicy, MovePolicyConfig};
use rw_presence::{ListenerId, PresenceListener, PresenceStats, PresenceTracker};
use rw_resilience::{ErrorContext, ErrorStatistics, ErrorType, ResilienceController, Severity};
use rw_schedule::{
    ActivationGate, MoveHandler, PauseScope, SchedulerStats, TickReport, TickScheduler, WorldSnapshot,
};
use rw_spatial::RoomGraph;
use rw_zone::{ZoneConstraintProvider, ZoneSetup, ZoneVerdict};
use tracing::{debug, info};

use crate::world::{AgentSlot, MovementWorld};
use crate::{
    AgentConfig, AgentPatch, MovementStatistics, NoopObserver, OrchestratorConfig, SimError,
    SimObserver, SimResult, StaticHost, WorldHost,
};

/// Registers agents, owns the room registry, and drives every component
/// from one cooperative tick loop.
///
/// Create with [`MovementOrchestrator::new`] or
/// [`OrchestratorBuilder`][crate::OrchestratorBuilder]; then [`start`][Self::start]
/// and call [`tick`][Self::tick] once per base tick.
pub struct MovementOrchestrator<H: WorldHost = StaticHost> {
    config:           OrchestratorConfig,
    scheduler:        TickScheduler,
    gate:             ActivationGate,
    pub(crate) world: MovementWorld<H>,
    running:          bool,
    /// Agents unregistered while stopped; dropped from presence on start.
    pending_removals: Vec<AgentId>,
}

impl<H: WorldHost> MovementOrchestrator<H> {
    /// A stopped orchestrator with an empty registry and the
    /// random-adjacent default policy.
    pub fn new(config: OrchestratorConfig, host: H) -> SimResult<Self> {
        config.validate()?;
        let scheduler = TickScheduler::new(config.scheduler.clone())?;
        let gate = ActivationGate::new(config.gate.clone());
        let world = MovementWorld::new(&config, host, Box::new(MovePolicyConfig::random_adjacent()));
        Ok(Self {
            config,
            scheduler,
            gate,
            world,
            running: false,
            pending_removals: Vec::new(),
        })
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Bring up presence, place agents that are not yet tracked in their
    /// home rooms, then start the scheduler.  No-op while running.
    pub fn start(&mut self) -> SimResult<()> {
        if self.running {
            return Ok(());
        }
        let now = self.scheduler.now_ms();
        self.world.presence.start();
        if let Err(e) = self.sync_presence(now) {
            let context = ErrorContext::default().during("start");
            self.world.resilience.report_error(ErrorType::ConfigurationError, e.to_string(), context, Severity::High, now);
            self.world.presence.stop();
            return Err(e);
        }
        self.scheduler.start();
        self.running = true;
        info!(
            agents = self.world.agents.len(),
            rooms = self.world.graph.room_count(),
            "movement orchestrator started"
        );
        Ok(())
    }

    fn sync_presence(&mut self, now_ms: u64) -> SimResult<()> {
        for agent in self.pending_removals.drain(..) {
            if let Err(e) = self.world.presence.unregister_agent(agent, now_ms) {
                debug!(%agent, error = %e, "deferred presence removal skipped");
            }
        }
        for slot in self.world.agents.values() {
            let agent = slot.config.agent;
            if !self.world.presence.is_tracked(agent) {
                self.world.presence.register_agent(agent, slot.config.home_room, now_ms)?;
            }
        }
        Ok(())
    }

    /// Stop the scheduler, then presence.  Tracked positions and in-flight
    /// moves are kept for a later `start`.  No-op while stopped.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.scheduler.stop();
        self.world.presence.stop();
        self.running = false;
        info!(ticks = self.scheduler.current_tick().0, "movement orchestrator stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn current_tick(&self) -> Tick {
        self.scheduler.current_tick()
    }

    // ── Agents ────────────────────────────────────────────────────────────

    /// Register a new agent.
    ///
    /// While running the agent is placed at once; otherwise on `start`.  An
    /// agent unregistered while stopped and registered again keeps its
    /// tracked room instead of returning home.
    ///
    /// # Errors
    ///
    /// `DuplicateAgent`, `UnknownRoom` for a home outside the registry, or
    /// `Policy` for an invalid custom policy.
    pub fn register_agent(&mut self, config: AgentConfig) -> SimResult<()> {
        let agent = config.agent;
        if !agent.is_valid() {
            return Err(SimError::Config("agent id is the INVALID sentinel".into()));
        }
        if self.world.agents.contains_key(&agent) {
            return Err(SimError::DuplicateAgent(agent));
        }
        if !self.world.graph.contains(config.home_room) {
            return Err(SimError::UnknownRoom(config.home_room));
        }
        config.validate()?;

        self.pending_removals.retain(|&a| a != agent);
        if self.running && !self.world.presence.is_tracked(agent) {
            self.world.presence.register_agent(agent, config.home_room, self.scheduler.now_ms())?;
        }
        self.world.zones.set_agent_type(agent, config.agent_type.clone());
        self.scheduler.register_agent(agent);
        debug!(
            %agent,
            agent_type = %config.agent_type,
            home = %self.world.graph.label(config.home_room),
            "agent registered"
        );
        self.world.agents.insert(agent, AgentSlot::new(config, self.config.scheduler.seed));
        Ok(())
    }

    /// Forget `agent`.  Returns `false` if it was not registered.
    pub fn unregister_agent(&mut self, agent: AgentId) -> bool {
        if self.world.agents.remove(&agent).is_none() {
            return false;
        }
        self.scheduler.unregister_agent(agent);
        self.world.zones.remove_agent(agent);
        self.world.forget_arrival(agent);
        if self.running {
            if let Err(e) = self.world.presence.unregister_agent(agent, self.scheduler.now_ms()) {
                debug!(%agent, error = %e, "presence removal skipped");
            }
        } else {
            self.pending_removals.push(agent);
        }
        debug!(%agent, "agent unregistered");
        true
    }

    /// Apply a partial update.  The agent's position is not touched; a new
    /// home only matters for future decisions.
    pub fn update_agent(&mut self, agent: AgentId, patch: AgentPatch) -> SimResult<()> {
        let slot = self.world.agents.get_mut(&agent).ok_or(SimError::UnknownAgent(agent))?;
        let updated = patch.applied_to(&slot.config);
        if !self.world.graph.contains(updated.home_room) {
            return Err(SimError::UnknownRoom(updated.home_room));
        }
        updated.validate()?;
        if updated.agent_type != slot.config.agent_type {
            self.world.zones.set_agent_type(agent, updated.agent_type.clone());
        }
        slot.config = updated;
        Ok(())
    }

    pub fn agent_config(&self, agent: AgentId) -> Option<&AgentConfig> {
        self.world.agents.get(&agent).map(|slot| &slot.config)
    }

    /// Registered agents in ascending id order.
    pub fn agents(&self) -> impl Iterator<Item = &AgentConfig> {
        self.world.agents.values().map(|slot| &slot.config)
    }

    /// The agent's tracked room.
    pub fn agent_room(&self, agent: AgentId) -> Option<RoomId> {
        self.world.presence.agent_room(agent)
    }

    // ── Rooms and zones ───────────────────────────────────────────────────

    /// Replace the whole adjacency relation.  Cached paths are invalidated.
    pub fn set_room_registry<I, S, A>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (S, A)>,
        S: AsRef<str>,
        A: IntoIterator,
        A::Item: AsRef<str>,
    {
        self.world.graph.set_registry(entries);
        info!(rooms = self.world.graph.room_count(), "room registry replaced");
    }

    /// Replace one room's neighbor list, interning any new names.
    pub fn set_room_adjacency<S: AsRef<str>>(&mut self, room: &str, adjacent: &[S]) -> RoomId {
        self.world.graph.set_adjacency(room, adjacent)
    }

    pub fn room_id(&self, name: &str) -> Option<RoomId> {
        self.world.graph.room_id(name)
    }

    /// `0` removes the limit.
    pub fn set_room_capacity(&mut self, room: RoomId, capacity: u32) -> SimResult<()> {
        if !self.world.graph.contains(room) {
            return Err(SimError::UnknownRoom(room));
        }
        self.world.presence.set_room_capacity(room, capacity);
        Ok(())
    }

    /// Load zone definitions, mappings, rules, and preferences.  On error
    /// the previous zone configuration stays in force.
    pub fn configure_zones(&mut self, setup: ZoneSetup) -> SimResult<()> {
        self.world.zones.configure(setup)?;
        Ok(())
    }

    /// Policy for agents without a custom one.
    pub fn set_default_policy<P: MovePolicy + 'static>(&mut self, policy: P) {
        debug!(policy = policy.name(), "default policy set");
        self.world.default_policy = Box::new(policy);
    }

    // ── Pausing and world state ───────────────────────────────────────────

    pub fn pause(&mut self, scope: PauseScope) -> bool {
        self.scheduler.pause(scope)
    }

    pub fn resume(&mut self, scope: &PauseScope) -> bool {
        self.scheduler.resume(scope)
    }

    /// Hand a world-state snapshot to the activation gate.  The verdict is
    /// applied on the first tick after the debounce.
    pub fn update_world_state(&mut self, snapshot: WorldSnapshot) {
        self.gate.update(snapshot, self.scheduler.now_ms());
    }

    // ── Ticking ───────────────────────────────────────────────────────────

    /// Run one base tick with no observer.
    pub fn tick(&mut self) -> TickReport {
        self.step(&mut NoopObserver)
    }

    /// Run `n` ticks, reporting to `observer`.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) {
        for _ in 0..n {
            self.step(observer);
        }
    }

    fn step<O: SimObserver>(&mut self, observer: &mut O) -> TickReport {
        if !self.running {
            return self.scheduler.advance(&mut self.world);
        }
        let now = self.scheduler.now_ms() + self.config.scheduler.base_tick_ms;
        observer.on_tick_start(self.scheduler.current_tick() + 1);

        // ① Arrivals  ② Gate  ③ Cadence  ④ Attempts
        self.world.process_arrivals(now);
        self.gate.poll(now, &mut self.scheduler);
        let scale = self.cadence_scale();
        self.scheduler.set_cadence_scale(scale);
        let report = self.scheduler.advance(&mut self.world);

        for record in self.world.journal.drain(..) {
            observer.on_move(&record);
            self.world.optimizer.release_record(record);
        }
        observer.on_tick_end(&report);
        report
    }

    /// Slower accessibility speed and higher degradation both stretch the
    /// wait between moves.
    fn cadence_scale(&self) -> f64 {
        let speed = self.world.host.movement_speed_multiplier();
        let effective = speed * self.world.resilience.performance_multiplier();
        if effective > 0.0 { 1.0 / effective } else { f64::MAX }
    }

    /// Make one move attempt for `agent` now, outside its schedule.
    ///
    /// # Errors
    ///
    /// `NotRunning`, `UnknownAgent`, or whatever stopped the move.  Failures
    /// are reported to the resilience controller as during a tick.
    pub fn execute_movement(&mut self, agent: AgentId) -> SimResult<()> {
        if !self.running {
            return Err(SimError::NotRunning);
        }
        self.world.attempt_move(agent, self.scheduler.now_ms())
    }

    // ── Zone queries ──────────────────────────────────────────────────────

    /// Would zone rules let `agent` step from where it is into `to`?
    pub fn can_agent_move_to_room(&self, agent: AgentId, to: RoomId) -> SimResult<ZoneVerdict> {
        let slot = self.world.agents.get(&agent).ok_or(SimError::UnknownAgent(agent))?;
        let from = self.world.presence.agent_room(agent).unwrap_or(slot.config.home_room);
        Ok(self.world.zones.can_move(agent, &slot.config.agent_type, from, to))
    }

    /// `candidates` reordered by the agent's zone preferences, with rooms it
    /// may not enter dropped.
    pub fn get_preferred_rooms_for_agent(&self, agent: AgentId, candidates: &[RoomId]) -> Vec<RoomId> {
        self.world.zones.get_preferred_rooms(agent, candidates)
    }

    // ── Presence output ───────────────────────────────────────────────────

    pub fn add_presence_listener<L: PresenceListener + 'static>(&mut self, listener: L) -> ListenerId {
        self.world.presence.add_listener(listener)
    }

    pub fn remove_presence_listener(&mut self, id: ListenerId) -> bool {
        self.world.presence.remove_listener(id)
    }

    // ── Resilience ────────────────────────────────────────────────────────

    /// Operator reset: clear error state, return to degradation level 0, and
    /// forget every agent's failure streak.
    pub fn reset_degradation(&mut self) {
        self.world.resilience.reset();
        for slot in self.world.agents.values_mut() {
            slot.clear_failures();
        }
        info!("degradation reset");
    }

    pub fn degradation_level(&self) -> u8 {
        self.world.resilience.degradation_level()
    }

    // ── Statistics ────────────────────────────────────────────────────────

    pub fn scheduler_stats(&self) -> SchedulerStats {
        self.scheduler.stats()
    }

    pub fn presence_stats(&self) -> PresenceStats {
        self.world.presence.stats()
    }

    pub fn performance_metrics(&self) -> PerformanceMetrics {
        self.world.optimizer.metrics()
    }

    pub fn optimization_suggestions(&self) -> Vec<String> {
        self.world.optimizer.suggestions()
    }

    pub fn error_statistics(&self) -> ErrorStatistics {
        self.world.resilience.statistics()
    }

    pub fn movement_stats(&self) -> MovementStatistics {
        self.world.stats()
    }

    // ── Component access ──────────────────────────────────────────────────

    pub fn graph(&self) -> &RoomGraph {
        &self.world.graph
    }

    pub fn presence(&self) -> &PresenceTracker {
        &self.world.presence
    }

    pub fn zones(&self) -> &ZoneConstraintProvider {
        &self.world.zones
    }

    pub fn resilience(&self) -> &ResilienceController {
        &self.world.resilience
    }

    /// Direct access for host-level error reports (startup, content loading).
    pub fn resilience_mut(&mut self) -> &mut ResilienceController {
        &mut self.world.resilience
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }

    pub fn gate(&self) -> &ActivationGate {
        &self.gate
    }

    pub fn host(&self) -> &H {
        &self.world.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.world.host
    }
}
