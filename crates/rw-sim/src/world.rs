//! Everything a move attempt touches, owned apart from the scheduler.
//!
//! The orchestrator keeps the [`TickScheduler`][rw_schedule::TickScheduler]
//! and this world in separate fields so the scheduler can hand `&mut world`
//! to itself as the [`MoveHandler`] without aliasing.

use std::collections::BTreeMap;
use std::time::Instant;

use rw_core::{AgentId, AgentRng, RoomId};
use rw_perf::{MovementRecord, PerformanceOptimizer};
use rw_policy::{MoveContext, MoveDecision, MovePolicy, MovePolicyConfig, RoomLoad};
use rw_presence::{PresenceError, PresenceTracker};
use rw_resilience::{
    ErrorContext, ErrorType, MovementFeature, ResilienceController, ResilienceError, Severity,
};
use rw_schedule::{MoveHandler, WakeQueue};
use rw_spatial::{DistanceMode, RoomDistance, RoomGraph};
use rw_zone::ZoneConstraintProvider;
use tracing::{debug, warn};

use crate::{AgentConfig, OrchestratorConfig, SimError, SimResult, WorldHost};

/// Counters over every move attempt since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovementStatistics {
    /// Handler calls for registered agents.
    pub attempts:           u64,
    pub moves_started:      u64,
    pub moves_completed:    u64,
    /// Moves currently between `start_move` and `complete_move`.
    pub in_transit:         usize,
    pub teleports:          u64,
    /// Non-adjacent targets replaced by the first step of a cached path.
    pub path_substitutions: u64,
    /// Zone vetoes resolved by moving to an adjacent alternative instead.
    pub zone_redirects:     u64,
    /// Decisions to stay where the agent is.
    pub stays:              u64,
    pub failures:           u64,
    /// Attempts skipped because movement is shed.
    pub skipped_degraded:   u64,
}

// ── Per-agent slot ────────────────────────────────────────────────────────────

pub(crate) struct AgentSlot {
    pub(crate) config:    AgentConfig,
    rng:                  AgentRng,
    consecutive_failures: u32,
    escalated:            bool,
}

impl AgentSlot {
    pub(crate) fn new(config: AgentConfig, seed: u64) -> Self {
        Self {
            rng:                  AgentRng::new(seed, config.agent),
            consecutive_failures: 0,
            escalated:            false,
            config,
        }
    }

    pub(crate) fn clear_failures(&mut self) {
        self.consecutive_failures = 0;
        self.escalated = false;
    }
}

/// A destination chosen for this tick, possibly rewritten by path
/// substitution or a zone redirect before it is executed.
struct PlannedMove {
    from:     RoomId,
    to:       RoomId,
    reason:   String,
    teleport: bool,
}

// ── MovementWorld ─────────────────────────────────────────────────────────────

pub(crate) struct MovementWorld<H: WorldHost> {
    pub(crate) graph:              RoomGraph,
    pub(crate) presence:           PresenceTracker,
    pub(crate) zones:              ZoneConstraintProvider,
    pub(crate) optimizer:          PerformanceOptimizer,
    pub(crate) resilience:         ResilienceController,
    pub(crate) host:               H,
    pub(crate) agents:             BTreeMap<AgentId, AgentSlot>,
    pub(crate) default_policy:     Box<dyn MovePolicy>,
    pub(crate) distance:           DistanceMode,
    pub(crate) transit_ms:         u64,
    pub(crate) failure_escalation: u32,
    /// In-flight moves keyed by arrival time.  Entries left by unregistered
    /// agents stay behind and are skipped against `arrival_due`.
    arrivals:                      WakeQueue,
    arrival_due:                   BTreeMap<AgentId, u64>,
    /// Moves started since the last observer flush.
    pub(crate) journal:            Vec<MovementRecord>,
    stats:                         MovementStatistics,
}

impl<H: WorldHost> MovementWorld<H> {
    pub(crate) fn new(config: &OrchestratorConfig, host: H, default_policy: Box<dyn MovePolicy>) -> Self {
        Self {
            graph:              RoomGraph::new(),
            presence:           PresenceTracker::new(),
            zones:              ZoneConstraintProvider::new(),
            optimizer:          PerformanceOptimizer::new(config.optimizer.clone()),
            resilience:         ResilienceController::new(config.resilience.clone()),
            host,
            agents:             BTreeMap::new(),
            default_policy,
            distance:           config.distance,
            transit_ms:         config.transit_ms,
            failure_escalation: config.failure_escalation,
            arrivals:           WakeQueue::new(),
            arrival_due:        BTreeMap::new(),
            journal:            Vec::new(),
            stats:              MovementStatistics::default(),
        }
    }

    pub(crate) fn stats(&self) -> MovementStatistics {
        MovementStatistics { in_transit: self.presence.stats().moving_agents, ..self.stats }
    }

    // ── Arrivals ──────────────────────────────────────────────────────────

    /// Complete every move whose transit has elapsed by `now_ms`.
    pub(crate) fn process_arrivals(&mut self, now_ms: u64) -> usize {
        let mut arrived = 0;
        for (due_ms, agent) in self.arrivals.drain_due(now_ms) {
            if self.arrival_due.get(&agent) != Some(&due_ms) {
                continue;
            }
            self.arrival_due.remove(&agent);
            match self.presence.complete_move(agent, now_ms) {
                Ok(room) => {
                    arrived += 1;
                    self.stats.moves_completed += 1;
                    debug!(%agent, room = %self.graph.label(room), "agent arrived");
                }
                // Unregistered or relocated while in transit.
                Err(e) => debug!(%agent, error = %e, "arrival dropped"),
            }
        }
        arrived
    }

    /// Drop the pending arrival of an agent leaving the simulation.
    pub(crate) fn forget_arrival(&mut self, agent: AgentId) {
        self.arrival_due.remove(&agent);
    }

    // ── One attempt ───────────────────────────────────────────────────────

    /// Decide, validate, and start one move for `agent`.
    ///
    /// `Ok` covers every outcome that is not a failure, including staying
    /// put and being skipped because movement is shed or slowed to zero.
    pub(crate) fn execute(&mut self, agent: AgentId, now_ms: u64) -> SimResult<()> {
        let started = Instant::now();
        let slot = self.agents.get(&agent).ok_or(SimError::UnknownAgent(agent))?;
        if !slot.config.is_active {
            return Ok(());
        }
        self.stats.attempts += 1;

        if !self.resilience.get_feature_enabled(MovementFeature::RandomMovement) {
            self.stats.skipped_degraded += 1;
            return Ok(());
        }
        let speed = self.host.movement_speed_multiplier();
        if speed.is_nan() || speed <= 0.0 {
            return Ok(());
        }
        if self.presence.is_moving(agent) {
            return Ok(());
        }
        let from = self
            .presence
            .agent_room(agent)
            .ok_or(SimError::Presence(PresenceError::UnknownAgent(agent)))?;

        let decision = self.decide(agent, from)?;
        let Some(target) = decision.target else {
            if decision.is_legal {
                self.stats.stays += 1;
                return Ok(());
            }
            return Err(SimError::NoLegalMove { agent, reason: decision.reason });
        };
        let mut planned = PlannedMove {
            from,
            to:       target,
            reason:   decision.reason,
            teleport: decision.requires_teleport,
        };

        if self.resilience.get_feature_enabled(MovementFeature::ComplexPathfinding) {
            self.substitute_path_step(agent, &mut planned, now_ms);
        }
        if self.resilience.get_feature_enabled(MovementFeature::ZoneAwareness) {
            self.enforce_zones(agent, &mut planned, now_ms)?;
        }

        self.presence.start_move(agent, from, planned.to, now_ms)?;
        self.stats.moves_started += 1;
        if planned.teleport {
            self.stats.teleports += 1;
        }

        let transit = (self.transit_ms as f64 / speed).round() as u64;
        if transit == 0 {
            self.presence.complete_move(agent, now_ms)?;
            self.stats.moves_completed += 1;
        } else {
            let due_ms = now_ms.saturating_add(transit);
            self.arrivals.push(due_ms, agent);
            self.arrival_due.insert(agent, due_ms);
        }

        let latency_ms = started.elapsed().as_secs_f64() * 1_000.0;
        self.optimizer.record_move_latency(latency_ms);
        debug!(
            %agent,
            from = %self.graph.label(from),
            to = %self.graph.label(planned.to),
            reason = %planned.reason,
            teleport = planned.teleport,
            transit_ms = transit,
            "move started"
        );

        let mut record = self.optimizer.acquire_record();
        record.agent = agent;
        record.from = from;
        record.to = Some(planned.to);
        record.at_ms = now_ms;
        record.reason = planned.reason;
        record.teleport = planned.teleport;
        record.succeeded = true;
        record.latency_ms = latency_ms;
        self.journal.push(record);
        Ok(())
    }

    fn decide(&mut self, agent: AgentId, from: RoomId) -> SimResult<MoveDecision> {
        let zone_aware = self.resilience.get_feature_enabled(MovementFeature::ZoneAwareness);
        let pathfinding = self.resilience.get_feature_enabled(MovementFeature::Pathfinding);

        let Self { graph, presence, zones, host, agents, default_policy, distance, .. } = self;
        let slot = agents.get_mut(&agent).ok_or(SimError::UnknownAgent(agent))?;

        let neighbors = graph.neighbors(from);
        let adjacent = if zone_aware {
            zones.get_preferred_rooms(agent, neighbors)
        } else {
            neighbors.to_vec()
        };
        let load = RoomLoad::new(presence.capacities(), presence.occupancy_counts());
        let metric = distance.bind(graph);
        let config = &slot.config;
        let ctx = MoveContext::new(agent, from, &adjacent, &load, host.room_access(), &metric)
            .with_home(config.home_room, config.roam_radius)
            .with_room_lists(&config.avoided_rooms, &config.preferred_rooms)
            .with_player(host.player_room());

        // Goal-directed modes need routing; without it everyone wanders.
        let fallback;
        let policy: &dyn MovePolicy = if !pathfinding {
            fallback = MovePolicyConfig::random_adjacent();
            &fallback
        } else if let Some(custom) = &config.policy {
            custom
        } else {
            &**default_policy
        };

        let decision = policy.decide(&ctx, &mut slot.rng)?;
        debug!(
            %agent,
            policy = policy.name(),
            target = ?decision.target,
            confidence = decision.confidence,
            reason = %decision.reason,
            "decision"
        );
        Ok(decision)
    }

    /// Replace the target with the first step of the cached shortest path,
    /// so a non-adjacent choice is walked instead of jumped.
    fn substitute_path_step(&mut self, agent: AgentId, planned: &mut PlannedMove, now_ms: u64) {
        let (from, to) = (planned.from, planned.to);
        let Self { graph, optimizer, resilience, .. } = self;
        let lookup = resilience.execute_with_protection(now_ms, || optimizer.first_step(graph, from, to));

        match lookup {
            Ok(Some(step)) if step == to => planned.teleport = false,
            Ok(Some(step)) => {
                if !self.step_is_enterable(agent, from, step) {
                    debug!(%agent, step = %self.graph.label(step), "path step not enterable; keeping target");
                    return;
                }
                self.stats.path_substitutions += 1;
                planned.to = step;
                planned.teleport = false;
            }
            Ok(None) => {}
            Err(ResilienceError::CircuitOpen { retry_after_ms }) => {
                debug!(%agent, retry_after_ms, "path lookup skipped; circuit open");
            }
            Err(e) => {
                let context = ErrorContext::agent(agent).in_room(from).during("path-step");
                self.resilience.report_error(ErrorType::PathfindingError, e.to_string(), context, Severity::Medium, now_ms);
            }
        }
    }

    /// Whether `agent` may walk into `step`: the room checks the policy
    /// applies to its own choices, plus a free slot.  Zone rules are checked
    /// afterwards on whatever target survives.
    fn step_is_enterable(&self, agent: AgentId, from: RoomId, step: RoomId) -> bool {
        let Some(slot) = self.agents.get(&agent) else {
            return false;
        };
        let config = &slot.config;
        let within_roam = config
            .roam_radius
            .is_none_or(|radius| self.distance.bind(&self.graph).distance(config.home_room, step) <= radius);

        step != from
            && !config.avoided_rooms.contains(&step)
            && self.host.room_access().is_passable(step)
            && within_roam
            && self.presence.has_free_slot(step)
    }

    /// Veto or redirect `planned` under zone rules.  A veto is reported even
    /// when an adjacent alternative rescues the move.
    fn enforce_zones(&mut self, agent: AgentId, planned: &mut PlannedMove, now_ms: u64) -> SimResult<()> {
        let slot = self.agents.get(&agent).ok_or(SimError::UnknownAgent(agent))?;
        let agent_type = &slot.config.agent_type;
        let from = planned.from;

        let verdict = self.zones.can_move(agent, agent_type, from, planned.to);
        if verdict.allowed {
            return Ok(());
        }
        let reason = verdict.reason.unwrap_or_else(|| "zone rules".to_owned());
        let context = ErrorContext::agent(agent).in_room(from).during("zone-check");
        self.resilience.report_error(
            ErrorType::MovementFailed,
            format!("zone veto: {reason}"),
            context,
            Severity::Low,
            now_ms,
        );

        let avoided = &slot.config.avoided_rooms;
        let alternative = verdict.alternatives.iter().copied().find(|&alt| {
            self.graph.are_adjacent(from, alt)
                && !avoided.contains(&alt)
                && self.host.room_access().is_passable(alt)
                && self.zones.can_move(agent, agent_type, from, alt).allowed
        });
        match alternative {
            Some(alt) => {
                debug!(%agent, blocked = %planned.to, instead = %alt, "zone redirect");
                self.stats.zone_redirects += 1;
                planned.to = alt;
                planned.teleport = false;
                planned.reason = format!("{} (redirected by zone rules)", planned.reason);
                Ok(())
            }
            None => Err(SimError::ZoneBlocked { agent, to: planned.to, reason }),
        }
    }

    /// Bookkeeping after an attempt: failure counting, error reports, and
    /// one-shot escalation of an agent that keeps failing.
    fn settle_attempt(&mut self, agent: AgentId, result: &SimResult<()>, now_ms: u64) {
        let Some(slot) = self.agents.get_mut(&agent) else {
            return;
        };
        let Err(e) = result else {
            slot.clear_failures();
            return;
        };

        self.stats.failures += 1;
        slot.consecutive_failures += 1;
        let mut context = ErrorContext::agent(agent).during("execute-movement");
        if let Some(room) = self.presence.agent_room(agent) {
            context = context.in_room(room);
        }
        if let Some((error_type, severity)) = e.classify() {
            self.resilience.report_error(error_type, e.to_string(), context.clone(), severity, now_ms);
        }

        let threshold = self.failure_escalation;
        if threshold > 0 && slot.consecutive_failures >= threshold && !slot.escalated {
            slot.escalated = true;
            warn!(%agent, failures = slot.consecutive_failures, "agent keeps failing to move");
            self.resilience.report_error(
                ErrorType::MovementFailed,
                format!("{agent} failed {} consecutive moves", slot.consecutive_failures),
                context,
                Severity::High,
                now_ms,
            );
        }
    }
}

impl<H: WorldHost> MoveHandler for MovementWorld<H> {
    type Error = SimError;

    fn attempt_move(&mut self, agent: AgentId, now_ms: u64) -> SimResult<()> {
        let result = self.execute(agent, now_ms);
        self.settle_attempt(agent, &result, now_ms);
        result
    }
}
