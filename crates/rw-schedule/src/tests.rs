//! Unit tests for rw-schedule.

use std::collections::BTreeMap;

use rw_core::{AgentId, RoomId};

use crate::{
    derive_jitter, ActivationGate, GamePhase, GateConfig, PauseScope, SchedulerConfig, TickScheduler,
    WakeQueue, WorldSnapshot,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn scheduler(max_jitter_ms: u64) -> TickScheduler {
    let mut s = TickScheduler::new(SchedulerConfig { base_tick_ms: 100, max_jitter_ms, seed: 42 }).unwrap();
    s.start();
    s
}

/// Handler that always succeeds and counts calls per `(tick_ms, agent)`.
fn counting(calls: &mut BTreeMap<(u64, AgentId), u32>) -> impl FnMut(AgentId, u64) -> Result<(), String> + '_ {
    move |agent: AgentId, now: u64| {
        *calls.entry((now, agent)).or_insert(0) += 1;
        Ok(())
    }
}

// ── WakeQueue ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod wake_queue {
    use super::*;

    #[test]
    fn drains_only_due_entries_in_order() {
        let mut q = WakeQueue::new();
        q.push(300, AgentId(3));
        q.push(100, AgentId(1));
        q.push(200, AgentId(2));
        assert_eq!(q.drain_due(200), vec![(100, AgentId(1)), (200, AgentId(2))]);
        assert_eq!(q.len(), 1);
        assert_eq!(q.next_due(), Some(300));
        assert!(q.drain_due(299).is_empty());
    }

    #[test]
    fn drain_at_max_time() {
        let mut q = WakeQueue::new();
        q.push(u64::MAX, AgentId(1));
        assert_eq!(q.drain_due(u64::MAX).len(), 1);
        assert!(q.is_empty());
    }
}

// ── Cadence ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod cadence {
    use super::*;

    #[test]
    fn at_most_one_attempt_per_agent_per_tick() {
        let mut s = scheduler(50);
        for a in 0..20 {
            s.register_agent(AgentId(a));
        }
        // A duplicate registration must not double-schedule.
        assert!(!s.register_agent(AgentId(0)));

        let mut calls = BTreeMap::new();
        {
            let mut h = counting(&mut calls);
            for _ in 0..50 {
                s.advance(&mut h);
            }
        }
        assert!(!calls.is_empty());
        assert!(calls.values().all(|&n| n == 1));
    }

    #[test]
    fn agents_move_every_interval() {
        let mut s = scheduler(0);
        s.register_agent(AgentId(1));
        let mut times = Vec::new();
        let mut h = |_: AgentId, now: u64| -> Result<(), String> {
            times.push(now);
            Ok(())
        };
        for _ in 0..5 {
            s.advance(&mut h);
        }
        assert_eq!(times, vec![100, 200, 300, 400, 500]);
    }

    #[test]
    fn failure_doubles_the_wait() {
        let mut s = scheduler(0);
        s.register_agent(AgentId(1));
        let mut times = Vec::new();
        let mut h = |_: AgentId, now: u64| -> Result<(), String> {
            times.push(now);
            Err("blocked".into())
        };
        for _ in 0..6 {
            s.advance(&mut h);
        }
        assert_eq!(times, vec![100, 300, 500]);
    }

    #[test]
    fn cadence_scale_stretches_interval() {
        let mut s = scheduler(0);
        s.set_cadence_scale(2.0);
        s.register_agent(AgentId(1));
        let mut times = Vec::new();
        let mut h = |_: AgentId, now: u64| -> Result<(), String> {
            times.push(now);
            Ok(())
        };
        for _ in 0..5 {
            s.advance(&mut h);
        }
        assert_eq!(times, vec![100, 300, 500]);
        s.set_cadence_scale(f64::NAN);
        assert_eq!(s.cadence_scale(), 1.0);
    }

    #[test]
    fn stopped_scheduler_does_nothing() {
        let mut s = TickScheduler::new(SchedulerConfig::default()).unwrap();
        s.register_agent(AgentId(1));
        let mut h = |_: AgentId, _: u64| -> Result<(), String> { panic!("must not be called") };
        let report = s.advance(&mut h);
        assert_eq!(report.attempted, 0);
        assert_eq!(s.stats().total_ticks, 0);
    }

    #[test]
    fn unregister_stops_attempts() {
        let mut s = scheduler(0);
        s.register_agent(AgentId(1));
        assert!(s.unregister_agent(AgentId(1)));
        assert!(!s.unregister_agent(AgentId(1)));
        let mut h = |_: AgentId, _: u64| -> Result<(), String> { panic!("must not be called") };
        s.advance(&mut h);
    }

    #[test]
    fn report_counts() {
        let mut s = scheduler(0);
        s.register_agent(AgentId(1));
        s.register_agent(AgentId(2));
        let mut h = |a: AgentId, _: u64| -> Result<(), String> {
            if a == AgentId(1) { Ok(()) } else { Err("no".into()) }
        };
        let r = s.advance(&mut h);
        assert_eq!((r.attempted, r.succeeded, r.failed), (2, 1, 1));
        assert_eq!(r.now_ms, 100);
        assert_eq!(r.tick.0, 1);
    }

    #[test]
    fn zero_base_tick_rejected() {
        let cfg = SchedulerConfig { base_tick_ms: 0, ..SchedulerConfig::default() };
        assert!(TickScheduler::new(cfg).is_err());
    }
}

// ── Jitter ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod jitter {
    use super::*;

    #[test]
    fn same_seed_same_jitter() {
        let mut a = scheduler(1_000);
        let mut b = scheduler(1_000);
        for id in 0..32 {
            a.register_agent(AgentId(id));
        }
        for id in (0..32).rev() {
            b.register_agent(AgentId(id));
        }
        for id in 0..32 {
            assert_eq!(a.jitter_of(AgentId(id)), b.jitter_of(AgentId(id)));
        }
    }

    #[test]
    fn jitter_is_bounded_and_varied() {
        let values: Vec<u64> = (0..64).map(|i| derive_jitter(7, AgentId(i), 500)).collect();
        assert!(values.iter().all(|&j| j <= 500));
        assert!(values.iter().any(|&j| j != values[0]));
        assert_eq!(derive_jitter(7, AgentId(1), 0), 0);
    }
}

// ── Pause scopes ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod pausing {
    use super::*;

    #[test]
    fn overlapping_scopes_compose() {
        let mut s = scheduler(0);
        let a = AgentId(1);
        s.register_agent(a);
        let global = PauseScope::global("cutscene");
        let local = PauseScope::agents([a], "dialogue");

        s.pause(global.clone());
        s.pause(local.clone());
        s.resume(&global);
        assert!(s.is_agent_paused(a));
        s.pause(global.clone());
        s.resume(&local);
        assert!(s.is_agent_paused(a));
        s.resume(&global);
        assert!(!s.is_agent_paused(a));
    }

    #[test]
    fn resume_unknown_scope_is_noop() {
        let mut s = scheduler(0);
        assert!(!s.resume(&PauseScope::global("never")));
    }

    #[test]
    fn paused_agents_are_skipped() {
        let mut s = scheduler(0);
        s.register_agent(AgentId(1));
        s.register_agent(AgentId(2));
        s.pause(PauseScope::agents([AgentId(2)], "talking"));
        let mut moved = Vec::new();
        let mut h = |a: AgentId, _: u64| -> Result<(), String> {
            moved.push(a);
            Ok(())
        };
        let r = s.advance(&mut h);
        assert_eq!(r.skipped_paused, 1);
        assert_eq!(moved, vec![AgentId(1)]);
        assert_eq!(s.stats().paused_agents, 1);
        assert_eq!(s.agent_state(AgentId(2)).unwrap().pause_reason.as_deref(), Some("talking"));
    }

    #[test]
    fn agents_registered_under_global_pause_start_paused() {
        let mut s = scheduler(0);
        s.pause(PauseScope::global("loading"));
        s.register_agent(AgentId(9));
        assert!(s.agent_state(AgentId(9)).unwrap().is_paused);
        assert!(s.is_globally_paused());
    }
}

// ── ActivationGate ────────────────────────────────────────────────────────────

#[cfg(test)]
mod gate {
    use super::*;

    fn exploring() -> WorldSnapshot {
        WorldSnapshot { phase: GamePhase::Exploration, ..WorldSnapshot::default() }
    }

    #[test]
    fn debounced_pause_and_resume() {
        let mut s = scheduler(0);
        s.register_agent(AgentId(1));
        let mut g = ActivationGate::new(GateConfig { debounce_ms: 100, ..GateConfig::default() });

        g.update(WorldSnapshot { in_cutscene: true, ..exploring() }, 0);
        assert_eq!(g.poll(50, &mut s), None);
        assert!(g.is_active());
        assert_eq!(g.poll(100, &mut s), Some(false));
        assert!(s.is_agent_paused(AgentId(1)));
        assert_eq!(g.reason(), "Cutscene in progress");

        g.update(exploring(), 200);
        assert_eq!(g.poll(300, &mut s), Some(true));
        assert!(!s.is_agent_paused(AgentId(1)));
        assert_eq!(g.reason(), "Movement active");
    }

    #[test]
    fn rapid_updates_coalesce() {
        let mut s = scheduler(0);
        let mut g = ActivationGate::new(GateConfig { debounce_ms: 100, ..GateConfig::default() });
        g.update(WorldSnapshot { overlay_active: true, ..exploring() }, 0);
        g.update(exploring(), 60);
        // The debounce restarted at 60 and the final state is active again.
        assert_eq!(g.poll(100, &mut s), None);
        assert!(g.has_pending());
        assert_eq!(g.poll(160, &mut s), None);
        assert!(g.is_active());
        assert!(!s.is_globally_paused());
    }

    #[test]
    fn unchanged_snapshot_is_ignored() {
        let mut g = ActivationGate::new(GateConfig::default());
        g.update(WorldSnapshot::default(), 0);
        assert!(!g.has_pending());
    }

    #[test]
    fn evaluation_rules() {
        let cfg = GateConfig { disabled_rooms: vec![RoomId(4)], ..GateConfig::default() };
        assert!(cfg.evaluate(&exploring()).is_ok());
        assert!(cfg.evaluate(&WorldSnapshot { phase: GamePhase::Combat, ..exploring() }).is_err());
        assert!(cfg.evaluate(&WorldSnapshot { reduced_motion: true, ..exploring() }).is_err());
        assert!(cfg.evaluate(&WorldSnapshot { current_room: Some(RoomId(4)), ..exploring() }).is_err());
        assert!(cfg.evaluate(&WorldSnapshot { current_room: Some(RoomId(5)), ..exploring() }).is_ok());

        let mut frozen = exploring();
        frozen.flags.movement_frozen = true;
        assert!(cfg.evaluate(&frozen).is_err());
        let mut locked = exploring();
        locked.flags.story_lockdown = true;
        assert!(cfg.evaluate(&locked).is_err());

        let lax = GateConfig { respect_reduced_motion: false, ..GateConfig::default() };
        assert!(lax.evaluate(&WorldSnapshot { reduced_motion: true, ..exploring() }).is_ok());
    }

    #[test]
    fn gate_scope_does_not_lift_other_pauses() {
        let mut s = scheduler(0);
        s.register_agent(AgentId(1));
        s.pause(PauseScope::global("operator"));
        let mut g = ActivationGate::new(GateConfig::default());
        g.update(WorldSnapshot { takeover_active: true, ..exploring() }, 0);
        g.flush(&mut s);
        g.update(exploring(), 10);
        g.flush(&mut s);
        assert!(s.is_agent_paused(AgentId(1)));
    }
}
