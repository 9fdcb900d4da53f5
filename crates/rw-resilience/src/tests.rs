//! Unit tests for rw-resilience.

use rw_core::AgentId;

use crate::{
    CircuitBreaker, CircuitState, ErrorContext, ErrorType, MovementFeature, ResilienceConfig,
    ResilienceController, ResilienceError, Severity, MAX_DEGRADATION,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn controller() -> ResilienceController {
    ResilienceController::new(ResilienceConfig { capture_backtraces: false, ..ResilienceConfig::default() })
}

fn report(c: &mut ResilienceController, severity: Severity, now_ms: u64) -> bool {
    c.report_error(ErrorType::MovementFailed, "no destination", ErrorContext::agent(AgentId(1)), severity, now_ms)
}

// ── Degradation ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod degradation {
    use super::*;

    #[test]
    fn healthy_by_default() {
        let c = controller();
        assert_eq!(c.degradation_level(), 0);
        assert_eq!(c.performance_multiplier(), 1.0);
        assert!(MovementFeature::ALL.iter().all(|&f| c.get_feature_enabled(f)));
    }

    #[test]
    fn ten_high_errors_degrade() {
        let mut c = controller();
        let initial = c.performance_multiplier();
        for i in 0..10 {
            report(&mut c, Severity::High, i * 100);
        }
        assert!(c.degradation_level() > 0);
        assert!(c.performance_multiplier() < initial);
    }

    #[test]
    fn level_rises_step_by_step() {
        let mut c = controller();
        // Two HIGH reports weigh 8: one level.
        report(&mut c, Severity::High, 0);
        assert_eq!(c.degradation_level(), 0);
        report(&mut c, Severity::High, 0);
        assert_eq!(c.degradation_level(), 1);
        assert!(!c.get_feature_enabled(MovementFeature::ComplexPathfinding));
        assert!(c.get_feature_enabled(MovementFeature::ZoneAwareness));
        assert_eq!(c.disabled_features(), vec![MovementFeature::ComplexPathfinding]);
    }

    #[test]
    fn low_errors_never_degrade() {
        let mut c = controller();
        for i in 0..100 {
            assert!(report(&mut c, Severity::Low, i));
        }
        assert_eq!(c.degradation_level(), 0);
    }

    #[test]
    fn critical_forces_top_level() {
        let mut c = controller();
        assert!(!report(&mut c, Severity::Critical, 0));
        assert_eq!(c.degradation_level(), MAX_DEGRADATION);
        assert!(!c.get_feature_enabled(MovementFeature::All));
        assert!(!c.get_feature_enabled(MovementFeature::RandomMovement));
        assert!((c.performance_multiplier() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn level_does_not_fall_when_window_expires() {
        let mut c = controller();
        report(&mut c, Severity::High, 0);
        report(&mut c, Severity::High, 0);
        assert_eq!(c.degradation_level(), 1);
        report(&mut c, Severity::Medium, 10 * 60_000);
        assert_eq!(c.degradation_level(), 1);
    }

    #[test]
    fn spread_out_errors_do_not_accumulate() {
        let mut c = controller();
        for i in 0..10 {
            report(&mut c, Severity::High, i * 120_000);
        }
        assert_eq!(c.degradation_level(), 0);
    }

    #[test]
    fn reset_restores_everything() {
        let mut c = controller();
        report(&mut c, Severity::Critical, 0);
        c.reset();
        assert_eq!(c.degradation_level(), 0);
        let stats = c.statistics();
        assert_eq!(stats.total_errors, 0);
        assert_eq!(stats.records_retained, 0);
    }
}

// ── Records & statistics ──────────────────────────────────────────────────────

#[cfg(test)]
mod records {
    use super::*;

    #[test]
    fn ring_buffer_is_bounded() {
        let mut c = ResilienceController::new(ResilienceConfig {
            max_records:        3,
            capture_backtraces: false,
            ..ResilienceConfig::default()
        });
        for i in 0..5 {
            report(&mut c, Severity::Low, i);
        }
        let ids: Vec<u64> = c.records().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 4, 5]);
        assert_eq!(c.statistics().total_errors, 5);
    }

    #[test]
    fn counts_by_type_and_severity() {
        let mut c = controller();
        report(&mut c, Severity::Low, 0);
        report(&mut c, Severity::Medium, 0);
        c.report_error(ErrorType::PathfindingError, "no path", ErrorContext::default(), Severity::Medium, 0);
        let s = c.statistics();
        assert_eq!(s.by_type[&ErrorType::MovementFailed], 2);
        assert_eq!(s.by_type[&ErrorType::PathfindingError], 1);
        assert_eq!(s.by_severity[&Severity::Medium], 2);
        assert_eq!(s.circuit_state, CircuitState::Closed);
    }

    #[test]
    fn feature_names_round_trip() {
        for f in MovementFeature::ALL {
            assert_eq!(f.as_str().parse::<MovementFeature>(), Ok(f));
        }
        assert!("teleport".parse::<MovementFeature>().is_err());
    }
}

// ── Circuit breaker ───────────────────────────────────────────────────────────

#[cfg(test)]
mod breaker {
    use super::*;

    #[test]
    fn opens_after_threshold_and_recovers() {
        let mut b = CircuitBreaker::new(2, 1_000);
        b.record_failure(0);
        assert_eq!(b.state(), CircuitState::Closed);
        b.record_failure(10);
        assert_eq!(b.state(), CircuitState::Open);
        assert_eq!(b.try_acquire(510), Err(500));
        assert_eq!(b.try_acquire(1_010), Ok(()));
        assert_eq!(b.state(), CircuitState::HalfOpen);
        b.record_success();
        assert_eq!(b.state(), CircuitState::Closed);
    }

    #[test]
    fn half_open_failure_reopens() {
        let mut b = CircuitBreaker::new(1, 100);
        b.record_failure(0);
        b.try_acquire(100).unwrap();
        b.record_failure(100);
        assert_eq!(b.state(), CircuitState::Open);
        assert_eq!(b.open_count(), 2);
    }

    #[test]
    fn protected_calls_fail_fast_when_open() {
        let mut c = ResilienceController::new(ResilienceConfig {
            breaker_threshold:   2,
            breaker_cooldown_ms: 1_000,
            capture_backtraces:  false,
            ..ResilienceConfig::default()
        });
        for now in [0, 1] {
            let r: Result<(), _> = c.execute_with_protection(now, || Err::<(), _>("boom"));
            assert!(matches!(r, Err(ResilienceError::Operation("boom"))));
        }
        let mut called = false;
        let r = c.execute_with_protection(2, || {
            called = true;
            Ok::<_, &str>(())
        });
        assert!(matches!(r, Err(ResilienceError::CircuitOpen { .. })));
        assert!(!called);

        let r = c.execute_with_protection(1_001, || Ok::<_, &str>(7));
        assert_eq!(r.unwrap(), 7);
        assert_eq!(c.circuit_state(), CircuitState::Closed);
    }

    #[test]
    fn default_breaker_opens_at_five_for_thirty_seconds() {
        let mut c = controller();
        for now in 0..4 {
            let _ = c.execute_with_protection(now, || Err::<(), _>("boom"));
        }
        assert_eq!(c.circuit_state(), CircuitState::Closed);
        let _ = c.execute_with_protection(4, || Err::<(), _>("boom"));
        assert_eq!(c.circuit_state(), CircuitState::Open);

        let r = c.execute_with_protection(4, || Ok::<_, &str>(()));
        assert!(matches!(r, Err(ResilienceError::CircuitOpen { retry_after_ms: 30_000 })));
        assert!(c.execute_with_protection(30_004, || Ok::<_, &str>(())).is_ok());
    }
}

// ── Retry ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod retry {
    use super::*;

    #[test]
    fn succeeds_after_failures() {
        let mut c = controller();
        let r = c.execute_with_retry(3, 0, |attempt| if attempt < 3 { Err("not yet") } else { Ok(attempt) });
        assert_eq!(r.unwrap(), 3);
        assert_eq!(c.statistics().retries, 2);
    }

    #[test]
    fn exhausts_and_reports_last_error() {
        let mut c = controller();
        let r: Result<(), _> = c.execute_with_retry(2, 0, |attempt| Err(attempt));
        match r {
            Err(ResilienceError::RetriesExhausted { attempts, last }) => {
                assert_eq!(attempts, 3);
                assert_eq!(last, 3);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn zero_retries_is_one_attempt() {
        let mut c = controller();
        let mut calls = 0;
        let _ = c.execute_with_retry(0, 0, |_| {
            calls += 1;
            Err::<(), _>(())
        });
        assert_eq!(calls, 1);
    }
}
