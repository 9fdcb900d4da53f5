//! The `ResilienceController`.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::{
    CircuitBreaker, CircuitState, ErrorContext, ErrorRecord, ErrorType, MovementFeature,
    ResilienceError, Severity,
};

/// Highest degradation level; everything is off.
pub const MAX_DEGRADATION: u8 = 5;

/// Multiplier lost per degradation level.
const MULTIPLIER_STEP: f64 = 0.15;

// ── Config ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResilienceConfig {
    /// Error records kept in the ring buffer.
    pub max_records:         usize,
    /// Rolling window for the degradation weight.
    pub window_ms:           u64,
    /// Window weight per degradation level (HIGH = 4, MEDIUM = 1).
    pub weight_per_level:    u32,
    /// Consecutive failures that open the circuit breaker.
    pub breaker_threshold:   u32,
    pub breaker_cooldown_ms: u64,
    pub capture_backtraces:  bool,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            max_records:         100,
            window_ms:           60_000,
            weight_per_level:    8,
            breaker_threshold:   5,
            breaker_cooldown_ms: 30_000,
            capture_backtraces:  true,
        }
    }
}

// ── Statistics ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorStatistics {
    pub total_errors:       u64,
    pub by_type:            BTreeMap<ErrorType, u64>,
    pub by_severity:        BTreeMap<Severity, u64>,
    pub degradation_level:  u8,
    pub circuit_state:      CircuitState,
    pub circuit_open_count: u64,
    pub records_retained:   usize,
    pub retries:            u64,
}

// ── Controller ────────────────────────────────────────────────────────────────

/// Error intake, degradation ladder, circuit breaker, and retry helper.
///
/// All timing is in simulated milliseconds supplied by the caller, except
/// the retry delay which really sleeps.
pub struct ResilienceController {
    config:      ResilienceConfig,
    records:     VecDeque<ErrorRecord>,
    /// `(timestamp_ms, weight)` of recent weighted reports.
    window:      VecDeque<(u64, u32)>,
    level:       u8,
    next_id:     u64,
    total:       u64,
    by_type:     BTreeMap<ErrorType, u64>,
    by_severity: BTreeMap<Severity, u64>,
    breaker:     CircuitBreaker,
    retries:     u64,
}

impl Default for ResilienceController {
    fn default() -> Self {
        Self::new(ResilienceConfig::default())
    }
}

impl ResilienceController {
    pub fn new(config: ResilienceConfig) -> Self {
        Self {
            breaker:     CircuitBreaker::new(config.breaker_threshold, config.breaker_cooldown_ms),
            records:     VecDeque::with_capacity(config.max_records.min(1024)),
            window:      VecDeque::new(),
            level:       0,
            next_id:     1,
            total:       0,
            by_type:     BTreeMap::new(),
            by_severity: BTreeMap::new(),
            retries:     0,
            config,
        }
    }

    pub fn config(&self) -> &ResilienceConfig {
        &self.config
    }

    // ── Reporting ─────────────────────────────────────────────────────────

    /// Record an error and adjust the degradation level.
    ///
    /// Returns `true` if the caller can carry on locally (skip this move and
    /// try again later); `false` for `Critical` errors and whenever movement
    /// is fully shed.
    pub fn report_error(
        &mut self,
        error_type: ErrorType,
        message:    impl Into<String>,
        context:    ErrorContext,
        severity:   Severity,
        now_ms:     u64,
    ) -> bool {
        let message = message.into();
        self.total += 1;
        *self.by_type.entry(error_type).or_insert(0) += 1;
        *self.by_severity.entry(severity).or_insert(0) += 1;

        let backtrace = self.config.capture_backtraces.then(Backtrace::capture).and_then(|bt| {
            (bt.status() == BacktraceStatus::Captured).then(|| bt.to_string())
        });
        let record = ErrorRecord {
            id: self.next_id,
            error_type,
            severity,
            message,
            context,
            backtrace,
            timestamp_ms: now_ms,
        };
        self.next_id += 1;
        match severity {
            Severity::Critical => error!(%error_type, detail = %record.message, "critical movement error"),
            Severity::High => warn!(%error_type, detail = %record.message, "movement error"),
            _ => debug!(%error_type, %severity, detail = %record.message, "movement error"),
        }
        if self.config.max_records > 0 {
            if self.records.len() == self.config.max_records {
                self.records.pop_front();
            }
            self.records.push_back(record);
        }

        let before = self.level;
        if severity == Severity::Critical {
            self.level = MAX_DEGRADATION;
        } else {
            self.window.push_back((now_ms, severity.weight()));
            self.prune_window(now_ms);
            let weight: u32 = self.window.iter().map(|&(_, w)| w).sum();
            let target = (weight / self.config.weight_per_level.max(1)).min(u32::from(MAX_DEGRADATION)) as u8;
            self.level = self.level.max(target);
        }
        if self.level != before {
            warn!(from = before, to = self.level, "degradation level raised");
        }

        severity != Severity::Critical && self.level < MAX_DEGRADATION
    }

    fn prune_window(&mut self, now_ms: u64) {
        let horizon = now_ms.saturating_sub(self.config.window_ms);
        while self.window.front().is_some_and(|&(t, _)| t < horizon) {
            self.window.pop_front();
        }
    }

    /// Most recent records, newest last.
    pub fn records(&self) -> impl Iterator<Item = &ErrorRecord> {
        self.records.iter()
    }

    // ── Degradation ───────────────────────────────────────────────────────

    pub fn degradation_level(&self) -> u8 {
        self.level
    }

    pub fn get_feature_enabled(&self, feature: MovementFeature) -> bool {
        feature.enabled_at(self.level)
    }

    pub fn disabled_features(&self) -> Vec<MovementFeature> {
        MovementFeature::ALL.into_iter().filter(|f| !f.enabled_at(self.level)).collect()
    }

    /// `1.0 − 0.15 × level`: 1.0 when healthy, 0.25 at the top level.
    pub fn performance_multiplier(&self) -> f64 {
        1.0 - MULTIPLIER_STEP * f64::from(self.level)
    }

    /// Zero every counter, clear the records, close the breaker, and return
    /// to level 0.
    pub fn reset(&mut self) {
        let config = self.config.clone();
        *self = Self::new(config);
        debug!("resilience state reset");
    }

    // ── Protection ────────────────────────────────────────────────────────

    /// Run `op` behind the circuit breaker.
    ///
    /// # Errors
    ///
    /// `CircuitOpen` without calling `op` while the breaker is open;
    /// `Operation` with `op`'s own error otherwise.
    pub fn execute_with_protection<T, E>(
        &mut self,
        now_ms: u64,
        op:     impl FnOnce() -> Result<T, E>,
    ) -> Result<T, ResilienceError<E>> {
        self.breaker
            .try_acquire(now_ms)
            .map_err(|retry_after_ms| ResilienceError::CircuitOpen { retry_after_ms })?;
        match op() {
            Ok(value) => {
                self.breaker.record_success();
                Ok(value)
            }
            Err(e) => {
                self.breaker.record_failure(now_ms);
                Err(ResilienceError::Operation(e))
            }
        }
    }

    /// Run `op` up to `max_retries + 1` times, sleeping `delay_ms × attempt`
    /// between attempts.  `op` receives the 1-based attempt number.
    ///
    /// # Errors
    ///
    /// `RetriesExhausted` carrying the last error.
    pub fn execute_with_retry<T, E>(
        &mut self,
        max_retries: u32,
        delay_ms:    u64,
        mut op:      impl FnMut(u32) -> Result<T, E>,
    ) -> Result<T, ResilienceError<E>> {
        let attempts = max_retries.saturating_add(1);
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(last) if attempt >= attempts => {
                    return Err(ResilienceError::RetriesExhausted { attempts, last });
                }
                Err(_) => {
                    self.retries += 1;
                    let delay = delay_ms.saturating_mul(u64::from(attempt));
                    debug!(attempt, delay_ms = delay, "retrying");
                    if delay > 0 {
                        std::thread::sleep(Duration::from_millis(delay));
                    }
                    attempt += 1;
                }
            }
        }
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }

    // ── Statistics ────────────────────────────────────────────────────────

    pub fn statistics(&self) -> ErrorStatistics {
        ErrorStatistics {
            total_errors:       self.total,
            by_type:            self.by_type.clone(),
            by_severity:        self.by_severity.clone(),
            degradation_level:  self.level,
            circuit_state:      self.breaker.state(),
            circuit_open_count: self.breaker.open_count(),
            records_retained:   self.records.len(),
            retries:            self.retries,
        }
    }
}
