//! Circuit breaker on simulated time.
//!
//! - **Closed**: calls pass; consecutive failures are counted.
//! - **Open**: calls are refused until `cooldown_ms` has passed.
//! - **HalfOpen**: one trial call; success closes, failure reopens.

use std::fmt;

use tracing::{info, warn};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Closed   => "closed",
            Self::Open     => "open",
            Self::HalfOpen => "half-open",
        })
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreaker {
    failure_threshold:    u32,
    cooldown_ms:          u64,
    state:                CircuitState,
    consecutive_failures: u32,
    opened_at_ms:         u64,
    open_count:           u64,
}

impl CircuitBreaker {
    /// `failure_threshold` is clamped to at least 1.
    pub fn new(failure_threshold: u32, cooldown_ms: u64) -> Self {
        Self {
            failure_threshold:    failure_threshold.max(1),
            cooldown_ms,
            state:                CircuitState::Closed,
            consecutive_failures: 0,
            opened_at_ms:         0,
            open_count:           0,
        }
    }

    pub fn state(&self) -> CircuitState {
        self.state
    }

    pub fn open_count(&self) -> u64 {
        self.open_count
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Whether a call may proceed at `now_ms`.  An open breaker whose
    /// cool-down has elapsed moves to half-open.
    ///
    /// # Errors
    ///
    /// The remaining cool-down in milliseconds while open.
    pub fn try_acquire(&mut self, now_ms: u64) -> Result<(), u64> {
        if self.state == CircuitState::Open {
            let elapsed = now_ms.saturating_sub(self.opened_at_ms);
            if elapsed < self.cooldown_ms {
                return Err(self.cooldown_ms - elapsed);
            }
            info!("circuit breaker half-open");
            self.state = CircuitState::HalfOpen;
        }
        Ok(())
    }

    pub fn record_success(&mut self) {
        if self.state == CircuitState::HalfOpen {
            info!("circuit breaker closed");
        }
        self.state = CircuitState::Closed;
        self.consecutive_failures = 0;
    }

    pub fn record_failure(&mut self, now_ms: u64) {
        self.consecutive_failures += 1;
        let trip = match self.state {
            CircuitState::HalfOpen => true,
            CircuitState::Closed => self.consecutive_failures >= self.failure_threshold,
            CircuitState::Open => false,
        };
        if trip {
            warn!(failures = self.consecutive_failures, "circuit breaker opened");
            self.state = CircuitState::Open;
            self.opened_at_ms = now_ms;
            self.open_count += 1;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.failure_threshold, self.cooldown_ms);
    }
}
