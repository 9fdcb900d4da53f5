use thiserror::Error;

/// Failure of an operation run under [`ResilienceController`][crate::ResilienceController] protection.
#[derive(Debug, Error)]
pub enum ResilienceError<E> {
    #[error("circuit breaker is open; retry after {retry_after_ms} ms")]
    CircuitOpen { retry_after_ms: u64 },

    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: E },

    #[error("{0}")]
    Operation(E),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown movement feature {0:?}")]
pub struct ParseFeatureError(pub String);
