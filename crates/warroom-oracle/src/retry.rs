//! Retryable oracle invocation
//!
//! Generic retry-with-backoff wrapper around a [`ReasoningOracle`] call,
//! parameterized by attempt ceiling and backoff schedule so tests can swap
//! in a deterministic stub.

use crate::error::OracleError;
use crate::{OracleRequest, ReasoningOracle};
use std::time::Duration;

/// Retry configuration for oracle calls
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempt ceiling (1 = no retries)
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles each retry
    pub base_delay: Duration,
    /// Backoff cap
    pub max_delay: Duration,
    /// Per-call timeout; a call exceeding this is abandoned
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            call_timeout: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay before the given retry (attempt numbering starts at 1)
    #[inline]
    #[must_use]
    pub fn delay_before(&self, next_attempt: u32) -> Duration {
        let exp = next_attempt.saturating_sub(2).min(16);
        let delay = self.base_delay.saturating_mul(1u32 << exp);
        delay.min(self.max_delay)
    }

    /// With attempt ceiling
    #[inline]
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// With per-call timeout
    #[inline]
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}

/// Invoke the oracle with timeout, parse validation, and backoff
///
/// Each attempt is bounded by `policy.call_timeout`; a timed-out call is
/// abandoned and its result discarded. `parse` validates the structured
/// response; a `SchemaViolation` from parsing consumes a retry like any
/// other transient failure. Non-retryable errors surface immediately.
///
/// # Errors
/// The last failure once the attempt ceiling is exhausted.
pub async fn invoke_with_retry<T, F>(
    oracle: &dyn ReasoningOracle,
    request: &OracleRequest,
    policy: &RetryPolicy,
    parse: F,
) -> Result<T, OracleError>
where
    F: Fn(serde_json::Value) -> Result<T, OracleError>,
{
    let mut last_error = OracleError::Unreachable("no attempts made".to_string());

    for attempt in 1..=policy.max_attempts {
        let outcome = tokio::time::timeout(policy.call_timeout, oracle.invoke(request)).await;

        let error = match outcome {
            Ok(Ok(value)) => match parse(value) {
                Ok(parsed) => return Ok(parsed),
                Err(e) => e,
            },
            Ok(Err(e)) => e,
            Err(_) => OracleError::Timeout {
                duration_secs: policy.call_timeout.as_secs(),
            },
        };

        if !error.is_retryable() {
            return Err(error);
        }

        tracing::warn!(
            attempt,
            max_attempts = policy.max_attempts,
            error = %error,
            "oracle call failed"
        );
        last_error = error;

        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.delay_before(attempt + 1)).await;
        }
    }

    Err(last_error)
}
