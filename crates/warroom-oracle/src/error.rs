//! Oracle error taxonomy
//!
//! Classification drives the retry decision: transient provider failures
//! and malformed structured output are retried with backoff up to the
//! attempt ceiling; request-level failures are surfaced immediately.

/// Reasoning-oracle failure modes
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// Provider cannot be contacted (connection refused, 5xx, rate limit)
    #[error("oracle unreachable: {0}")]
    Unreachable(String),

    /// Provider did not answer within the per-call timeout
    #[error("oracle timed out after {duration_secs}s")]
    Timeout { duration_secs: u64 },

    /// Response does not match the expected structure
    #[error("schema violation: {0}")]
    SchemaViolation(String),

    /// Request itself is malformed or unauthorized; retrying cannot help
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl OracleError {
    /// Check if error is retryable within the backoff budget
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Unreachable(_) | Self::Timeout { .. } | Self::SchemaViolation(_)
        )
    }
}
