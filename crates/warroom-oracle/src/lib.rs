//! Reasoning-oracle boundary
//!
//! The only non-deterministic external dependency in the pipeline:
//! - [`ReasoningOracle`] trait: evidence bundle in, structured JSON out
//! - Error taxonomy with retryable/non-retryable classification
//! - Exponential-backoff retry helper with per-call timeout
//! - [`HttpOracle`]: OpenAI-compatible chat-completions provider
//!
//! The dispatcher and judge depend only on this contract, never on a
//! specific provider.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod http;
pub mod retry;

pub use error::OracleError;
pub use http::{HttpOracle, HttpOracleConfig};
pub use retry::{invoke_with_retry, RetryPolicy};

use serde::{Deserialize, Serialize};

/// A single oracle invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleRequest {
    /// System instruction defining the caller's role and expertise
    pub role: String,
    /// Evidence bundle (already scoped by the caller)
    pub evidence: String,
    /// Plain-text description of the expected response structure,
    /// embedded in the prompt
    pub response_schema: String,
}

impl OracleRequest {
    /// Create new request
    #[inline]
    #[must_use]
    pub fn new(
        role: impl Into<String>,
        evidence: impl Into<String>,
        response_schema: impl Into<String>,
    ) -> Self {
        Self {
            role: role.into(),
            evidence: evidence.into(),
            response_schema: response_schema.into(),
        }
    }
}

/// Converts an evidence bundle into a structured hypothesis or verdict
///
/// Implementations must be safe to invoke concurrently; the dispatcher
/// runs one call per category in parallel.
#[async_trait::async_trait]
pub trait ReasoningOracle: Send + Sync {
    /// Invoke the oracle once
    ///
    /// # Errors
    /// - `OracleError::Unreachable` if the provider cannot be contacted
    /// - `OracleError::Timeout` if the provider did not answer in time
    /// - `OracleError::SchemaViolation` if the response is not valid JSON
    /// - `OracleError::InvalidRequest` for non-retryable request failures
    async fn invoke(&self, request: &OracleRequest) -> Result<serde_json::Value, OracleError>;
}
