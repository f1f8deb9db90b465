//! Error types for the RCA core
//!
//! Specialist-level failures never appear here: they are contained inside
//! the dispatcher as degraded findings. These errors cover what the caller
//! must be able to distinguish: validation rejections, missing scenarios,
//! and the judge being unable to reach any verdict at all.

/// Judge synthesis failures
///
/// Surfaced distinctly from per-specialist failures so a caller can tell
/// "no consensus reachable" apart from "one specialist was unreachable".
#[derive(Debug, thiserror::Error)]
pub enum JudgeError {
    /// Invoked with zero findings
    #[error("cannot synthesize a verdict from zero findings")]
    InsufficientEvidence,

    /// Every finding was healthy or degraded; nothing to indict
    #[error("no actionable findings: every specialist reported healthy or was unavailable")]
    NoActionableFindings,
}

/// Top-level pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum WarRoomError {
    /// Incident rejected at ingestion
    #[error("store error: {0}")]
    Store(#[from] warroom_incident::StoreError),

    /// Scenario catalog failure
    #[error("scenario error: {0}")]
    Scenario(#[from] warroom_scenario::ScenarioError),

    /// Judge could not produce a verdict
    #[error("judge error: {0}")]
    Judge(#[from] JudgeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn judge_errors_are_distinguishable() {
        let empty = JudgeError::InsufficientEvidence;
        let healthy = JudgeError::NoActionableFindings;
        assert_ne!(empty.to_string(), healthy.to_string());
    }

    #[test]
    fn warroom_error_wraps_store_error() {
        let err: WarRoomError =
            warroom_incident::StoreError::Validation("empty alert name".to_string()).into();
        assert!(err.to_string().contains("validation failed"));
    }
}
