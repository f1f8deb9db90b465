//! Testing utilities for the warroom workspace
//!
//! Shared test helpers: deterministic oracle stubs, a manual clock, and
//! incident fixtures.

#![allow(missing_docs)]

use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use warroom_incident::{Category, NewIncident, Severity};
use warroom_oracle::{OracleError, OracleRequest, ReasoningOracle};
use warroom_scenario::Clock;

/// Deterministic oracle keyed on substrings of the request role
///
/// Each registered rule maps a role fragment to a queue-free canned
/// response; failure injection replaces the response with an error for a
/// fixed number of calls, which exercises the retry/degradation paths.
#[derive(Default)]
pub struct ScriptedOracle {
    responses: Mutex<HashMap<String, serde_json::Value>>,
    failures: Mutex<HashMap<String, u32>>,
    calls: Mutex<Vec<OracleRequest>>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond with `value` whenever the request role contains `role_fragment`
    pub fn respond(self, role_fragment: impl Into<String>, value: serde_json::Value) -> Self {
        self.responses.lock().insert(role_fragment.into(), value);
        self
    }

    /// Fail the next `count` calls whose role contains `role_fragment`
    /// with `OracleError::Unreachable`
    pub fn fail_times(self, role_fragment: impl Into<String>, count: u32) -> Self {
        self.failures.lock().insert(role_fragment.into(), count);
        self
    }

    /// Requests seen so far, in arrival order
    pub fn recorded_calls(&self) -> Vec<OracleRequest> {
        self.calls.lock().clone()
    }
}

#[async_trait::async_trait]
impl ReasoningOracle for ScriptedOracle {
    async fn invoke(&self, request: &OracleRequest) -> Result<serde_json::Value, OracleError> {
        self.calls.lock().push(request.clone());

        {
            let mut failures = self.failures.lock();
            let key = failures
                .keys()
                .find(|k| request.role.contains(k.as_str()))
                .cloned();
            if let Some(key) = key {
                let remaining = failures.get_mut(&key).expect("key just found");
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(OracleError::Unreachable("scripted failure".to_string()));
                }
            }
        }

        let responses = self.responses.lock();
        responses
            .iter()
            .find(|(k, _)| request.role.contains(k.as_str()))
            .map(|(_, v)| Ok(v.clone()))
            .unwrap_or_else(|| {
                Err(OracleError::InvalidRequest(format!(
                    "no scripted response for role: {}",
                    request.role
                )))
            })
    }
}

/// Clock whose sleeps resolve immediately and are recorded
pub struct ManualClock {
    base: chrono::DateTime<chrono::Utc>,
    slept: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: chrono::Utc::now(),
            slept: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded_sleeps(&self) -> Vec<Duration> {
        self.slept.lock().clone()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Clock for ManualClock {
    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        self.base
    }

    async fn sleep(&self, duration: Duration) {
        self.slept.lock().push(duration);
    }
}

/// Incident submission with the category's own log channel populated
pub fn submission(category: Category, alert: &str, severity: Severity) -> NewIncident {
    NewIncident::new(category, alert, severity)
        .with_log(category.log_channel(), format!("{alert}: synthetic log line"))
}

/// Submission tagged with a T+k trigger offset
pub fn offset_submission(
    category: Category,
    alert: &str,
    severity: Severity,
    offset_secs: u64,
) -> NewIncident {
    submission(category, alert, severity).with_trigger_offset(offset_secs)
}

/// Canned specialist JSON shaped like an oracle analysis response
pub fn analysis_json(status: &str, hypothesis: &str, confidence: f64) -> serde_json::Value {
    serde_json::json!({
        "status": status,
        "hypothesis": hypothesis,
        "confidence": confidence,
        "evidence": [format!("quote supporting: {hypothesis}")],
        "reasoning": format!("Synthetic reasoning trail for '{hypothesis}'."),
    })
}
