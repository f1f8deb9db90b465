//! Scenario catalog
//!
//! Scenarios are read-only configuration: an ordered list of timed fault
//! payloads that fire with delays to simulate cascading incidents. The
//! built-in library covers the classic database-centric cascades; extra
//! scenarios can be loaded from JSON.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use warroom_incident::{Category, NewIncident, Severity};

/// Scenario catalog errors
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// Named scenario does not exist
    #[error("scenario not found: {0}")]
    NotFound(String),

    /// Catalog JSON is malformed
    #[error("catalog parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A single timed fault payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payload {
    /// Source category
    pub category: Category,
    /// Alert to raise
    pub alert_name: String,
    /// Reported severity
    pub severity: Severity,
    /// Seconds after the scenario's T+0 to deliver
    pub delay_secs: u64,
    /// Log text for the category's own channel
    pub logs: String,
}

impl Payload {
    /// Build the incident submission this payload delivers
    ///
    /// Tagged with the declared offset so downstream temporal reasoning
    /// recovers T+k semantics despite wall-clock arrival jitter.
    #[must_use]
    pub fn to_submission(&self) -> NewIncident {
        NewIncident::new(self.category, self.alert_name.clone(), self.severity)
            .with_log(self.category.log_channel(), self.logs.clone())
            .with_trigger_offset(self.delay_secs)
    }
}

/// Ordered sequence of timed fault payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: String,
    pub payloads: Vec<Payload>,
}

/// Read-only scenario collection, loaded once
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioCatalog {
    scenarios: Vec<Scenario>,
}

impl ScenarioCatalog {
    /// Build a catalog from scenarios
    #[inline]
    #[must_use]
    pub fn new(scenarios: Vec<Scenario>) -> Self {
        Self { scenarios }
    }

    /// Parse a catalog from JSON
    ///
    /// # Errors
    /// `ScenarioError::Parse` on malformed input.
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Look up a scenario by name
    ///
    /// # Errors
    /// `ScenarioError::NotFound` if no scenario matches.
    pub fn get(&self, name: &str) -> Result<&Scenario, ScenarioError> {
        self.scenarios
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| ScenarioError::NotFound(name.to_string()))
    }

    /// All scenarios, in catalog order
    #[inline]
    #[must_use]
    pub fn all(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Scenario names, in catalog order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Built-in scenario library
///
/// Three cascading-failure shapes, each mixing a true trigger with
/// downstream symptoms so the judge has real causal work to do.
#[must_use]
pub fn builtin_catalog() -> &'static ScenarioCatalog {
    static CATALOG: Lazy<ScenarioCatalog> = Lazy::new(|| {
        ScenarioCatalog::new(vec![
            classic_db_deadlock(),
            cascading_table_lock(),
            zombie_transaction(),
        ])
    });
    &CATALOG
}

fn classic_db_deadlock() -> Scenario {
    Scenario {
        name: "Classic DB Deadlock".to_string(),
        description: "Two transactions deadlock at T+1; the gateway timeout at T+3 is a symptom."
            .to_string(),
        payloads: vec![
            Payload {
                category: Category::Code,
                alert_name: "App-Health-Check".to_string(),
                severity: Severity::Info,
                delay_secs: 0,
                logs: "Health Check: PASS. No recent deployments.".to_string(),
            },
            Payload {
                category: Category::Database,
                alert_name: "DB-Deadlock-Critical".to_string(),
                severity: Severity::Critical,
                delay_secs: 1,
                logs: "2025-12-12 10:00:01 [INFO] TxID 991: UPDATE users SET bal=bal-10 WHERE id=1\n\
                       2025-12-12 10:00:01 [INFO] TxID 992: UPDATE users SET bal=bal+10 WHERE id=2\n\
                       2025-12-12 10:00:02 [ERROR] ERROR 1213: Deadlock found. TxID 991 waiting for lock held by 992.\n\
                       2025-12-12 10:00:02 [ERROR] Transaction Rolled Back."
                    .to_string(),
            },
            Payload {
                category: Category::Network,
                alert_name: "API-Gateway-Timeout".to_string(),
                severity: Severity::Warning,
                delay_secs: 3,
                logs: "10:00:01 [INFO] POST /transfer - Forwarding to DB\n\
                       10:00:04 [ERROR] 504 Gateway Timeout: Upstream closed connection unexpectedly."
                    .to_string(),
            },
        ],
    }
}

fn cascading_table_lock() -> Scenario {
    Scenario {
        name: "Cascading Table Lock".to_string(),
        description:
            "An unoptimized full-table scan at T+0 starves inserts and inflates API latency."
                .to_string(),
        payloads: vec![
            Payload {
                category: Category::Code,
                alert_name: "Job-Scheduler-Log".to_string(),
                severity: Severity::Warning,
                delay_secs: 0,
                logs: "10:15:00 [INFO] Starting Job: Monthly_Analytics_Report\n\
                       10:15:00 [WARN] Running unoptimized full-table scan on 'orders' table."
                    .to_string(),
            },
            Payload {
                category: Category::Database,
                alert_name: "DB-Lock-Wait-Timeout".to_string(),
                severity: Severity::Critical,
                delay_secs: 5,
                logs: "10:15:05 [WARN] Process 502 (INSERT INTO orders) blocked for 5000ms.\n\
                       10:15:05 [WARN] Process 503 (INSERT INTO orders) blocked for 5000ms.\n\
                       10:15:05 [INFO] Blocking Process: 400 (SELECT * FROM orders) - Time: 5s"
                    .to_string(),
            },
            Payload {
                category: Category::Network,
                alert_name: "High-Latency-Alert".to_string(),
                severity: Severity::Critical,
                delay_secs: 6,
                logs: "10:15:06 [ERROR] Average API Latency: 5200ms (Threshold: 200ms).\n\
                       10:15:06 [ERROR] Queue Depth: 500 requests pending."
                    .to_string(),
            },
        ],
    }
}

fn zombie_transaction() -> Scenario {
    Scenario {
        name: "Zombie Transaction".to_string(),
        description: "A JSON parse crash at T+0 leaks connections that exhaust the pool by T+15."
            .to_string(),
        payloads: vec![
            Payload {
                category: Category::Code,
                alert_name: "App-Exception-Log".to_string(),
                severity: Severity::Critical,
                delay_secs: 0,
                logs: "10:30:00 [INFO] Transaction Started.\n\
                       10:30:00 [ERROR] JSONDecodeError: Expecting value: line 1 column 1 (char 0).\n\
                       10:30:00 [WARN] Thread terminated without closing DB connection context!"
                    .to_string(),
            },
            Payload {
                category: Category::Database,
                alert_name: "DB-Connection-Warning".to_string(),
                severity: Severity::Warning,
                delay_secs: 10,
                logs: "10:30:10 [INFO] Active Connections: 45/50.\n\
                       10:30:10 [WARN] 15 connections in 'Sleep' state for > 10 seconds holding locks."
                    .to_string(),
            },
            Payload {
                category: Category::Network,
                alert_name: "503-Service-Unavailable".to_string(),
                severity: Severity::Critical,
                delay_secs: 15,
                logs: "10:30:15 [ERROR] 503 Service Unavailable: No DB connections available in pool."
                    .to_string(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_has_three_scenarios() {
        let catalog = builtin_catalog();
        assert_eq!(catalog.all().len(), 3);
        assert!(catalog.get("Classic DB Deadlock").is_ok());
        assert!(catalog.get("Zombie Transaction").is_ok());
    }

    #[test]
    fn unknown_scenario_is_not_found() {
        let result = builtin_catalog().get("Total Eclipse");
        assert!(matches!(result, Err(ScenarioError::NotFound(_))));
    }

    #[test]
    fn payloads_are_delay_ordered() {
        for scenario in builtin_catalog().all() {
            let delays: Vec<u64> = scenario.payloads.iter().map(|p| p.delay_secs).collect();
            let mut sorted = delays.clone();
            sorted.sort_unstable();
            assert_eq!(delays, sorted, "scenario {} out of order", scenario.name);
        }
    }

    #[test]
    fn submission_carries_trigger_offset_and_own_channel() {
        let scenario = builtin_catalog().get("Classic DB Deadlock").unwrap();
        let deadlock = &scenario.payloads[1];
        let submission = deadlock.to_submission();

        assert_eq!(submission.trigger_offset_secs, Some(1));
        assert_eq!(submission.category, Category::Database);
        assert!(submission.logs.contains_key("db"));
        assert!(!submission.logs.contains_key("network"));
    }

    #[test]
    fn catalog_round_trips_through_json() {
        let json = serde_json::to_string(builtin_catalog()).unwrap();
        let parsed = ScenarioCatalog::from_json(&json).unwrap();
        assert_eq!(parsed.names(), builtin_catalog().names());
    }
}
