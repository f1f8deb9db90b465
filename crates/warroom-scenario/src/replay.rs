//! Chaos replay engine
//!
//! Schedules each payload as an independent task computing its own
//! deadline from a captured T+0, so concurrent scenario executions never
//! share scheduling state and delivery order respects declared delays.
//! One payload's delivery failure is logged and never cancels siblings.

use crate::clock::{Clock, SystemClock};
use crate::scenario::Scenario;
use std::sync::Arc;
use std::time::Duration;
use warroom_incident::IncidentStore;

/// Outcome of one scenario execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayReport {
    /// Payloads in the scenario
    pub total_payloads: usize,
    /// Payloads delivered to the store
    pub delivered: usize,
    /// Payloads whose delivery failed
    pub failed: usize,
}

/// Timed fault-stream generator
#[derive(Clone)]
pub struct ReplayEngine {
    store: Arc<IncidentStore>,
    clock: Arc<dyn Clock>,
}

impl ReplayEngine {
    /// Create engine over the given store with the system clock
    #[inline]
    #[must_use]
    pub fn new(store: Arc<IncidentStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Create engine with an injected clock (tests)
    #[inline]
    #[must_use]
    pub fn with_clock(store: Arc<IncidentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Execute a scenario, delivering every payload at `T0 + delay`
    ///
    /// Completes once every payload task has finished. Partial execution is
    /// tolerated: a failed delivery is counted and logged, and the remaining
    /// payloads still fire.
    pub async fn execute(&self, scenario: &Scenario) -> ReplayReport {
        let t0 = self.clock.now();
        tracing::info!(
            scenario = %scenario.name,
            payloads = scenario.payloads.len(),
            %t0,
            "executing chaos scenario"
        );

        let mut tasks = Vec::with_capacity(scenario.payloads.len());
        for payload in &scenario.payloads {
            let payload = payload.clone();
            let store = Arc::clone(&self.store);
            let clock = Arc::clone(&self.clock);
            let scenario_name = scenario.name.clone();

            tasks.push(tokio::spawn(async move {
                if payload.delay_secs > 0 {
                    clock.sleep(Duration::from_secs(payload.delay_secs)).await;
                }

                let submission = payload.to_submission().with_received_at(clock.now());
                match store.ingest(submission) {
                    Ok(id) => {
                        tracing::info!(
                            scenario = %scenario_name,
                            alert = %payload.alert_name,
                            offset = payload.delay_secs,
                            %id,
                            "payload delivered"
                        );
                        true
                    }
                    Err(e) => {
                        tracing::warn!(
                            scenario = %scenario_name,
                            alert = %payload.alert_name,
                            error = %e,
                            "payload delivery failed, continuing"
                        );
                        false
                    }
                }
            }));
        }

        let mut delivered = 0;
        let mut failed = 0;
        for task in tasks {
            match task.await {
                Ok(true) => delivered += 1,
                Ok(false) => failed += 1,
                Err(e) => {
                    tracing::warn!(error = %e, "payload task panicked");
                    failed += 1;
                }
            }
        }

        ReplayReport {
            total_payloads: scenario.payloads.len(),
            delivered,
            failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{builtin_catalog, Payload};
    use parking_lot::Mutex;
    use warroom_incident::{Category, Severity};

    /// Clock whose sleeps resolve immediately and are recorded
    struct ManualClock {
        base: chrono::DateTime<chrono::Utc>,
        slept: Mutex<Vec<Duration>>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                base: chrono::Utc::now(),
                slept: Mutex::new(Vec::new()),
            }
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

    #[tokio::test]
    async fn delivers_every_payload_under_its_category() {
        let store = Arc::new(IncidentStore::new());
        let clock = Arc::new(ManualClock::new());
        let engine = ReplayEngine::with_clock(Arc::clone(&store), clock);

        let scenario = builtin_catalog().get("Classic DB Deadlock").unwrap();
        let report = engine.execute(scenario).await;

        assert_eq!(report.total_payloads, 3);
        assert_eq!(report.delivered, 3);
        assert_eq!(report.failed, 0);

        assert_eq!(store.evidence_for(Category::Code).len(), 1);
        assert_eq!(store.evidence_for(Category::Database).len(), 1);
        assert_eq!(store.evidence_for(Category::Network).len(), 1);
    }

    #[tokio::test]
    async fn sleeps_match_declared_delays() {
        let store = Arc::new(IncidentStore::new());
        let clock = Arc::new(ManualClock::new());
        let engine = ReplayEngine::with_clock(store, clock.clone());

        let scenario = builtin_catalog().get("Zombie Transaction").unwrap();
        engine.execute(scenario).await;

        let mut slept = clock.slept.lock().clone();
        slept.sort_unstable();
        // delay 0 payload never sleeps
        assert_eq!(
            slept,
            vec![Duration::from_secs(10), Duration::from_secs(15)]
        );
    }

    #[tokio::test]
    async fn incidents_are_tagged_with_trigger_offsets() {
        let store = Arc::new(IncidentStore::new());
        let clock = Arc::new(ManualClock::new());
        let engine = ReplayEngine::with_clock(Arc::clone(&store), clock);

        let scenario = builtin_catalog().get("Cascading Table Lock").unwrap();
        engine.execute(scenario).await;

        let db = store.evidence_for(Category::Database);
        assert_eq!(db[0].trigger_offset_secs, Some(5));
        let code = store.evidence_for(Category::Code);
        assert_eq!(code[0].trigger_offset_secs, Some(0));
    }

    #[tokio::test]
    async fn failed_delivery_does_not_cancel_siblings() {
        let store = Arc::new(IncidentStore::new());
        let clock = Arc::new(ManualClock::new());
        let engine = ReplayEngine::with_clock(Arc::clone(&store), clock);

        // Middle payload has an empty alert name, which the store rejects.
        let scenario = Scenario {
            name: "Partial".to_string(),
            description: "one bad payload".to_string(),
            payloads: vec![
                Payload {
                    category: Category::Code,
                    alert_name: "ok-1".to_string(),
                    severity: Severity::Info,
                    delay_secs: 0,
                    logs: "fine".to_string(),
                },
                Payload {
                    category: Category::Database,
                    alert_name: "  ".to_string(),
                    severity: Severity::Critical,
                    delay_secs: 1,
                    logs: "rejected".to_string(),
                },
                Payload {
                    category: Category::Network,
                    alert_name: "ok-2".to_string(),
                    severity: Severity::Warning,
                    delay_secs: 2,
                    logs: "fine".to_string(),
                },
            ],
        };

        let report = engine.execute(&scenario).await;
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(store.total_active(), 2);
    }

    #[tokio::test]
    async fn concurrent_executions_are_independent() {
        let store = Arc::new(IncidentStore::new());
        let clock = Arc::new(ManualClock::new());
        let engine = ReplayEngine::with_clock(Arc::clone(&store), clock);

        let a = builtin_catalog().get("Classic DB Deadlock").unwrap();
        let b = builtin_catalog().get("Zombie Transaction").unwrap();

        let (ra, rb) = tokio::join!(engine.execute(a), engine.execute(b));
        assert_eq!(ra.delivered, 3);
        assert_eq!(rb.delivered, 3);
        assert_eq!(store.total_active(), 6);
    }
}
