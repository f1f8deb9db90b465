//! Concurrent specialist dispatch
//!
//! Fan-out of one blind specialist per in-scope category:
//! - Bounded parallelism via semaphore
//! - Per-call timeout and retry handled by the oracle layer
//! - Specialist failure degrades to an `Unknown` finding; it never aborts
//!   the round or disturbs sibling analyses
//!
//! Findings come back in canonical category order regardless of which
//! specialist finished first.

use std::sync::Arc;

use tokio::sync::Semaphore;
use warroom_incident::{Category, Incident, IncidentStore};
use warroom_oracle::{invoke_with_retry, OracleError, ReasoningOracle, RetryPolicy};

use crate::finding::{DispatchScope, SpecialistFinding};
use crate::specialist::SpecialistAgent;

/// Dispatch tuning
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Specialist calls in flight at once
    pub max_concurrency: usize,
    /// Retry/timeout policy applied to every specialist call
    pub retry: RetryPolicy,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 3,
            retry: RetryPolicy::default(),
        }
    }
}

/// Runs one dispatch round over the active incident set
pub struct Dispatcher {
    oracle: Arc<dyn ReasoningOracle>,
    store: Arc<IncidentStore>,
    config: DispatcherConfig,
}

impl Dispatcher {
    /// Create a dispatcher over a store and oracle
    #[must_use]
    pub fn new(
        oracle: Arc<dyn ReasoningOracle>,
        store: Arc<IncidentStore>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            oracle,
            store,
            config,
        }
    }

    /// Run one analysis round
    ///
    /// `OnlyActive` dispatches to categories holding incidents;
    /// `AllCategories` dispatches to every specialist, handing the idle
    /// ones a placeholder context so they exonerate their layer on record.
    /// Always returns one finding per in-scope category, in canonical
    /// order; a round over an empty store under `OnlyActive` returns an
    /// empty vector.
    pub async fn analyze(&self, scope: DispatchScope) -> Vec<SpecialistFinding> {
        let categories: Vec<Category> = match scope {
            DispatchScope::OnlyActive => self.store.active_categories(),
            DispatchScope::AllCategories => Category::ALL.to_vec(),
        };
        if categories.is_empty() {
            tracing::info!("dispatch skipped: no active incidents");
            return Vec::new();
        }

        tracing::info!(
            categories = categories.len(),
            ?scope,
            "dispatching specialists"
        );

        let permits = self.config.max_concurrency.min(categories.len()).max(1);
        let semaphore = Arc::new(Semaphore::new(permits));

        let mut handles = Vec::with_capacity(categories.len());
        for category in &categories {
            let category = *category;
            let oracle = Arc::clone(&self.oracle);
            let semaphore = Arc::clone(&semaphore);
            let retry = self.config.retry;
            let incidents = self.store.evidence_for(category);

            handles.push(tokio::spawn(async move {
                let agent = SpecialistAgent::for_category(category);
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        return agent
                            .degraded_finding(&OracleError::Unreachable(e.to_string()));
                    }
                };
                run_specialist(agent, oracle.as_ref(), &incidents, &retry).await
            }));
        }

        let mut findings = Vec::with_capacity(categories.len());
        for (handle, category) in handles.into_iter().zip(categories) {
            let finding = match handle.await {
                Ok(finding) => finding,
                Err(e) => {
                    tracing::error!(%category, error = %e, "specialist task panicked");
                    SpecialistAgent::for_category(category)
                        .degraded_finding(&OracleError::Unreachable(format!("task failed: {e}")))
                }
            };
            tracing::info!(
                agent = %finding.agent_name,
                status = %finding.status,
                confidence = finding.confidence,
                "specialist finding"
            );
            findings.push(finding);
        }
        findings
    }
}

/// One specialist's full analysis attempt, failures contained
async fn run_specialist(
    agent: SpecialistAgent,
    oracle: &dyn ReasoningOracle,
    incidents: &[Incident],
    retry: &RetryPolicy,
) -> SpecialistFinding {
    let request = agent.request_for(incidents);
    let evidence_offset_secs = incidents.iter().filter_map(|i| i.trigger_offset_secs).min();
    let evidence_at = incidents.iter().map(|i| i.received_at).min();

    match invoke_with_retry(oracle, &request, retry, SpecialistAgent::parse_analysis).await {
        Ok(analysis) => agent.finding_from(analysis, evidence_offset_secs, evidence_at),
        Err(e) => {
            tracing::warn!(agent = agent.name, error = %e, "specialist degraded");
            agent.degraded_finding(&e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::FindingStatus;
    use warroom_incident::Severity;
    use warroom_test_utils::{analysis_json, submission, ScriptedOracle};

    fn seeded_store() -> Arc<IncidentStore> {
        let store = Arc::new(IncidentStore::new());
        store
            .ingest(submission(Category::Database, "DB-Deadlock", Severity::Critical))
            .unwrap();
        store
            .ingest(submission(Category::Network, "Gateway-504", Severity::Warning))
            .unwrap();
        store
    }

    fn full_oracle() -> ScriptedOracle {
        ScriptedOracle::new()
            .respond("Network Engineer", analysis_json("Warning", "gateway timeouts", 0.7))
            .respond("Database Administrator", analysis_json("Critical", "deadlock", 0.95))
            .respond("Code Auditor", analysis_json("Healthy", "no recent changes", 0.9))
    }

    #[tokio::test]
    async fn only_active_skips_idle_categories() {
        let store = seeded_store();
        let dispatcher = Dispatcher::new(
            Arc::new(full_oracle()),
            store,
            DispatcherConfig::default(),
        );

        let findings = dispatcher.analyze(DispatchScope::OnlyActive).await;
        let categories: Vec<Category> = findings.iter().map(|f| f.category).collect();
        assert_eq!(categories, vec![Category::Network, Category::Database]);
    }

    #[tokio::test]
    async fn all_categories_forces_every_specialist() {
        let store = seeded_store();
        let dispatcher = Dispatcher::new(
            Arc::new(full_oracle()),
            store,
            DispatcherConfig::default(),
        );

        let findings = dispatcher.analyze(DispatchScope::AllCategories).await;
        assert_eq!(findings.len(), 3);
        let code = &findings[2];
        assert_eq!(code.category, Category::Code);
        assert_eq!(code.status, FindingStatus::Healthy);
    }

    #[tokio::test]
    async fn empty_store_dispatches_nothing_when_only_active() {
        let dispatcher = Dispatcher::new(
            Arc::new(full_oracle()),
            Arc::new(IncidentStore::new()),
            DispatcherConfig::default(),
        );

        let findings = dispatcher.analyze(DispatchScope::OnlyActive).await;
        assert!(findings.is_empty());
    }

    #[tokio::test]
    async fn exhausted_specialist_degrades_without_aborting_round() {
        let store = seeded_store();
        let oracle = ScriptedOracle::new()
            .respond("Network Engineer", analysis_json("Warning", "gateway timeouts", 0.7))
            .fail_times("Database Administrator", 99);
        let config = DispatcherConfig {
            retry: RetryPolicy {
                base_delay: std::time::Duration::from_millis(1),
                max_delay: std::time::Duration::from_millis(2),
                ..RetryPolicy::default()
            },
            ..DispatcherConfig::default()
        };
        let dispatcher = Dispatcher::new(Arc::new(oracle), store, config);

        let findings = dispatcher.analyze(DispatchScope::OnlyActive).await;
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].status, FindingStatus::Warning);
        assert_eq!(findings[1].status, FindingStatus::Unknown);
        assert_eq!(findings[1].confidence, 0.0);
    }

    #[tokio::test]
    async fn transient_failure_recovers_within_retry_budget() {
        let store = Arc::new(IncidentStore::new());
        store
            .ingest(submission(Category::Code, "App-Exception", Severity::Critical))
            .unwrap();
        let oracle = ScriptedOracle::new()
            .respond("Code Auditor", analysis_json("Critical", "unhandled exception", 0.9))
            .fail_times("Code Auditor", 2);
        let config = DispatcherConfig {
            retry: RetryPolicy {
                base_delay: std::time::Duration::from_millis(1),
                max_delay: std::time::Duration::from_millis(2),
                ..RetryPolicy::default()
            },
            ..DispatcherConfig::default()
        };
        let dispatcher = Dispatcher::new(Arc::new(oracle), store, config);

        let findings = dispatcher.analyze(DispatchScope::OnlyActive).await;
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].status, FindingStatus::Critical);
    }

    #[tokio::test]
    async fn offsets_flow_from_incidents_to_findings() {
        let store = Arc::new(IncidentStore::new());
        store
            .ingest(
                submission(Category::Database, "DB-Lock-Alert", Severity::Critical)
                    .with_trigger_offset(5),
            )
            .unwrap();
        store
            .ingest(
                submission(Category::Database, "DB-Lock-Spike", Severity::Warning)
                    .with_trigger_offset(8),
            )
            .unwrap();
        let dispatcher = Dispatcher::new(
            Arc::new(full_oracle()),
            store,
            DispatcherConfig::default(),
        );

        let findings = dispatcher.analyze(DispatchScope::OnlyActive).await;
        assert_eq!(findings[0].evidence_offset_secs, Some(5));
    }
}
