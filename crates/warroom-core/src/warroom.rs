//! The troubleshoot pipeline
//!
//! [`WarRoom`] wires the store, replay engine, dispatcher, and judge
//! together behind the external boundaries: alert ingestion, scenario
//! execution, and on-demand root-cause analysis.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use warroom_incident::{
    Category, IncidentId, IncidentSnapshot, IncidentStore, LogBundle, NewIncident, Severity,
};
use warroom_oracle::{ReasoningOracle, RetryPolicy};
use warroom_scenario::{builtin_catalog, Clock, ReplayEngine, ReplayReport, ScenarioCatalog};

use crate::dispatcher::{Dispatcher, DispatcherConfig};
use crate::error::WarRoomError;
use crate::finding::{DispatchScope, SpecialistFinding, Verdict};
use crate::judge::Judge;

/// Pipeline tuning
#[derive(Debug, Clone, Default)]
pub struct WarRoomConfig {
    /// Specialist dispatch settings
    pub dispatcher: DispatcherConfig,
    /// Retry policy for the judge's prose refinement call
    pub judge_retry: RetryPolicy,
    /// Skip the judge's oracle refinement and use template prose only
    pub template_verdicts: bool,
}

/// An alert delivered by an external monitoring system
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEnvelope {
    /// Alert that fired
    pub alert_name: String,
    /// Severity as reported
    pub severity: Severity,
    /// Fault category the alert belongs to
    pub source: Category,
    /// Log channel name -> text
    #[serde(default)]
    pub logs: LogBundle,
    /// Arrival time override (absent: stamped on ingestion)
    #[serde(default)]
    pub received_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Outcome of one scenario run
#[derive(Debug, Clone)]
pub struct ScenarioRunReport {
    /// Scenario executed
    pub scenario: String,
    /// Incidents cleared before the run started
    pub cleared: usize,
    /// Delivery outcome
    pub report: ReplayReport,
}

/// Outcome of one troubleshoot round
#[derive(Debug, Clone)]
pub struct TroubleshootReport {
    /// One finding per in-scope category, canonical order
    pub findings: Vec<SpecialistFinding>,
    /// The verdict, when the judge could reach one
    pub verdict: Option<Verdict>,
    /// Why the judge could not reach a verdict, when it could not
    pub judge_error: Option<String>,
}

/// The full RCA pipeline
pub struct WarRoom {
    store: Arc<IncidentStore>,
    dispatcher: Dispatcher,
    judge: Judge,
    catalog: ScenarioCatalog,
    replay: ReplayEngine,
}

impl WarRoom {
    /// Assemble the pipeline with the built-in scenario catalog and the
    /// system clock
    #[must_use]
    pub fn new(oracle: Arc<dyn ReasoningOracle>, config: WarRoomConfig) -> Self {
        let store = Arc::new(IncidentStore::new());
        let replay = ReplayEngine::new(Arc::clone(&store));
        Self::assemble(oracle, config, store, replay)
    }

    /// Assemble with an injected clock (tests)
    #[must_use]
    pub fn with_clock(
        oracle: Arc<dyn ReasoningOracle>,
        config: WarRoomConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let store = Arc::new(IncidentStore::new());
        let replay = ReplayEngine::with_clock(Arc::clone(&store), clock);
        Self::assemble(oracle, config, store, replay)
    }

    fn assemble(
        oracle: Arc<dyn ReasoningOracle>,
        config: WarRoomConfig,
        store: Arc<IncidentStore>,
        replay: ReplayEngine,
    ) -> Self {
        let judge = if config.template_verdicts {
            Judge::deterministic()
        } else {
            Judge::with_oracle(Arc::clone(&oracle), config.judge_retry)
        };
        let dispatcher = Dispatcher::new(oracle, Arc::clone(&store), config.dispatcher);
        Self {
            store,
            dispatcher,
            judge,
            catalog: builtin_catalog().clone(),
            replay,
        }
    }

    /// Replace the scenario catalog
    #[must_use]
    pub fn with_catalog(mut self, catalog: ScenarioCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Ingest one external alert
    ///
    /// # Errors
    /// Validation rejections from the store.
    pub fn ingest_alert(&self, alert: AlertEnvelope) -> Result<IncidentId, WarRoomError> {
        let mut submission = NewIncident::new(alert.source, alert.alert_name, alert.severity);
        submission.logs = alert.logs;
        submission.received_at = alert.received_at;
        Ok(self.store.ingest(submission)?)
    }

    /// Active incidents grouped by category
    #[must_use]
    pub fn active_incidents(&self) -> IncidentSnapshot {
        self.store.active_by_category()
    }

    /// Clear every active incident; returns the count removed
    pub fn clear_all(&self) -> usize {
        self.store.clear_all()
    }

    /// Clear one category; returns the count removed
    pub fn clear_category(&self, category: Category) -> usize {
        self.store.clear_category(category)
    }

    /// Scenario names available for replay
    #[must_use]
    pub fn scenarios(&self) -> Vec<&str> {
        self.catalog.names()
    }

    /// Run a scenario from a clean slate
    ///
    /// Clears all active incidents first so the delivered fault stream is
    /// exactly the scenario's, then executes the replay to completion.
    ///
    /// # Errors
    /// `ScenarioError::NotFound` for an unknown name.
    pub async fn run_scenario(&self, name: &str) -> Result<ScenarioRunReport, WarRoomError> {
        let scenario = self.catalog.get(name)?.clone();
        let cleared = self.store.clear_all();
        if cleared > 0 {
            tracing::info!(cleared, "cleared stale incidents before scenario run");
        }
        let report = self.replay.execute(&scenario).await;
        Ok(ScenarioRunReport {
            scenario: scenario.name,
            cleared,
            report,
        })
    }

    /// Run one full analysis round: dispatch specialists, then judge
    ///
    /// An empty round (no active incidents under `OnlyActive`) returns an
    /// empty report with no error. A judge failure is reported in
    /// `judge_error` alongside the findings rather than discarding them.
    pub async fn troubleshoot(&self, scope: DispatchScope) -> TroubleshootReport {
        let findings = self.dispatcher.analyze(scope).await;
        if findings.is_empty() {
            return TroubleshootReport {
                findings,
                verdict: None,
                judge_error: None,
            };
        }

        match self.judge.synthesize(&findings).await {
            Ok(verdict) => TroubleshootReport {
                findings,
                verdict: Some(verdict),
                judge_error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "judge reached no verdict");
                TroubleshootReport {
                    findings,
                    verdict: None,
                    judge_error: Some(e.to_string()),
                }
            }
        }
    }
}
