//! Blind specialist agents
//!
//! One agent per fault category. Each agent sees only the evidence of its
//! own category (the blind-men-and-elephant constraint); it can report
//! symptoms as Critical without knowing another category hosts the trigger.
//! The correction happens at the judge.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use warroom_incident::{Category, Incident};
use warroom_oracle::{OracleError, OracleRequest};

use crate::finding::{FindingStatus, SpecialistFinding};

/// Response structure every specialist is prompted to produce
pub(crate) const ANALYSIS_SCHEMA: &str = r#"{
  "status": "Critical | Warning | Healthy",
  "hypothesis": "one-sentence summary of the problem in your domain",
  "confidence": 0.0,
  "evidence": ["direct quotes from the provided logs"],
  "reasoning": "detailed analysis trail"
}"#;

const NETWORK_ROLE: &str = "\
You are a Network Engineer specialist analyzing network traces and logs.

Your expertise includes:
- Network latency and timeouts
- Load balancer issues
- Gateway errors (502, 503, 504)
- DNS resolution and connection problems

When analyzing logs, look for timeout errors, response time anomalies,
connection failures, and load balancer errors.

Cite specific evidence from the logs and assess the severity
(Critical, Warning, or Healthy). Be thorough but concise.";

const DBA_ROLE: &str = "\
You are a Database Administrator (DBA) specialist analyzing database logs.

Your expertise includes:
- Locks, deadlocks, and lock wait timeouts
- Query performance and transaction problems
- Connection pool exhaustion

When analyzing logs, look for deadlock errors, lock wait times, slow
query patterns, transaction conflicts, and resource contention.

Cite specific evidence from the logs and assess the severity
(Critical, Warning, or Healthy). Be thorough but concise.";

const CODE_AUDITOR_ROLE: &str = "\
You are a Code Auditor specialist analyzing code changes and application logs.

Your expertise includes:
- Logic errors and unhandled exceptions
- Race conditions and resource leaks
- Recent code changes that could cause incidents

When analyzing code diffs and traces, look for blocking operations in
critical paths, missing error handling, thread safety issues, and
changes that could cause timeouts or deadlocks.

Cite specific evidence from the diff and assess the severity
(Critical, Warning, or Healthy). Be thorough but concise.";

/// Raw oracle output for one specialist call
#[derive(Debug, Deserialize)]
pub(crate) struct OracleAnalysis {
    status: FindingStatus,
    hypothesis: String,
    confidence: f64,
    evidence: Vec<String>,
    #[serde(default)]
    reasoning: String,
}

/// A category-scoped analyst
///
/// Stateless: holds only its identity and role instruction. The dispatcher
/// hands it a pre-scoped evidence bundle; it never touches the store.
#[derive(Debug, Clone)]
pub struct SpecialistAgent {
    /// Display name (e.g. "DBA")
    pub name: &'static str,
    /// Category this agent is scoped to
    pub category: Category,
    /// System instruction sent with every oracle call
    pub role_definition: &'static str,
}

impl SpecialistAgent {
    /// The specialist responsible for a category
    #[must_use]
    pub fn for_category(category: Category) -> Self {
        match category {
            Category::Network => Self {
                name: "Network Engineer",
                category,
                role_definition: NETWORK_ROLE,
            },
            Category::Database => Self {
                name: "DBA",
                category,
                role_definition: DBA_ROLE,
            },
            Category::Code => Self {
                name: "Code Auditor",
                category,
                role_definition: CODE_AUDITOR_ROLE,
            },
        }
    }

    /// Build the evidence bundle from this category's active incidents
    ///
    /// Only each incident's own log channel is included; text destined for
    /// other specialists never leaks in. Incidents whose bundle lacks the
    /// channel are listed with their alert metadata alone. An empty
    /// incident list yields an explicit "nothing active" context so a
    /// forced dispatch still produces a meaningful exoneration.
    #[must_use]
    pub fn evidence_bundle(&self, incidents: &[Incident]) -> String {
        if incidents.is_empty() {
            return format!(
                "No active {} incidents detected. Confirm the {} layer is healthy \
                 and report status Healthy unless you have reason to believe otherwise.",
                self.category.log_channel(),
                self.category
            );
        }

        let mut bundle = String::new();
        for (n, incident) in incidents.iter().enumerate() {
            bundle.push_str(&format!(
                "=== Incident {}: {} (Severity: {}) ===\n",
                n + 1,
                incident.alert_name,
                incident.severity
            ));
            match incident.own_channel() {
                Some(text) => bundle.push_str(text),
                None => bundle.push_str("(no log text attached)"),
            }
            bundle.push_str("\n\n");
        }
        bundle
    }

    /// The oracle request for one analysis round
    #[must_use]
    pub fn request_for(&self, incidents: &[Incident]) -> OracleRequest {
        OracleRequest::new(
            self.role_definition,
            self.evidence_bundle(incidents),
            ANALYSIS_SCHEMA,
        )
    }

    /// Validate a raw oracle response into an analysis
    ///
    /// # Errors
    /// `OracleError::SchemaViolation` when the JSON does not match the
    /// expected structure or cites no evidence.
    pub(crate) fn parse_analysis(value: serde_json::Value) -> Result<OracleAnalysis, OracleError> {
        let analysis: OracleAnalysis = serde_json::from_value(value)
            .map_err(|e| OracleError::SchemaViolation(format!("specialist response: {e}")))?;
        if analysis.evidence.is_empty() {
            return Err(OracleError::SchemaViolation(
                "specialist response cited no evidence".to_string(),
            ));
        }
        Ok(analysis)
    }

    /// A finding from a successful analysis
    #[must_use]
    pub(crate) fn finding_from(
        &self,
        analysis: OracleAnalysis,
        evidence_offset_secs: Option<u64>,
        evidence_at: Option<DateTime<Utc>>,
    ) -> SpecialistFinding {
        SpecialistFinding {
            agent_name: self.name.to_string(),
            category: self.category,
            status: analysis.status,
            hypothesis: analysis.hypothesis,
            confidence: analysis.confidence.clamp(0.0, 1.0),
            evidence: analysis.evidence,
            reasoning: analysis.reasoning,
            timestamp: Utc::now(),
            evidence_offset_secs,
            evidence_at,
        }
    }

    /// Degraded finding standing in for an exhausted or failed analysis
    ///
    /// Status `Unknown`, confidence zero. The judge treats it as missing
    /// information rather than an exoneration.
    #[must_use]
    pub fn degraded_finding(&self, error: &OracleError) -> SpecialistFinding {
        SpecialistFinding {
            agent_name: self.name.to_string(),
            category: self.category,
            status: FindingStatus::Unknown,
            hypothesis: format!("{} analysis unavailable", self.category),
            confidence: 0.0,
            evidence: Vec::new(),
            reasoning: format!("specialist call failed: {error}"),
            timestamp: Utc::now(),
            evidence_offset_secs: None,
            evidence_at: None,
        }
    }
}
