//! Verdict synthesis
//!
//! The judge is the only component that sees every specialist's finding.
//! Root-cause selection is deterministic:
//! - First-mover rule: among Critical findings, the earliest T+k offset
//!   hosts the trigger; everything later is a downstream symptom
//! - Causal precedence (Code > Database > Network) breaks exact offset
//!   ties only; it never overrides a strictly earlier offset
//! - No Critical findings: fall back to Warning candidates; none of those
//!   either is `NoActionableFindings`
//!
//! The explanation and remediation prose may optionally be refined by one
//! oracle call; a refinement failure falls back to the deterministic
//! templates and never changes the selected root cause.

use std::fmt::Write as _;
use std::sync::Arc;

use serde::Deserialize;
use warroom_oracle::{invoke_with_retry, OracleError, OracleRequest, ReasoningOracle, RetryPolicy};

use crate::error::JudgeError;
use crate::finding::{FindingStatus, SpecialistFinding, Verdict};

const JUDGE_ROLE: &str = "\
You are a Senior Principal Engineer and Incident Commander.
The root cause has already been determined from the incident timeline.
Your task is to write the causal narrative and remediation plan.

Explain the chain Trigger -> Mechanism -> Symptom, citing the T+k
offsets of each report, and give specific technical remediation steps
scoped to the identified trigger. Do not dispute the root cause.";

const REFINEMENT_SCHEMA: &str = r#"{
  "causal_explanation": "the trigger -> mechanism -> symptom chain, citing T+k offsets",
  "remediation_plan": "specific technical steps addressing the trigger"
}"#;

/// Oracle-refined prose; selection fields deliberately absent
#[derive(Debug, Deserialize)]
struct VerdictProse {
    causal_explanation: String,
    remediation_plan: String,
}

/// Synthesizes specialist findings into a single verdict
pub struct Judge {
    oracle: Option<Arc<dyn ReasoningOracle>>,
    retry: RetryPolicy,
}

impl Judge {
    /// Template-only judge (fully deterministic)
    #[must_use]
    pub fn deterministic() -> Self {
        Self {
            oracle: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Judge with oracle-refined prose
    #[must_use]
    pub fn with_oracle(oracle: Arc<dyn ReasoningOracle>, retry: RetryPolicy) -> Self {
        Self {
            oracle: Some(oracle),
            retry,
        }
    }

    /// Produce the verdict for one dispatch round
    ///
    /// # Errors
    /// - [`JudgeError::InsufficientEvidence`] for an empty findings slice
    /// - [`JudgeError::NoActionableFindings`] when every finding is
    ///   Healthy or Unknown
    pub async fn synthesize(
        &self,
        findings: &[SpecialistFinding],
    ) -> Result<Verdict, JudgeError> {
        if findings.is_empty() {
            return Err(JudgeError::InsufficientEvidence);
        }

        let offsets: Vec<u64> = resolve_offsets(findings);
        let chosen = select_root_cause(findings, &offsets)?;
        let chosen_offset = offsets[chosen];
        let root = &findings[chosen];

        tracing::info!(
            agent = %root.agent_name,
            category = %root.category,
            offset_secs = chosen_offset,
            "root cause selected"
        );

        let causal_explanation = explanation_template(findings, &offsets, chosen);
        let remediation_plan = remediation_template(root);

        let (causal_explanation, remediation_plan) = match &self.oracle {
            Some(oracle) => {
                self.refine_prose(oracle.as_ref(), findings, &offsets, chosen)
                    .await
                    .unwrap_or_else(|e| {
                        tracing::warn!(error = %e, "verdict refinement failed, using templates");
                        (causal_explanation, remediation_plan)
                    })
            }
            None => (causal_explanation, remediation_plan),
        };

        Ok(Verdict {
            root_cause_headline: root.hypothesis.clone(),
            root_cause_category: root.category,
            causal_explanation,
            remediation_plan,
        })
    }

    async fn refine_prose(
        &self,
        oracle: &dyn ReasoningOracle,
        findings: &[SpecialistFinding],
        offsets: &[u64],
        chosen: usize,
    ) -> Result<(String, String), OracleError> {
        let root = &findings[chosen];
        let mut evidence = format!(
            "Determined root cause: {} failure at T+{}s: {}\n\nSpecialist reports:\n",
            root.category, offsets[chosen], root.hypothesis
        );
        for (finding, offset) in findings.iter().zip(offsets) {
            let _ = write!(
                evidence,
                "\n=== {} (T+{}s) ===\nStatus: {}\nHypothesis: {}\nConfidence: {:.2}\nEvidence: {}\nReasoning: {}\n",
                finding.agent_name,
                offset,
                finding.status,
                finding.hypothesis,
                finding.confidence,
                finding.evidence.join(", "),
                finding.reasoning
            );
        }

        let request = OracleRequest::new(JUDGE_ROLE, evidence, REFINEMENT_SCHEMA);
        let prose: VerdictProse =
            invoke_with_retry(oracle, &request, &self.retry, |value| {
                serde_json::from_value(value)
                    .map_err(|e| OracleError::SchemaViolation(format!("judge response: {e}")))
            })
            .await?;
        Ok((prose.causal_explanation, prose.remediation_plan))
    }
}

/// T+k offset for each finding
///
/// Declared offsets win; findings without one derive theirs from arrival
/// time relative to the round's earliest arrival; otherwise T+0.
fn resolve_offsets(findings: &[SpecialistFinding]) -> Vec<u64> {
    let earliest_arrival = findings.iter().filter_map(|f| f.evidence_at).min();
    findings
        .iter()
        .map(|f| {
            if let Some(offset) = f.evidence_offset_secs {
                return offset;
            }
            match (f.evidence_at, earliest_arrival) {
                (Some(at), Some(base)) => (at - base).num_seconds().max(0) as u64,
                _ => 0,
            }
        })
        .collect()
}

/// Index of the root-cause finding
fn select_root_cause(
    findings: &[SpecialistFinding],
    offsets: &[u64],
) -> Result<usize, JudgeError> {
    let candidates: Vec<usize> = pick_candidates(findings, FindingStatus::Critical)
        .or_else(|| pick_candidates(findings, FindingStatus::Warning))
        .ok_or(JudgeError::NoActionableFindings)?;

    // Earliest offset wins; precedence only decides exact ties.
    let chosen = candidates
        .iter()
        .copied()
        .min_by(|&a, &b| {
            offsets[a]
                .cmp(&offsets[b])
                .then_with(|| {
                    findings[b]
                        .category
                        .precedence()
                        .cmp(&findings[a].category.precedence())
                })
        })
        .ok_or(JudgeError::NoActionableFindings)?;

    if let Some(&highest) = candidates
        .iter()
        .max_by_key(|&&i| findings[i].category.precedence())
    {
        if highest != chosen && offsets[highest] != offsets[chosen] {
            tracing::warn!(
                first_mover = %findings[chosen].category,
                precedence_favorite = %findings[highest].category,
                "timeline and causal precedence disagree; timeline wins"
            );
        }
    }

    Ok(chosen)
}

fn pick_candidates(findings: &[SpecialistFinding], status: FindingStatus) -> Option<Vec<usize>> {
    let picked: Vec<usize> = findings
        .iter()
        .enumerate()
        .filter(|(_, f)| f.status == status)
        .map(|(i, _)| i)
        .collect();
    (!picked.is_empty()).then_some(picked)
}

fn explanation_template(
    findings: &[SpecialistFinding],
    offsets: &[u64],
    chosen: usize,
) -> String {
    let root = &findings[chosen];
    let mut text = format!(
        "Trigger: {} reported '{}' at T+{}s.",
        root.agent_name, root.hypothesis, offsets[chosen]
    );
    for (i, (finding, offset)) in findings.iter().zip(offsets).enumerate() {
        if i == chosen {
            continue;
        }
        match finding.status {
            FindingStatus::Critical | FindingStatus::Warning => {
                let _ = write!(
                    text,
                    " Downstream symptom at T+{}s: {} observed '{}'.",
                    offset, finding.agent_name, finding.hypothesis
                );
            }
            FindingStatus::Healthy => {
                let _ = write!(
                    text,
                    " {} ruled out the {} layer ('{}').",
                    finding.agent_name, finding.category, finding.hypothesis
                );
            }
            FindingStatus::Unknown => {
                let _ = write!(
                    text,
                    " {} analysis was unavailable for this round.",
                    finding.agent_name
                );
            }
        }
    }
    text
}

fn remediation_template(root: &SpecialistFinding) -> String {
    format!(
        "Address the {} trigger directly: {}. Validate against the cited evidence ({}) \
         and confirm downstream symptoms clear once the trigger is resolved.",
        root.category,
        root.hypothesis,
        root.evidence.join("; ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use warroom_incident::Category;

    fn finding(
        category: Category,
        status: FindingStatus,
        hypothesis: &str,
        offset: Option<u64>,
    ) -> SpecialistFinding {
        SpecialistFinding {
            agent_name: format!("{category} specialist"),
            category,
            status,
            hypothesis: hypothesis.to_string(),
            confidence: 0.9,
            evidence: vec![format!("log line for {hypothesis}")],
            reasoning: String::new(),
            timestamp: chrono::Utc::now(),
            evidence_offset_secs: offset,
            evidence_at: None,
        }
    }

    #[tokio::test]
    async fn empty_findings_are_rejected() {
        let result = Judge::deterministic().synthesize(&[]).await;
        assert!(matches!(result, Err(JudgeError::InsufficientEvidence)));
    }

    #[tokio::test]
    async fn first_mover_beats_precedence() {
        // Database fails at T+1, Code at T+3: the timeline wins even
        // though Code outranks Database on ties.
        let findings = vec![
            finding(Category::Database, FindingStatus::Critical, "deadlock on orders", Some(1)),
            finding(Category::Code, FindingStatus::Critical, "unhandled exception", Some(3)),
        ];

        let verdict = Judge::deterministic().synthesize(&findings).await.unwrap();
        assert_eq!(verdict.root_cause_category, Category::Database);
        assert_eq!(verdict.root_cause_headline, "deadlock on orders");
    }

    #[tokio::test]
    async fn precedence_breaks_exact_ties() {
        let findings = vec![
            finding(Category::Network, FindingStatus::Critical, "gateway 504s", Some(2)),
            finding(Category::Database, FindingStatus::Critical, "lock waits", Some(2)),
            finding(Category::Code, FindingStatus::Critical, "null dereference", Some(2)),
        ];

        let verdict = Judge::deterministic().synthesize(&findings).await.unwrap();
        assert_eq!(verdict.root_cause_category, Category::Code);
    }

    #[tokio::test]
    async fn database_outranks_network_on_tie() {
        let findings = vec![
            finding(Category::Network, FindingStatus::Critical, "latency spike", Some(0)),
            finding(Category::Database, FindingStatus::Critical, "deadlock", Some(0)),
        ];

        let verdict = Judge::deterministic().synthesize(&findings).await.unwrap();
        assert_eq!(verdict.root_cause_category, Category::Database);
    }

    #[tokio::test]
    async fn warnings_are_fallback_candidates() {
        let findings = vec![
            finding(Category::Network, FindingStatus::Healthy, "all clear", Some(0)),
            finding(Category::Database, FindingStatus::Warning, "slow queries", Some(4)),
        ];

        let verdict = Judge::deterministic().synthesize(&findings).await.unwrap();
        assert_eq!(verdict.root_cause_category, Category::Database);
    }

    #[tokio::test]
    async fn all_healthy_yields_no_actionable_findings() {
        let findings = vec![
            finding(Category::Network, FindingStatus::Healthy, "clear", Some(0)),
            finding(Category::Code, FindingStatus::Unknown, "unavailable", None),
        ];

        let result = Judge::deterministic().synthesize(&findings).await;
        assert!(matches!(result, Err(JudgeError::NoActionableFindings)));
    }

    #[tokio::test]
    async fn unknown_findings_never_win() {
        let findings = vec![
            finding(Category::Code, FindingStatus::Unknown, "unavailable", Some(0)),
            finding(Category::Network, FindingStatus::Critical, "503 storm", Some(15)),
        ];

        let verdict = Judge::deterministic().synthesize(&findings).await.unwrap();
        assert_eq!(verdict.root_cause_category, Category::Network);
    }

    #[tokio::test]
    async fn offsets_derive_from_arrival_times_when_undeclared() {
        let base = chrono::Utc::now();
        let mut early = finding(Category::Code, FindingStatus::Critical, "parse error", None);
        early.evidence_at = Some(base);
        let mut late = finding(Category::Database, FindingStatus::Critical, "deadlock", None);
        late.evidence_at = Some(base + chrono::Duration::seconds(7));

        let verdict = Judge::deterministic()
            .synthesize(&[late, early])
            .await
            .unwrap();
        assert_eq!(verdict.root_cause_category, Category::Code);
    }

    #[tokio::test]
    async fn explanation_names_symptoms_and_exonerations() {
        let findings = vec![
            finding(Category::Code, FindingStatus::Critical, "JSONDecodeError in webhook", Some(0)),
            finding(Category::Database, FindingStatus::Warning, "connection pileup", Some(10)),
            finding(Category::Network, FindingStatus::Healthy, "latency nominal", Some(0)),
        ];

        let verdict = Judge::deterministic().synthesize(&findings).await.unwrap();
        assert!(verdict.causal_explanation.contains("T+0s"));
        assert!(verdict.causal_explanation.contains("T+10s"));
        assert!(verdict.causal_explanation.contains("ruled out"));
        assert!(verdict.remediation_plan.contains("JSONDecodeError"));
    }

    #[tokio::test]
    async fn selection_is_identical_across_runs() {
        let findings = vec![
            finding(Category::Network, FindingStatus::Critical, "504 surge", Some(3)),
            finding(Category::Database, FindingStatus::Critical, "deadlock", Some(1)),
            finding(Category::Code, FindingStatus::Healthy, "clean diff", Some(0)),
        ];

        let judge = Judge::deterministic();
        let first = judge.synthesize(&findings).await.unwrap();
        for _ in 0..10 {
            let again = judge.synthesize(&findings).await.unwrap();
            assert_eq!(again.root_cause_category, first.root_cause_category);
            assert_eq!(again.root_cause_headline, first.root_cause_headline);
        }
    }
}
