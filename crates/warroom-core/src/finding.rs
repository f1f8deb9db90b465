//! Specialist findings and verdicts
//!
//! The two result types flowing out of the pipeline, plus the dispatch
//! scope selector.

use serde::{Deserialize, Serialize};
use warroom_incident::Category;

/// Which categories a dispatch round covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchScope {
    /// Only categories with active incidents
    OnlyActive,
    /// Every category, with a placeholder context where none are active
    AllCategories,
}

/// Severity status a specialist assigns to its own domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingStatus {
    /// Domain is actively failing
    Critical,
    /// Domain is degraded
    Warning,
    /// Domain is exonerated
    Healthy,
    /// Specialist call failed; domain state unknown
    Unknown,
}

impl std::fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FindingStatus::Critical => write!(f, "Critical"),
            FindingStatus::Warning => write!(f, "Warning"),
            FindingStatus::Healthy => write!(f, "Healthy"),
            FindingStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One specialist's independent analysis of its category
///
/// Produced once per dispatch round per in-scope category; immutable;
/// consumed by the judge. Evidence citations come only from incidents of
/// the finding's own category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialistFinding {
    /// Agent that produced the finding (e.g. "DBA", "Network Engineer")
    pub agent_name: String,
    /// Category the agent is blind-scoped to
    pub category: Category,
    /// Domain status
    pub status: FindingStatus,
    /// One-sentence problem summary
    pub hypothesis: String,
    /// Confidence in the hypothesis, clamped to [0, 1]
    pub confidence: f64,
    /// Quotes from the logs supporting the hypothesis
    pub evidence: Vec<String>,
    /// Detailed analysis trail
    pub reasoning: String,
    /// When the finding was produced
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Earliest declared T+k offset among the incidents analyzed
    pub evidence_offset_secs: Option<u64>,
    /// Earliest arrival time among the incidents analyzed
    pub evidence_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl SpecialistFinding {
    /// Whether this finding can be a root-cause candidate
    #[inline]
    #[must_use]
    pub fn is_actionable(&self) -> bool {
        matches!(self.status, FindingStatus::Critical | FindingStatus::Warning)
    }
}

/// The judge's single root-cause determination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// One-sentence summary of the primary failure
    pub root_cause_headline: String,
    /// Category hosting the trigger
    pub root_cause_category: Category,
    /// Trigger -> mechanism -> symptom chain, citing T+k offsets
    pub causal_explanation: String,
    /// Remediation scoped to the specific mechanism in the chosen hypothesis
    pub remediation_plan: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(status: FindingStatus) -> SpecialistFinding {
        SpecialistFinding {
            agent_name: "DBA".to_string(),
            category: Category::Database,
            status,
            hypothesis: "deadlock on users table".to_string(),
            confidence: 0.9,
            evidence: vec!["ERROR 1213".to_string()],
            reasoning: "deadlock error in transaction log".to_string(),
            timestamp: chrono::Utc::now(),
            evidence_offset_secs: Some(1),
            evidence_at: None,
        }
    }

    #[test]
    fn actionable_statuses() {
        assert!(finding(FindingStatus::Critical).is_actionable());
        assert!(finding(FindingStatus::Warning).is_actionable());
        assert!(!finding(FindingStatus::Healthy).is_actionable());
        assert!(!finding(FindingStatus::Unknown).is_actionable());
    }

    #[test]
    fn finding_serializes_round_trip() {
        let original = finding(FindingStatus::Critical);
        let json = serde_json::to_string(&original).unwrap();
        let parsed: SpecialistFinding = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.category, Category::Database);
        assert_eq!(parsed.evidence_offset_secs, Some(1));
    }
}
