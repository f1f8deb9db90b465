//! Core incident types
//!
//! Defines the fault-signal taxonomy:
//! - Fault categories and their log channels
//! - Severity levels
//! - Immutable incident records

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique incident identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IncidentId(pub Ulid);

impl IncidentId {
    /// Generate new incident ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for IncidentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for IncidentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fault-signal category
///
/// Every incident belongs to exactly one category; the store's partition
/// over categories is a disjoint cover of the incident set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Network infrastructure (load balancers, gateways, DNS)
    Network,
    /// Database layer (locks, deadlocks, connection pools)
    Database,
    /// Application code (logic errors, recent diffs)
    Code,
}

impl Category {
    /// All categories in canonical dispatch order
    pub const ALL: [Category; 3] = [Category::Network, Category::Database, Category::Code];

    /// Log channel this category's specialist is allowed to read
    #[inline]
    #[must_use]
    pub fn log_channel(&self) -> &'static str {
        match self {
            Category::Network => "network",
            Category::Database => "db",
            Category::Code => "app_code_diff",
        }
    }

    /// Causal-precedence rank (higher outranks lower on exact offset ties)
    ///
    /// Code > Database > Network: an internal logic failure happens
    /// regardless of infrastructure health, so it wins ambiguous ties.
    #[inline]
    #[must_use]
    pub fn precedence(&self) -> u8 {
        match self {
            Category::Network => 0,
            Category::Database => 1,
            Category::Code => 2,
        }
    }

    /// Bucket index for the store partition
    #[inline]
    #[must_use]
    pub(crate) fn index(&self) -> usize {
        match self {
            Category::Network => 0,
            Category::Database => 1,
            Category::Code => 2,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Network => write!(f, "Network"),
            Category::Database => write!(f, "Database"),
            Category::Code => write!(f, "Code"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = crate::StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NETWORK" => Ok(Category::Network),
            "DATABASE" | "DB" => Ok(Category::Database),
            "CODE" => Ok(Category::Code),
            other => Err(crate::StoreError::Validation(format!(
                "unknown category: {other}"
            ))),
        }
    }
}

/// Incident severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Informational / healthy signal ("HEALTHY" in scenario data)
    #[serde(alias = "INFO", alias = "HEALTHY", alias = "Healthy")]
    Info,
    /// Degraded but serving
    #[serde(alias = "WARNING", alias = "WARN")]
    Warning,
    /// Actively failing
    #[serde(alias = "CRITICAL")]
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "Info"),
            Severity::Warning => write!(f, "Warning"),
            Severity::Critical => write!(f, "Critical"),
        }
    }
}

/// Log channel name -> raw log text
pub type LogBundle = IndexMap<String, String>;

/// An ingested fault signal
///
/// Immutable once created; removed only by an explicit clear operation.
/// Owned exclusively by the [`crate::IncidentStore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    /// Identity assigned at ingestion
    pub id: IncidentId,
    /// Category bucket
    pub category: Category,
    /// Alert that fired
    pub alert_name: String,
    /// Severity as reported
    pub severity: Severity,
    /// Log channel name -> text
    pub logs: LogBundle,
    /// Wall-clock arrival time
    pub received_at: chrono::DateTime<chrono::Utc>,
    /// Declared offset from the scenario trigger (T+k seconds)
    ///
    /// Tagged by the replay engine so temporal reasoning survives
    /// wall-clock arrival jitter. Absent for live webhook deliveries.
    pub trigger_offset_secs: Option<u64>,
}

impl Incident {
    /// Log text visible to this incident's own category specialist
    #[inline]
    #[must_use]
    pub fn own_channel(&self) -> Option<&str> {
        self.logs.get(self.category.log_channel()).map(String::as_str)
    }
}

/// Incident submission (identity and arrival time not yet assigned)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIncident {
    pub category: Category,
    pub alert_name: String,
    pub severity: Severity,
    #[serde(default)]
    pub logs: LogBundle,
    /// Arrival time override; the store stamps `Utc::now()` when absent
    #[serde(default)]
    pub received_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub trigger_offset_secs: Option<u64>,
}

impl NewIncident {
    /// Create new submission
    #[inline]
    #[must_use]
    pub fn new(category: Category, alert_name: impl Into<String>, severity: Severity) -> Self {
        Self {
            category,
            alert_name: alert_name.into(),
            severity,
            logs: LogBundle::new(),
            received_at: None,
            trigger_offset_secs: None,
        }
    }

    /// With a log channel entry
    #[inline]
    #[must_use]
    pub fn with_log(mut self, channel: impl Into<String>, text: impl Into<String>) -> Self {
        self.logs.insert(channel.into(), text.into());
        self
    }

    /// With a declared trigger offset (T+k seconds)
    #[inline]
    #[must_use]
    pub fn with_trigger_offset(mut self, secs: u64) -> Self {
        self.trigger_offset_secs = Some(secs);
        self
    }

    /// With explicit arrival time
    #[inline]
    #[must_use]
    pub fn with_received_at(mut self, at: chrono::DateTime<chrono::Utc>) -> Self {
        self.received_at = Some(at);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn incident_id_generation() {
        let id1 = IncidentId::new();
        let id2 = IncidentId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn category_precedence_ordering() {
        assert!(Category::Code.precedence() > Category::Database.precedence());
        assert!(Category::Database.precedence() > Category::Network.precedence());
    }

    #[test]
    fn category_log_channels() {
        assert_eq!(Category::Network.log_channel(), "network");
        assert_eq!(Category::Database.log_channel(), "db");
        assert_eq!(Category::Code.log_channel(), "app_code_diff");
    }

    #[test]
    fn category_from_str() {
        assert_eq!(Category::from_str("DATABASE").unwrap(), Category::Database);
        assert_eq!(Category::from_str("network").unwrap(), Category::Network);
        assert!(Category::from_str("filesystem").is_err());
    }

    #[test]
    fn severity_parses_scenario_aliases() {
        let sev: Severity = serde_json::from_str("\"CRITICAL\"").unwrap();
        assert_eq!(sev, Severity::Critical);
        let sev: Severity = serde_json::from_str("\"HEALTHY\"").unwrap();
        assert_eq!(sev, Severity::Info);
    }

    #[test]
    fn new_incident_builder() {
        let sub = NewIncident::new(Category::Code, "App-Exception-Log", Severity::Critical)
            .with_log("app_code_diff", "JSONDecodeError at line 1")
            .with_trigger_offset(0);

        assert_eq!(sub.category, Category::Code);
        assert_eq!(sub.trigger_offset_secs, Some(0));
        assert_eq!(sub.logs.len(), 1);
    }
}
