//! Category-partitioned incident store
//!
//! The only mutable shared resource in the pipeline:
//! - Ingestion serialized per category bucket (writers never interleave)
//! - Snapshot reads hold a bucket lock only for the copy
//! - Isolation invariant enforced by construction: evidence lookups for
//!   category C can only ever return category-C incidents

use crate::error::StoreError;
use crate::types::{Category, Incident, IncidentId, NewIncident};
use indexmap::IndexMap;
use parking_lot::Mutex;

/// Snapshot of active incidents grouped by category
///
/// Insertion order preserved per category; all three categories are always
/// present (possibly empty).
pub type IncidentSnapshot = IndexMap<Category, Vec<Incident>>;

/// Active incident set, keyed by category
///
/// Each category has its own lock so concurrent ingests into different
/// categories never contend, and concurrent ingests into the same category
/// serialize without losing writes.
#[derive(Debug, Default)]
pub struct IncidentStore {
    buckets: [Mutex<Vec<Incident>>; 3],
}

impl IncidentStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest a fault signal
    ///
    /// Assigns identity and arrival time, buckets by category.
    ///
    /// # Errors
    /// `StoreError::Validation` if the alert name is empty. Nothing is
    /// stored on rejection.
    pub fn ingest(&self, submission: NewIncident) -> Result<IncidentId, StoreError> {
        if submission.alert_name.trim().is_empty() {
            return Err(StoreError::Validation("empty alert name".to_string()));
        }

        let incident = Incident {
            id: IncidentId::new(),
            category: submission.category,
            alert_name: submission.alert_name,
            severity: submission.severity,
            logs: submission.logs,
            received_at: submission.received_at.unwrap_or_else(chrono::Utc::now),
            trigger_offset_secs: submission.trigger_offset_secs,
        };
        let id = incident.id;

        let mut bucket = self.buckets[submission.category.index()].lock();
        bucket.push(incident);
        drop(bucket);

        tracing::debug!(%id, category = %submission.category, "incident ingested");
        Ok(id)
    }

    /// Snapshot of active incidents grouped by category
    ///
    /// Insertion order preserved per category. Each bucket lock is held
    /// only for the duration of the copy.
    #[must_use]
    pub fn active_by_category(&self) -> IncidentSnapshot {
        let mut snapshot = IncidentSnapshot::new();
        for category in Category::ALL {
            snapshot.insert(category, self.buckets[category.index()].lock().clone());
        }
        snapshot
    }

    /// Evidence bundle for one category
    ///
    /// Returns only incidents whose category equals `category`: the
    /// isolation invariant lives here, not in the caller.
    #[must_use]
    pub fn evidence_for(&self, category: Category) -> Vec<Incident> {
        self.buckets[category.index()].lock().clone()
    }

    /// Categories that currently have active incidents, in canonical order
    #[must_use]
    pub fn active_categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| !self.buckets[c.index()].lock().is_empty())
            .collect()
    }

    /// Clear all active incidents, returning the number removed
    ///
    /// Idempotent: clearing an empty store returns 0.
    pub fn clear_all(&self) -> usize {
        let mut cleared = 0;
        for category in Category::ALL {
            cleared += self.clear_category(category);
        }
        if cleared > 0 {
            tracing::info!(count = cleared, "cleared all active incidents");
        }
        cleared
    }

    /// Clear one category, returning the number removed
    ///
    /// Idempotent: clearing an empty category returns 0 and leaves the
    /// other categories untouched.
    pub fn clear_category(&self, category: Category) -> usize {
        let mut bucket = self.buckets[category.index()].lock();
        let cleared = bucket.len();
        bucket.clear();
        cleared
    }

    /// Per-category active incident counts, in canonical order
    #[must_use]
    pub fn counts(&self) -> IndexMap<Category, usize> {
        Category::ALL
            .into_iter()
            .map(|c| (c, self.buckets[c.index()].lock().len()))
            .collect()
    }

    /// Total active incidents across all categories
    #[must_use]
    pub fn total_active(&self) -> usize {
        Category::ALL
            .into_iter()
            .map(|c| self.buckets[c.index()].lock().len())
            .sum()
    }
}
