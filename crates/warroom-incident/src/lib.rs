//! War Room incident model and store
//!
//! The foundation of the RCA pipeline:
//! - Category/severity taxonomy for fault signals
//! - Immutable incident records with T+k offset tagging
//! - Category-partitioned store with isolation by construction
//!
//! # Example
//!
//! ```rust
//! use warroom_incident::{Category, IncidentStore, NewIncident, Severity};
//!
//! let store = IncidentStore::new();
//! let id = store.ingest(
//!     NewIncident::new(Category::Database, "DB-Deadlock-Critical", Severity::Critical)
//!         .with_log("db", "ERROR 1213: Deadlock found"),
//! )?;
//!
//! assert_eq!(store.evidence_for(Category::Database).len(), 1);
//! assert!(store.evidence_for(Category::Network).is_empty());
//! # Ok::<(), warroom_incident::StoreError>(())
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod error;
pub mod store;
pub mod types;

pub use error::StoreError;
pub use store::{IncidentSnapshot, IncidentStore};
pub use types::{Category, Incident, IncidentId, LogBundle, NewIncident, Severity};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
