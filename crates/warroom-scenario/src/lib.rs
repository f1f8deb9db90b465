//! Chaos scenario catalog and replay engine
//!
//! Produces realistic cascading-failure streams for the RCA pipeline:
//! - Read-only scenario catalog (built-in library + JSON loading)
//! - Replay engine scheduling each payload independently against a
//!   captured T+0
//! - Injectable clock so tests run without wall-clock delays

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod clock;
pub mod replay;
pub mod scenario;

pub use clock::{Clock, SystemClock};
pub use replay::{ReplayEngine, ReplayReport};
pub use scenario::{builtin_catalog, Payload, Scenario, ScenarioCatalog, ScenarioError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
