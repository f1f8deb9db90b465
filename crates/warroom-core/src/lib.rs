//! War Room RCA core
//!
//! The pipeline that turns a stream of fault signals into a root-cause
//! verdict:
//! - Blind specialist agents, one per fault category
//! - Concurrent dispatch with bounded parallelism, timeout, and retry
//! - Judge synthesis: first-mover rule + causal-precedence tie-breaking
//! - The troubleshoot pipeline tying store, replay, dispatch, and judge
//!   together behind the external boundaries
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use warroom_core::{DispatchScope, WarRoom, WarRoomConfig};
//! use warroom_oracle::{HttpOracle, HttpOracleConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let oracle = Arc::new(HttpOracle::new(HttpOracleConfig::from_env()?)?);
//! let warroom = WarRoom::new(oracle, WarRoomConfig::default());
//!
//! warroom.run_scenario("Classic DB Deadlock").await?;
//! let report = warroom.troubleshoot(DispatchScope::OnlyActive).await;
//! if let Some(verdict) = report.verdict {
//!     println!("Root cause: {}", verdict.root_cause_headline);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod dispatcher;
pub mod error;
pub mod finding;
pub mod judge;
pub mod specialist;
pub mod warroom;

pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use error::{JudgeError, WarRoomError};
pub use finding::{DispatchScope, FindingStatus, SpecialistFinding, Verdict};
pub use judge::Judge;
pub use specialist::SpecialistAgent;
pub use warroom::{
    AlertEnvelope, ScenarioRunReport, TroubleshootReport, WarRoom, WarRoomConfig,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the War Room core
    pub use crate::{
        DispatchScope, Dispatcher, DispatcherConfig, FindingStatus, Judge, SpecialistFinding,
        Verdict, WarRoom, WarRoomConfig,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
