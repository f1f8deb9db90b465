//! Clock abstraction
//!
//! The replay engine never touches wall-clock APIs directly so scenario
//! timing is testable with a manual clock.

use std::time::Duration;

/// Time source and sleep provider for replay scheduling
#[async_trait::async_trait]
pub trait Clock: Send + Sync {
    /// Current wall-clock time
    fn now(&self) -> chrono::DateTime<chrono::Utc>;

    /// Suspend the calling task for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Real clock backed by tokio timers
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[async_trait::async_trait]
impl Clock for SystemClock {
    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
