//! Data source seam for the refresh drivers

use async_trait::async_trait;
use eventdedup_core::{EventListPayload, PageQuery, StatsPayload};

/// Where refresh cycles get their payloads from.
///
/// `None` means the fetch failed and has already been logged; the cycle is skipped.
#[async_trait]
pub trait DashboardSource: Send + Sync {
    /// Current service statistics
    async fn stats(&self) -> Option<StatsPayload>;

    /// One page of stored events
    async fn events(&self, query: PageQuery) -> Option<EventListPayload>;
}
