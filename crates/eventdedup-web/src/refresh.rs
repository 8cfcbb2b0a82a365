//! Auto-refresh drivers for the statistics and events pages
//!
//! A driver fetches a payload, renders it and commits it to its page document. A
//! [`RecurringTask`] runs the driver immediately and then on every tick. Each tick
//! spawns its cycle without waiting for the previous one, so a hung request never
//! delays the next attempt. Cycles are numbered when they start, and the document
//! drops a render from a cycle older than the one it already shows.

use crate::components::{EventsView, StatsView, render_events, render_stats};
use crate::dom::{PageDocument, RenderOutcome, selectors};
use crate::source::DashboardSource;
use chrono::Local;
use eventdedup_core::{PageQuery, Result};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Default refresh interval
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(5000);

/// Nodes tagged when the statistics refresh starts, with the class each receives
const STATS_TAGS: &[(&str, &str)] = &[
    (selectors::REDIS_KEYS_COUNT, "redis-keys-count"),
    (selectors::POSTGRES_EVENTS_COUNT, "postgres-events-count"),
    (selectors::POSTGRES_SHARDS_COUNT, "postgres-shards-count"),
    (selectors::SHARDS_DISTRIBUTION, "shards-distribution"),
    (selectors::LAST_UPDATE_TIME, "last-update-time"),
];

/// Nodes tagged when the events refresh starts
const EVENTS_TAGS: &[(&str, &str)] = &[
    (selectors::TOTAL_EVENTS_COUNT, "total-events-count"),
    (selectors::EVENTS_TABLE_BODY, "events-table"),
    (selectors::MOBILE_EVENTS, "mobile-events"),
];

/// How one refresh cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// New content was committed
    Rendered,
    /// The fetch failed; the document was not touched
    Skipped,
    /// A newer cycle had already rendered
    Stale,
    /// Rendering failed; the document was not touched
    Failed,
}

/// A repeating background job with a cancellation handle.
///
/// The first run happens immediately. Dropping the handle cancels the task; in-flight
/// runs are aborted when the task stops.
#[derive(Debug)]
pub struct RecurringTask {
    name: &'static str,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl RecurringTask {
    /// Spawn `run` every `period`
    pub fn spawn<F, Fut>(name: &'static str, period: Duration, mut run: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut in_flight = JoinSet::new();

            info!(task = name, period_ms = period.as_millis(), "Recurring task started");

            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        in_flight.spawn(run());
                    }
                    Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                        if let Err(e) = joined
                            && e.is_panic()
                        {
                            error!(task = name, "Recurring task run panicked");
                        }
                    }
                }
            }

            in_flight.abort_all();
            info!(task = name, "Recurring task stopped");
        });

        Self {
            name,
            cancel,
            handle: Some(handle),
        }
    }

    /// Task name used in logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Stop scheduling new runs and abort the ones in flight
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether [`cancel`](Self::cancel) has been requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Whether the scheduling loop has exited
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Cancel and wait for the scheduling loop to exit
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
        {
            warn!(task = self.name, error = %e, "Recurring task ended abnormally");
        }
    }
}

impl Drop for RecurringTask {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Fetch-and-render driver for the statistics page
#[derive(Clone)]
pub struct StatsRefresh {
    source: Arc<dyn DashboardSource>,
    document: Arc<PageDocument>,
    next_cycle: Arc<AtomicU64>,
}

impl std::fmt::Debug for StatsRefresh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsRefresh")
            .field("next_cycle", &self.next_cycle)
            .finish_non_exhaustive()
    }
}

impl StatsRefresh {
    /// Create a driver rendering into `document`
    pub fn new(source: Arc<dyn DashboardSource>, document: Arc<PageDocument>) -> Self {
        Self {
            source,
            document,
            next_cycle: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Run one refresh cycle
    pub async fn run_cycle(&self) -> CycleOutcome {
        let cycle = self.next_cycle.fetch_add(1, Ordering::Relaxed);
        let Some(stats) = self.source.stats().await else {
            return CycleOutcome::Skipped;
        };

        let view = StatsView::from_payload(&stats, &Local);
        finish_cycle("stats", cycle, render_stats(&self.document, cycle, &view))
    }
}

/// Fetch-and-render driver for one page of the events list
#[derive(Clone)]
pub struct EventsRefresh {
    source: Arc<dyn DashboardSource>,
    document: Arc<PageDocument>,
    query: PageQuery,
    next_cycle: Arc<AtomicU64>,
}

impl std::fmt::Debug for EventsRefresh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventsRefresh")
            .field("query", &self.query)
            .field("next_cycle", &self.next_cycle)
            .finish_non_exhaustive()
    }
}

impl EventsRefresh {
    /// Create a driver for `query` rendering into `document`
    pub fn new(
        source: Arc<dyn DashboardSource>,
        document: Arc<PageDocument>,
        query: PageQuery,
    ) -> Self {
        Self {
            source,
            document,
            query,
            next_cycle: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Page this driver renders
    #[must_use]
    pub const fn query(&self) -> PageQuery {
        self.query
    }

    /// Run one refresh cycle
    pub async fn run_cycle(&self) -> CycleOutcome {
        let cycle = self.next_cycle.fetch_add(1, Ordering::Relaxed);
        let Some(events) = self.source.events(self.query).await else {
            return CycleOutcome::Skipped;
        };

        let view = EventsView::from_payload(&events, self.query);
        finish_cycle("events", cycle, render_events(&self.document, cycle, &view))
    }
}

fn finish_cycle(page: &str, cycle: u64, rendered: Result<RenderOutcome>) -> CycleOutcome {
    match rendered {
        Ok(RenderOutcome::Applied) => CycleOutcome::Rendered,
        Ok(RenderOutcome::Stale { latest }) => {
            debug!(page, cycle, latest, "Dropped render from a stale cycle");
            CycleOutcome::Stale
        }
        Err(e) => {
            error!(page, cycle, error = %e, "Render failed");
            CycleOutcome::Failed
        }
    }
}

fn tag_nodes(document: &PageDocument, tags: &[(&str, &str)]) -> Result<()> {
    for (selector, class) in tags {
        document.tag(selector, class)?;
    }
    Ok(())
}

/// Start refreshing the statistics page
///
/// # Errors
///
/// Returns [`eventdedup_core::Error::MissingNode`] if the document lacks one of the
/// statistics nodes; nothing is scheduled in that case.
pub fn start_stats_auto_refresh(
    source: Arc<dyn DashboardSource>,
    document: Arc<PageDocument>,
    period: Duration,
) -> Result<RecurringTask> {
    tag_nodes(&document, STATS_TAGS)?;

    let driver = StatsRefresh::new(source, document);
    Ok(RecurringTask::spawn("stats-refresh", period, move || {
        let driver = driver.clone();
        async move {
            driver.run_cycle().await;
        }
    }))
}

/// Start refreshing one page of the events list
///
/// # Errors
///
/// Returns [`eventdedup_core::Error::MissingNode`] if the document lacks the counter,
/// table body or card container; nothing is scheduled in that case.
pub fn start_events_auto_refresh(
    source: Arc<dyn DashboardSource>,
    document: Arc<PageDocument>,
    query: PageQuery,
    period: Duration,
) -> Result<RecurringTask> {
    tag_nodes(&document, EVENTS_TAGS)?;

    let driver = EventsRefresh::new(source, document, query);
    Ok(RecurringTask::spawn("events-refresh", period, move || {
        let driver = driver.clone();
        async move {
            driver.run_cycle().await;
        }
    }))
}
