//! Statistics page: counters, shard distribution and last update time

use crate::dom::{PageDocument, RenderOutcome, selectors};
use crate::markup::html_escape;
use chrono::{DateTime, NaiveDateTime, TimeZone};
use eventdedup_core::{Result, StatsPayload};
use std::fmt;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// View model for the statistics page
#[derive(Debug, Clone, PartialEq)]
pub struct StatsView {
    /// Live deduplication keys
    pub redis_keys_count: u64,
    /// Stored events
    pub total_events: u64,
    /// Configured shards
    pub shard_count: u32,
    /// One bar per shard, in payload order
    pub shards: Vec<ShardBar>,
    /// Snapshot time, formatted for display
    pub updated_at: String,
}

/// One shard's share of the stored events
#[derive(Debug, Clone, PartialEq)]
pub struct ShardBar {
    /// Shard label as reported by the backend
    pub label: String,
    /// Events on this shard
    pub count: u64,
    /// Share of all events, 0..=100
    pub percentage: f64,
}

impl ShardBar {
    /// Display name from the second `_`-separated segment: `shard_3` becomes
    /// `Shard 3`, `shard_3_replica` also becomes `Shard 3`. Labels without a
    /// second segment are kept whole.
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.label.split('_').nth(1) {
            Some(index) if !index.is_empty() => format!("Shard {index}"),
            _ => self.label.clone(),
        }
    }
}

impl StatsView {
    /// Build the view model, formatting the timestamp in `tz`
    #[must_use]
    pub fn from_payload<Tz>(payload: &StatsPayload, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let total = payload.postgres.total_events;
        let shards = payload
            .postgres
            .shards
            .iter()
            .map(|(label, &count)| ShardBar {
                label: label.clone(),
                count,
                percentage: shard_percentage(count, total),
            })
            .collect();

        Self {
            redis_keys_count: payload.redis.dedup_keys_count,
            total_events: total,
            shard_count: payload.postgres.shard_count,
            shards,
            updated_at: format_timestamp(&payload.timestamp, tz),
        }
    }
}

/// `count / total * 100`, or 0 when there are no events
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn shard_percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Format a backend timestamp in `tz`.
///
/// Timestamps with an offset are converted from it; naive ones are UTC. Anything
/// unparseable is returned unchanged.
#[must_use]
pub fn format_timestamp<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string();
    }
    if let Ok(naive) = raw.parse::<NaiveDateTime>() {
        return naive
            .and_utc()
            .with_timezone(tz)
            .format(TIMESTAMP_FORMAT)
            .to_string();
    }
    raw.to_string()
}

/// Markup for `.shards-distribution`
#[must_use]
pub fn render_shards_distribution(shards: &[ShardBar]) -> String {
    let mut html = String::new();
    for shard in shards {
        let name = html_escape(&shard.display_name());
        let count = shard.count;
        let pct = format!("{:.2}", shard.percentage);
        html.push_str(&format!(
            concat!(
                r#"<div class="mb-3">"#,
                r#"<div class="d-flex justify-content-between align-items-center mb-1">"#,
                r#"<h6 class="mb-0">{name}</h6>"#,
                r#"<span class="badge bg-primary rounded-pill">{count} ({pct}%)</span>"#,
                r#"</div>"#,
                r#"<div class="progress" style="height: 10px;">"#,
                r#"<div class="progress-bar" role="progressbar" style="width: {pct}%" "#,
                r#"aria-valuenow="{pct}" aria-valuemin="0" aria-valuemax="100"></div>"#,
                r#"</div></div>"#,
            ),
            name = name,
            count = count,
            pct = pct,
        ));
    }
    html
}

/// Render the statistics view into `document` as part of `cycle`.
///
/// The three counters are mandatory; the distribution and timestamp nodes are
/// updated only when present.
///
/// # Errors
///
/// Returns [`eventdedup_core::Error::MissingNode`] when a counter node is absent;
/// the document is left unchanged.
pub fn render_stats(
    document: &PageDocument,
    cycle: u64,
    view: &StatsView,
) -> Result<RenderOutcome> {
    document.render(cycle, |pass| {
        pass.set_text(selectors::REDIS_KEYS_COUNT, view.redis_keys_count.to_string())?;
        pass.set_text(selectors::POSTGRES_EVENTS_COUNT, view.total_events.to_string())?;
        pass.set_text(selectors::POSTGRES_SHARDS_COUNT, view.shard_count.to_string())?;

        if pass.has(selectors::SHARDS_DISTRIBUTION) {
            pass.set_html(
                selectors::SHARDS_DISTRIBUTION,
                render_shards_distribution(&view.shards),
            )?;
        }
        if pass.has(selectors::LAST_UPDATE_TIME) {
            pass.set_text(selectors::LAST_UPDATE_TIME, view.updated_at.clone())?;
        }
        Ok(())
    })
}
