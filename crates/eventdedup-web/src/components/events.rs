//! Events page: total counter, desktop table, mobile cards and pagination

use crate::components::pagination::{Pagination, render_pagination};
use crate::dom::{PageDocument, RenderOutcome, selectors};
use crate::markup::{event_detail_href, html_escape, navigate_onclick};
use eventdedup_core::types::value_text;
use eventdedup_core::{EventListPayload, EventRecord, PageQuery, Result};

/// Characters of the hash shown on a card
const SHORT_HASH_LEN: usize = 8;

const EMPTY_ROW: &str = concat!(
    r#"<tr><td colspan="7" class="text-center py-5">"#,
    r#"<div class="d-flex flex-column align-items-center">"#,
    r#"<i class="bi bi-inbox text-muted" style="font-size: 3rem;"></i>"#,
    r#"<p class="mt-3 mb-0">No data</p>"#,
    r#"</div></td></tr>"#,
);

const EMPTY_CARD: &str = concat!(
    r#"<div class="card mb-3"><div class="card-body text-center py-5">"#,
    r#"<i class="bi bi-inbox text-muted" style="font-size: 3rem;"></i>"#,
    r#"<p class="mt-3 mb-0">No data</p>"#,
    r#"</div></div>"#,
);

/// View model for the events page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventsView {
    /// Total stored events
    pub total: u64,
    /// One entry per event on this page
    pub rows: Vec<EventRow>,
    /// Page controls for the driver's `limit`/`offset`
    pub pagination: Pagination,
}

/// Display text for one event, shared by its table row and card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRow {
    /// Storage identifier
    pub id: String,
    /// Client identifier
    pub client_id: String,
    /// Event type
    pub event_name: String,
    /// Product identifier
    pub product_id: String,
    /// Event time
    pub event_datetime: String,
    /// Full deduplication hash
    pub event_hash: String,
    /// Detail view link
    pub href: String,
}

impl EventRow {
    /// Build the row for one record
    #[must_use]
    pub fn from_record(record: &EventRecord) -> Self {
        Self {
            id: value_text(&record.id),
            client_id: value_text(&record.client_id),
            event_name: value_text(&record.event_name),
            product_id: value_text(&record.product_id),
            event_datetime: value_text(&record.event_datetime),
            event_hash: record.event_hash.clone(),
            href: event_detail_href(&record.event_hash),
        }
    }

    /// First characters of the hash followed by an ellipsis
    #[must_use]
    pub fn short_hash(&self) -> String {
        let prefix: String = self.event_hash.chars().take(SHORT_HASH_LEN).collect();
        format!("{prefix}...")
    }
}

impl EventsView {
    /// Build the view model for one page of events
    #[must_use]
    pub fn from_payload(payload: &EventListPayload, query: PageQuery) -> Self {
        Self {
            total: payload.total,
            rows: payload.data.iter().map(EventRow::from_record).collect(),
            pagination: Pagination::new(payload.total, query.limit, query.offset),
        }
    }
}

/// Markup for `.events-table tbody`
#[must_use]
pub fn render_table_body(rows: &[EventRow]) -> String {
    if rows.is_empty() {
        return EMPTY_ROW.to_string();
    }

    let mut html = String::new();
    for row in rows {
        let href = html_escape(&row.href);
        html.push_str(&format!(
            concat!(
                r#"<tr class="event-row" onclick="{onclick}">"#,
                r#"<td><span class="fw-bold">{id}</span></td>"#,
                r#"<td>{client_id}</td>"#,
                r#"<td><span class="badge bg-info text-dark">{event_name}</span></td>"#,
                r#"<td>{product_id}</td>"#,
                r#"<td>{event_datetime}</td>"#,
                r#"<td><span class="badge bg-secondary text-truncate" style="max-width: 120px;">{event_hash}</span></td>"#,
                r#"<td><a href="{href}" class="btn btn-sm btn-primary">Details</a></td>"#,
                r#"</tr>"#,
            ),
            onclick = navigate_onclick(&row.href),
            id = html_escape(&row.id),
            client_id = html_escape(&row.client_id),
            event_name = html_escape(&row.event_name),
            product_id = html_escape(&row.product_id),
            event_datetime = html_escape(&row.event_datetime),
            event_hash = html_escape(&row.event_hash),
            href = href,
        ));
    }
    html
}

/// Markup for `.mobile-events`
#[must_use]
pub fn render_mobile_cards(rows: &[EventRow]) -> String {
    if rows.is_empty() {
        return EMPTY_CARD.to_string();
    }

    let mut html = String::new();
    for row in rows {
        html.push_str(&format!(
            concat!(
                r#"<div class="card mb-3 event-card" onclick="{onclick}"><div class="card-body">"#,
                r#"<div class="d-flex justify-content-between align-items-center mb-2">"#,
                r#"<h6 class="card-title mb-0">ID: {id}</h6>"#,
                r#"<span class="badge bg-success"><i class="bi bi-check-circle me-1"></i>Unique</span>"#,
                r#"</div>"#,
                r#"<p class="card-text mb-1"><small class="text-muted">Event:</small> <span class="badge bg-info text-dark">{event_name}</span></p>"#,
                r#"<p class="card-text mb-1"><small class="text-muted">Client:</small> {client_id}</p>"#,
                r#"<p class="card-text mb-1"><small class="text-muted">Product:</small> {product_id}</p>"#,
                r#"<p class="card-text mb-1"><small class="text-muted">Date:</small> {event_datetime}</p>"#,
                r#"<p class="card-text mb-0"><small class="text-muted">Hash:</small> <span class="badge bg-secondary">{short_hash}</span></p>"#,
                r#"</div></div>"#,
            ),
            onclick = navigate_onclick(&row.href),
            id = html_escape(&row.id),
            event_name = html_escape(&row.event_name),
            client_id = html_escape(&row.client_id),
            product_id = html_escape(&row.product_id),
            event_datetime = html_escape(&row.event_datetime),
            short_hash = html_escape(&row.short_hash()),
        ));
    }
    html
}

/// Render the events view into `document` as part of `cycle`.
///
/// The total counter is mandatory; table, cards and pagination are updated only
/// when present. Pagination is always rendered last.
///
/// # Errors
///
/// Returns [`eventdedup_core::Error::MissingNode`] when the counter node is absent;
/// the document is left unchanged.
pub fn render_events(
    document: &PageDocument,
    cycle: u64,
    view: &EventsView,
) -> Result<RenderOutcome> {
    document.render(cycle, |pass| {
        pass.set_text(selectors::TOTAL_EVENTS_COUNT, view.total.to_string())?;

        if pass.has(selectors::EVENTS_TABLE_BODY) {
            pass.set_html(selectors::EVENTS_TABLE_BODY, render_table_body(&view.rows))?;
        }
        if pass.has(selectors::MOBILE_EVENTS) {
            pass.set_html(selectors::MOBILE_EVENTS, render_mobile_cards(&view.rows))?;
        }
        if pass.has(selectors::PAGINATION) {
            pass.set_html(selectors::PAGINATION, render_pagination(&view.pagination))?;
        }
        Ok(())
    })
}

/// Body of the event detail page
#[must_use]
pub fn render_event_detail(record: &EventRecord) -> String {
    let row = EventRow::from_record(record);
    let mut html = String::from(r#"<dl class="row event-detail">"#);

    let mut field = |name: &str, value: &str| {
        html.push_str(&format!(
            r#"<dt class="col-sm-3">{}</dt><dd class="col-sm-9">{}</dd>"#,
            html_escape(name),
            html_escape(value)
        ));
    };
    field("ID", &row.id);
    field("Client", &row.client_id);
    field("Event", &row.event_name);
    field("Product", &row.product_id);
    field("Date", &row.event_datetime);
    field("Hash", &row.event_hash);
    for (name, value) in &record.extra {
        if name != "full_event" {
            field(name, &value_text(value));
        }
    }
    html.push_str("</dl>");

    let full_event = serde_json::to_string_pretty(&record.full_event()).unwrap_or_default();
    html.push_str(&format!(
        r#"<pre class="full-event"><code>{}</code></pre>"#,
        html_escape(&full_event)
    ));
    html
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::num::NonZeroU32;

    fn query(limit: u32, offset: u64) -> PageQuery {
        PageQuery::new(NonZeroU32::new(limit).unwrap(), offset)
    }

    fn sample_payload() -> EventListPayload {
        serde_json::from_value(json!({
            "total": 95,
            "limit": 20,
            "offset": 40,
            "data": [
                {
                    "id": 41,
                    "client_id": "client-a",
                    "event_name": "play",
                    "product_id": "film-1",
                    "event_datetime": "2024-05-01 10:00:00",
                    "event_hash": "0123456789abcdef"
                },
                {
                    "id": 42,
                    "client_id": "<script>alert(1)</script>",
                    "event_name": "pause",
                    "product_id": "film-2",
                    "event_datetime": "2024-05-01 10:00:05",
                    "event_hash": "fedcba9876543210"
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_view_uses_driver_context_for_pagination() {
        let view = EventsView::from_payload(&sample_payload(), query(20, 40));

        assert_eq!(view.total, 95);
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.pagination.current_page, 3);
        assert_eq!(view.pagination.page_count, 5);
        assert_eq!(view.rows[0].href, "/api/ui/database?event_hash=0123456789abcdef");
        assert_eq!(view.rows[0].short_hash(), "01234567...");
    }

    #[test]
    fn test_table_rows_escape_opaque_fields() {
        let view = EventsView::from_payload(&sample_payload(), query(20, 40));
        let html = render_table_body(&view.rows);

        assert_eq!(html.matches("<tr class=\"event-row\"").count(), 2);
        assert_eq!(html.matches("<td>").count(), 2 * 7);
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains(r#"onclick="window.location=&#x27;/api/ui/database?event_hash=0123456789abcdef&#x27;""#));
        assert!(html.contains(r#"<a href="/api/ui/database?event_hash=fedcba9876543210" class="btn btn-sm btn-primary">Details</a>"#));
    }

    #[test]
    fn test_cards_mirror_rows() {
        let view = EventsView::from_payload(&sample_payload(), query(20, 40));
        let html = render_mobile_cards(&view.rows);

        assert_eq!(html.matches("event-card").count(), 2);
        assert!(html.contains("ID: 41"));
        assert!(html.contains(r#"<span class="badge bg-secondary">fedcba98...</span>"#));
    }

    #[test]
    fn test_empty_list_renders_single_placeholders() {
        let payload = EventListPayload {
            data: Vec::new(),
            total: 0,
            limit: None,
            offset: None,
        };
        let document = PageDocument::events_page();
        let view = EventsView::from_payload(&payload, query(50, 0));

        render_events(&document, 0, &view).unwrap();

        let table = document.html(selectors::EVENTS_TABLE_BODY).unwrap();
        let cards = document.html(selectors::MOBILE_EVENTS).unwrap();
        assert_eq!(table.matches("<tr>").count(), 1);
        assert_eq!(table.matches("<tr").count(), 1);
        assert!(table.contains(r#"colspan="7""#));
        assert_eq!(cards.matches(r#"<div class="card mb-3">"#).count(), 1);
        assert!(!cards.contains("event-card"));
        assert_eq!(document.html(selectors::TOTAL_EVENTS_COUNT).as_deref(), Some("0"));
    }

    #[test]
    fn test_render_events_fills_every_node() {
        let document = PageDocument::events_page();
        let view = EventsView::from_payload(&sample_payload(), query(20, 40));

        render_events(&document, 1, &view).unwrap();

        assert_eq!(document.html(selectors::TOTAL_EVENTS_COUNT).as_deref(), Some("95"));
        let pagination = document.html(selectors::PAGINATION).unwrap();
        assert!(pagination.contains(r#"<li class="page-item active"><a class="page-link" href="/api/ui/database?limit=20&amp;offset=40">3</a></li>"#));
    }

    #[test]
    fn test_optional_nodes_tolerated_counter_is_not() {
        let view = EventsView::from_payload(&sample_payload(), query(20, 40));

        let document = PageDocument::with_nodes(&[selectors::TOTAL_EVENTS_COUNT]);
        assert_eq!(render_events(&document, 0, &view).unwrap(), RenderOutcome::Applied);

        let document = PageDocument::events_page();
        document.unmount(selectors::TOTAL_EVENTS_COUNT);
        assert!(render_events(&document, 0, &view).is_err());
        assert_eq!(document.html(selectors::PAGINATION).as_deref(), Some(""));
    }

    #[test]
    fn test_event_detail_lists_fields_and_body() {
        let record: EventRecord = serde_json::from_value(json!({
            "id": 7,
            "client_id": "c",
            "event_name": "play",
            "product_id": "p",
            "event_datetime": "2024-05-01",
            "event_hash": "h1",
            "created_at": "2024-05-01T10:00:00",
            "full_event": "{\"sid\": \"s<1>\"}"
        }))
        .unwrap();

        let html = render_event_detail(&record);

        assert!(html.contains(r#"<dt class="col-sm-3">Hash</dt><dd class="col-sm-9">h1</dd>"#));
        assert!(html.contains(r#"<dt class="col-sm-3">created_at</dt>"#));
        assert!(!html.contains(">full_event<"));
        assert!(html.contains("&quot;sid&quot;: &quot;s&lt;1&gt;&quot;"));
    }
}
