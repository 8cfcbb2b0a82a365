//! Page handlers serving the rendered documents

use crate::components::render_event_detail;
use crate::dom::PageDocument;
use crate::handlers::PageError;
use crate::refresh::{CycleOutcome, EventsRefresh};
use crate::state::AppState;
use crate::templates::{EVENTS_PAGE, STATS_PAGE};
use axum::{
    extract::{Query, State},
    response::Html,
};
use eventdedup_core::{Error, PageQuery};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{error, warn};
use validator::Validate;

/// Largest offset the backend can store as a signed 64-bit integer
pub const MAX_OFFSET: u64 = i64::MAX.unsigned_abs();

const UI_DISABLED: &str = "Database UI is disabled. Set dashboard.enable_ui to enable it.";

/// Query parameters of the database page
#[derive(Debug, Default, Deserialize, Validate)]
pub struct DatabaseQuery {
    /// Events per page
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u32>,

    /// Events to skip
    #[validate(range(max = MAX_OFFSET))]
    pub offset: Option<u64>,

    /// Show a single event instead of the list
    #[validate(length(min = 1, max = 256))]
    pub event_hash: Option<String>,
}

impl DatabaseQuery {
    /// Page to show, falling back to `default` for missing values
    #[must_use]
    pub fn page_query(&self, default: PageQuery) -> PageQuery {
        let limit = self
            .limit
            .and_then(NonZeroU32::new)
            .unwrap_or(default.limit);
        PageQuery::new(limit, self.offset.unwrap_or(default.offset))
    }
}

fn ensure_ui_enabled(state: &AppState) -> Result<(), PageError> {
    if state.config.dashboard.enable_ui {
        Ok(())
    } else {
        Err(PageError::not_found(UI_DISABLED))
    }
}

/// Statistics page
pub async fn stats_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, PageError> {
    ensure_ui_enabled(&state)?;

    state
        .templates
        .render_page(
            STATS_PAGE,
            &state.stats_document.snapshot(),
            state.config.dashboard.refresh_interval(),
        )
        .map(Html)
        .map_err(render_failed)
}

/// Events list, or a single event when `event_hash` is given
pub async fn database_page(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DatabaseQuery>,
) -> Result<Html<String>, PageError> {
    ensure_ui_enabled(&state)?;

    if let Err(validation_errors) = params.validate() {
        warn!(errors = %validation_errors, "Rejected database page query");
        return Err(PageError::bad_request(format!(
            "Invalid query parameters: {validation_errors}"
        )));
    }

    if let Some(event_hash) = params.event_hash.as_deref() {
        return event_detail(&state, event_hash).await;
    }

    let query = params.page_query(state.default_query);
    let snapshot = if query == state.default_query {
        state.events_document.snapshot()
    } else {
        let document = Arc::new(PageDocument::events_page());
        let driver = EventsRefresh::new(state.api_client.clone(), document.clone(), query);
        match driver.run_cycle().await {
            CycleOutcome::Rendered => document.snapshot(),
            outcome => {
                return Err(PageError::bad_gateway(format!(
                    "Could not load events page ({outcome:?})"
                )));
            }
        }
    };

    state
        .templates
        .render_page(
            EVENTS_PAGE,
            &snapshot,
            state.config.dashboard.refresh_interval(),
        )
        .map(Html)
        .map_err(render_failed)
}

async fn event_detail(state: &AppState, event_hash: &str) -> Result<Html<String>, PageError> {
    match state.api_client.get_event_detail(event_hash).await {
        Ok(record) => state
            .templates
            .render_detail_page(&render_event_detail(&record))
            .map(Html)
            .map_err(render_failed),
        Err(Error::Status { status: 404, .. }) => Err(PageError::not_found(format!(
            "No event with hash {event_hash}"
        ))),
        Err(e) => {
            error!(error = %e, event_hash, "Failed to fetch event detail");
            Err(PageError::bad_gateway("Could not load event detail"))
        }
    }
}

fn render_failed(e: Error) -> PageError {
    error!(error = %e, "Failed to render page");
    PageError::internal("Could not render page")
}
