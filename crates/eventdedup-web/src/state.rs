//! Application state management

use crate::api_client::ApiClient;
use crate::dom::PageDocument;
use crate::refresh::{RecurringTask, start_events_auto_refresh, start_stats_auto_refresh};
use crate::templates::PageTemplates;
use eventdedup_core::{Config, Error, PageQuery, Result};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Application state shared by the handlers and refresh drivers
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Config,
    /// API client for backend communication
    pub api_client: Arc<ApiClient>,
    /// Continuously refreshed statistics page
    pub stats_document: Arc<PageDocument>,
    /// Continuously refreshed first page of the events list
    pub events_document: Arc<PageDocument>,
    /// Page the events document shows
    pub default_query: PageQuery,
    /// Compiled page templates
    pub templates: Arc<PageTemplates>,
}

impl AppState {
    /// Create new application state
    ///
    /// # Errors
    ///
    /// Returns an error if the configured page size is zero, the HTTP client cannot
    /// be built or a page template does not parse.
    pub fn new(config: Config) -> Result<Self> {
        let api_client = ApiClient::from_config(&config.dashboard)?;
        let limit =
            NonZeroU32::new(config.dashboard.default_limit).ok_or_else(|| Error::Validation {
                field: "dashboard.default_limit".to_string(),
                message: "must be greater than zero".to_string(),
            })?;

        Ok(Self {
            config,
            api_client: Arc::new(api_client),
            stats_document: Arc::new(PageDocument::stats_page()),
            events_document: Arc::new(PageDocument::events_page()),
            default_query: PageQuery::new(limit, 0),
            templates: Arc::new(PageTemplates::new()?),
        })
    }

    /// Start the auto-refresh drivers for both pages
    ///
    /// # Errors
    ///
    /// Returns an error if a page document lacks a node its driver needs.
    pub fn start_refresh(&self) -> Result<Vec<RecurringTask>> {
        let period = self.config.dashboard.refresh_interval();
        let stats = start_stats_auto_refresh(
            self.api_client.clone(),
            self.stats_document.clone(),
            period,
        )?;
        let events = start_events_auto_refresh(
            self.api_client.clone(),
            self.events_document.clone(),
            self.default_query,
            period,
        )?;
        Ok(vec![stats, events])
    }
}
