//! Route definitions for the web interface

use crate::{
    handlers::{api, pages},
    markup::DATABASE_UI_PATH,
    state::AppState,
};
use axum::{Router, routing::get};
use std::sync::Arc;

/// Statistics page path
pub const STATS_UI_PATH: &str = "/api/ui/stats";

/// Build the complete web application router
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Page routes
        .route("/", get(pages::stats_page))
        .route(STATS_UI_PATH, get(pages::stats_page))
        .route(DATABASE_UI_PATH, get(pages::database_page))
        // Health check
        .route("/health", get(api::health_check))
}
