//! Auto-refreshing dashboard for the event deduplication service
//!
//! Refresh drivers poll the backend API and render statistics and event pages into
//! in-memory documents; an axum server serves those documents as HTML.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod api_client;
pub mod components;
pub mod dom;
pub mod handlers;
pub mod markup;
pub mod refresh;
pub mod routes;
pub mod server;
pub mod source;
pub mod state;
pub mod templates;

// Re-export the main entry points
pub use api_client::ApiClient;
pub use dom::PageDocument;
pub use refresh::{RecurringTask, start_events_auto_refresh, start_stats_auto_refresh};
pub use server::build_app;
pub use source::DashboardSource;
pub use state::AppState;
