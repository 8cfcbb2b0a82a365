//! Web server setup and configuration

use crate::{routes::build_routes, state::AppState};
use axum::Router;
use std::sync::Arc;

/// Build the complete web application with all routes and state
pub fn build_app(state: Arc<AppState>) -> Router {
    build_routes().with_state(state)
}
