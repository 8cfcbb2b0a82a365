//! Request handlers

pub mod api;
pub mod pages;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::fmt;

use crate::markup::html_escape;

/// Error page returned by the UI handlers
#[derive(Debug)]
pub struct PageError {
    /// Message shown on the page
    pub message: String,
    /// HTTP status code
    pub status: StatusCode,
}

impl PageError {
    /// Create a new page error
    pub fn new(message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    /// Invalid query parameters
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::BAD_REQUEST)
    }

    /// Unknown resource, or the UI is switched off
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::NOT_FOUND)
    }

    /// The backend could not be reached or answered badly
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::BAD_GATEWAY)
    }

    /// The page could not be rendered
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(message, StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)
    }
}

impl std::error::Error for PageError {}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let body = format!(
            "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"UTF-8\"><title>{status}</title></head>\
             <body><h1>{status}</h1><p>{message}</p></body></html>",
            status = self.status,
            message = html_escape(&self.message),
        );
        (self.status, Html(body)).into_response()
    }
}
