//! Error types for the eventdedup dashboard

use std::{error::Error as StdError, fmt};

/// Main error type for the dashboard
#[derive(Debug)]
pub enum Error {
    /// The request never produced a response (connect, DNS, reset, timeout)
    Http {
        /// Requested URL
        url: String,
        /// Transport error message
        message: String,
    },

    /// The backend answered with a non-success status
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The response body was not the expected JSON
    Decode {
        /// Requested URL
        url: String,
        /// Parser error message
        message: String,
    },

    /// A mandatory document node is absent
    MissingNode {
        /// Selector of the missing node
        selector: String,
    },

    /// Configuration error
    Configuration {
        /// Error message
        message: String,
    },

    /// Validation error
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// Other error
    Other(String),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error belongs to the "refresh cycle failed" family
    /// (network failure, non-success status, malformed body).
    #[must_use]
    pub const fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::Status { .. } | Self::Decode { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http { url, message } => write!(f, "Request to {url} failed: {message}"),
            Self::Status { url, status } => write!(f, "HTTP error! status: {status} ({url})"),
            Self::Decode { url, message } => {
                write!(f, "Malformed response from {url}: {message}")
            }
            Self::MissingNode { selector } => write!(f, "Document node not found: {selector}"),
            Self::Configuration { message } => write!(f, "Configuration error: {message}"),
            Self::Validation { field, message } => {
                write!(f, "Validation error: {field} - {message}")
            }
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl StdError for Error {}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Self::Configuration {
            message: err.to_string(),
        }
    }
}
