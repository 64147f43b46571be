//! Error types for the todo API client.
//!
//! # Design
//! Every non-2xx response lands in `Http` with only the status code; the body
//! of a failed response is never parsed. A missing resource is simply
//! `Http { status: 404 }`, and `is_not_found` lets callers branch on it.
//! Failures below HTTP (no response at all) are `Transport`.

use thiserror::Error;

/// Errors returned by the todo API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a status outside 200..=299.
    #[error("HTTP error! status: {status}")]
    Http { status: u16 },

    /// No response was received (connection refused, reset, DNS, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be deserialized into the expected type.
    #[error("failed to decode response body: {0}")]
    Decode(String),

    /// The request payload could not be serialized to JSON.
    #[error("failed to encode request body: {0}")]
    Encode(String),
}

impl ApiError {
    /// The HTTP status carried by this error, if the server responded.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// Errors raised while building a [`ClientConfig`](crate::ClientConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported scheme {scheme:?} in base URL (expected http or https)")]
    UnsupportedScheme { scheme: String },
}
