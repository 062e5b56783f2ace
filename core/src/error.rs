//! Error types for the Podcast Index client.
//!
//! # Design
//! `NotFound` is kept apart from every other failure so callers can branch on
//! "the service had no results" versus "the request failed". It carries the
//! `QueryKind` that produced it, and its message names that query.

use thiserror::Error;

use crate::query::QueryKind;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received (network failure, timeout).
    #[error("transport failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The service answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body did not match the expected envelope.
    #[error("deserialization failed: {0}")]
    DeserializationError(#[from] serde_json::Error),

    /// The service reported a false status for this query.
    #[error("{}", .0.not_found_message())]
    NotFound(QueryKind),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    pub fn transport(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        ApiError::Transport(err.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_the_query() {
        let err = ApiError::NotFound(QueryKind::SearchPodcasts);
        assert_eq!(err.to_string(), "could not find a podcast for that term");
        assert!(err.is_not_found());
    }

    #[test]
    fn http_error_shows_status_and_body() {
        let err = ApiError::HttpError {
            status: 401,
            body: "unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 401: unauthorized");
        assert!(!err.is_not_found());
    }

    #[test]
    fn transport_keeps_its_source() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let err = ApiError::transport(io);
        assert_eq!(err.to_string(), "transport failed: timed out");
        assert!(std::error::Error::source(&err).is_some());
    }
}
