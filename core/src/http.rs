//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. `PodcastIndexClient` builds
//! `HttpRequest` values and parses `HttpResponse` values without touching the
//! network; whatever executes the round-trip implements `Transport`. Signing
//! requests with Podcast Index credentials is the transport's job, so the
//! core never sees an API key or secret.
//!
//! All fields use owned types (`String`, `Vec`) so values can be queued,
//! logged or replayed without lifetime concerns.

use crate::error::ApiError;

/// A GET request described as plain data.
///
/// Every Podcast Index query is a GET, so no method is carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Absolute URL including the query string.
    pub url: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Executes one `HttpRequest` and hands back the raw response.
///
/// Implementations return non-2xx responses as data and reserve `Err` for
/// failures where no response exists (DNS, connect, timeout, I/O), reported
/// as `ApiError::Transport`. They must not retry.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}
