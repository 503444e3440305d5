//! HTTP client abstraction used by the long-polling transport.
//!
//! The transport never talks to the network directly. It builds
//! [`HttpRequest`]s and hands them to an [`HttpClient`], which owns the
//! mechanics (TLS, connection pooling, timeouts). Two clients are derived from
//! the one passed in: the ordinary client for sends and stops, and a variant
//! produced by [`HttpClient::with_timeout`] for the long-blocking polls.
//!
//! # Implementing a Custom Client
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use async_trait::async_trait;
//! use longpoll_transport::error::LongPollError;
//! use longpoll_transport::http_client::{HttpClient, HttpRequest, HttpResponse};
//!
//! #[derive(Clone)]
//! struct MyClient { /* ... */ }
//!
//! #[async_trait]
//! impl HttpClient for MyClient {
//!     async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LongPollError> {
//!         // Perform the request and collect status + body
//!         todo!()
//!     }
//!
//!     fn with_timeout(&self, timeout: Duration) -> Self {
//!         // Return a copy whose requests give up after `timeout`
//!         todo!()
//!     }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::LongPollError;

/// Header name → value pairs attached to a request.
pub type Headers = BTreeMap<String, String>;

/// The HTTP methods the transport issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// Poll and first-connect requests.
    Get,
    /// Outbound messages.
    Post,
    /// Session release on stop.
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        })
    }
}

/// A single outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request method.
    pub method: HttpMethod,
    /// Absolute request URL.
    pub url: String,
    /// Headers to attach.
    pub headers: Headers,
    /// Request body, if any.
    pub body: Option<String>,
}

impl HttpRequest {
    /// Create a request with no headers and no body.
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    /// Add all of `headers` to the request, overwriting duplicates.
    #[must_use]
    pub fn with_headers(mut self, headers: &Headers) -> Self {
        self.headers
            .extend(headers.iter().map(|(k, v)| (k.clone(), v.clone())));
        self
    }

    /// Set the request body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A minimal HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub status: u16,
    /// The response body decoded as text. Empty when the server sent none.
    pub body: String,
}

impl HttpResponse {
    /// Create a response with the given status and body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for any `2xx` status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A minimal async HTTP client.
///
/// Implementations only need [`send`](HttpClient::send) and
/// [`with_timeout`](HttpClient::with_timeout); the per-method helpers are
/// provided.
///
/// Network-level failures (refused connection, DNS, reset) must be reported as
/// `Err`, never as a synthetic status code. A request that exceeds the client's
/// timeout should fail with [`LongPollError::Timeout`].
#[async_trait]
pub trait HttpClient: Send + Sync + 'static {
    /// Perform `request` and return the response.
    ///
    /// # Errors
    ///
    /// Returns [`LongPollError::Http`] or [`LongPollError::Timeout`] when no
    /// response was received.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LongPollError>;

    /// Return a client that shares this one's configuration but uses `timeout`
    /// for every request.
    fn with_timeout(&self, timeout: Duration) -> Self
    where
        Self: Sized;

    /// Issue a `GET` to `url` with `headers`.
    ///
    /// # Errors
    ///
    /// See [`send`](HttpClient::send).
    async fn get(&self, url: &str, headers: &Headers) -> Result<HttpResponse, LongPollError> {
        self.send(HttpRequest::new(HttpMethod::Get, url).with_headers(headers))
            .await
    }

    /// Issue a `POST` of `body` to `url` with `headers`.
    ///
    /// # Errors
    ///
    /// See [`send`](HttpClient::send).
    async fn post(
        &self,
        url: &str,
        body: String,
        headers: &Headers,
    ) -> Result<HttpResponse, LongPollError> {
        self.send(
            HttpRequest::new(HttpMethod::Post, url)
                .with_headers(headers)
                .with_body(body),
        )
        .await
    }

    /// Issue a `DELETE` to `url` with `headers`.
    ///
    /// # Errors
    ///
    /// See [`send`](HttpClient::send).
    async fn delete(&self, url: &str, headers: &Headers) -> Result<HttpResponse, LongPollError> {
        self.send(HttpRequest::new(HttpMethod::Delete, url).with_headers(headers))
            .await
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;

    #[test]
    fn success_covers_the_2xx_range() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(199, "").is_success());
        assert!(!HttpResponse::new(302, "").is_success());
        assert!(!HttpResponse::new(503, "").is_success());
    }

    #[test]
    fn with_headers_overwrites_existing_values() {
        let mut first = Headers::new();
        first.insert("Authorization".into(), "Bearer old".into());
        let mut second = Headers::new();
        second.insert("Authorization".into(), "Bearer new".into());
        second.insert("X-Requested-With".into(), "longpoll".into());

        let request = HttpRequest::new(HttpMethod::Get, "http://x/chat")
            .with_headers(&first)
            .with_headers(&second);

        assert_eq!(request.headers.len(), 2);
        assert_eq!(request.headers["Authorization"], "Bearer new");
        assert!(request.body.is_none());
    }

    #[test]
    fn method_display_matches_wire_names() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Post.to_string(), "POST");
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }
}
