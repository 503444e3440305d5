//! [`reqwest`]-backed implementation of [`HttpClient`].
//!
//! # Feature gate
//!
//! This module is only available when the `reqwest-client` feature is enabled
//! (it is enabled by default).

use std::time::Duration;

use async_trait::async_trait;

use crate::error::LongPollError;
use crate::http_client::{HttpClient, HttpMethod, HttpRequest, HttpResponse};

/// A [`reqwest`]-backed implementation of [`HttpClient`].
///
/// Clones share one connection pool. [`with_timeout`](HttpClient::with_timeout)
/// keeps the pool and only changes the per-request timeout, so the poll
/// client and the send client reuse the same connections.
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttpClient {
    inner: reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestHttpClient {
    /// Create a client with reqwest's default settings and no timeout.
    ///
    /// # Panics
    ///
    /// Panics if the TLS backend cannot be initialized, like
    /// [`reqwest::Client::new`]. The same applies to [`Default`]. Use
    /// [`try_new`](Self::try_new) to get an error instead.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client with reqwest's default settings, reporting a failed
    /// TLS backend initialization as [`LongPollError::Http`].
    pub fn try_new() -> Result<Self, LongPollError> {
        let inner = reqwest::Client::builder().build().map_err(map_error)?;
        Ok(Self::from_client(inner))
    }

    /// Wrap an existing [`reqwest::Client`] (custom TLS, proxies, default
    /// headers).
    #[must_use]
    pub fn from_client(inner: reqwest::Client) -> Self {
        Self {
            inner,
            timeout: None,
        }
    }

    /// The per-request timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

fn map_error(e: reqwest::Error) -> LongPollError {
    if e.is_timeout() {
        LongPollError::Timeout
    } else {
        LongPollError::Http(e.to_string())
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LongPollError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.inner.request(method, request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_error)?;

        tracing::trace!(method = %request.method, url = %request.url, status, "HTTP request completed");

        Ok(HttpResponse { status, body })
    }

    fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            inner: self.inner.clone(),
            timeout: Some(timeout),
        }
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
    use crate::http_client::Headers;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;

    #[test]
    fn reqwest_client_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ReqwestHttpClient>();
    }

    #[test]
    fn try_new_builds_a_client() {
        let client = ReqwestHttpClient::try_new().expect("TLS backend initializes");
        assert_eq!(client.timeout(), None);
    }

    #[test]
    fn with_timeout_keeps_original_untouched() {
        let client = ReqwestHttpClient::new();
        let polling = client.with_timeout(Duration::from_secs(100));
        assert_eq!(client.timeout(), None);
        assert_eq!(polling.timeout(), Some(Duration::from_secs(100)));
    }

    // ── Mock-server helpers ──────────────────────────────────────────────

    /// Read one HTTP/1.1 request (head plus `Content-Length` body).
    async fn read_request(tcp: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = tcp.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let content_length = text[..head_end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + content_length {
                    break;
                }
            }
        }
        String::from_utf8(buf).unwrap()
    }

    /// Start a local server that answers a single request with `response`.
    /// Returns the base URL and a receiver for the raw request text.
    async fn start_mock_server(response: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (request_tx, request_rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut tcp, _) = listener.accept().await.unwrap();
            let request = read_request(&mut tcp).await;
            let _ = request_tx.send(request);
            tcp.write_all(response.as_bytes()).await.unwrap();
            let _ = tcp.shutdown().await;
        });

        (format!("http://{addr}"), request_rx)
    }

    // ── Mock-server tests ────────────────────────────────────────────────

    #[tokio::test]
    async fn get_returns_status_body_and_sends_headers() {
        let (base, request_rx) = start_mock_server(
            "HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nhello",
        )
        .await;

        let mut headers = Headers::new();
        headers.insert("X-Client".into(), "longpoll".into());

        let url = format!("{base}/chat?id=1&_=42");
        let response = ReqwestHttpClient::new().get(&url, &headers).await.unwrap();

        assert_eq!(response, HttpResponse::new(200, "hello"));

        let request = request_rx.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /chat?id=1&_=42 http/1.1"));
        assert!(request.contains("x-client: longpoll"));
    }

    #[tokio::test]
    async fn post_sends_body() {
        let (base, request_rx) = start_mock_server(
            "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;

        let url = format!("{base}/chat?id=1");
        let response = ReqwestHttpClient::new()
            .post(&url, "ping payload".into(), &Headers::new())
            .await
            .unwrap();
        assert!(response.is_success());

        let request = request_rx.await.unwrap();
        assert!(request.starts_with("POST /chat?id=1 HTTP/1.1"));
        assert!(request.ends_with("ping payload"));
    }

    #[tokio::test]
    async fn delete_uses_delete_method() {
        let (base, request_rx) = start_mock_server(
            "HTTP/1.1 202 Accepted\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        )
        .await;

        let url = format!("{base}/chat?id=1");
        let response = ReqwestHttpClient::new()
            .delete(&url, &Headers::new())
            .await
            .unwrap();
        assert_eq!(response.status, 202);

        let request = request_rx.await.unwrap();
        assert!(request.starts_with("DELETE /chat?id=1 HTTP/1.1"));
    }

    #[tokio::test]
    async fn no_content_yields_empty_body() {
        let (base, _request_rx) =
            start_mock_server("HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n").await;

        let response = ReqwestHttpClient::new()
            .get(&format!("{base}/chat?id=1&_=1"), &Headers::new())
            .await
            .unwrap();
        assert_eq!(response, HttpResponse::new(204, ""));
    }

    #[tokio::test]
    async fn connection_refused_maps_to_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = ReqwestHttpClient::new()
            .get(&format!("http://{addr}/chat?id=1&_=1"), &Headers::new())
            .await
            .unwrap_err();
        assert!(matches!(err, LongPollError::Http(_)));
    }

    #[tokio::test]
    async fn slow_server_maps_to_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            // Hold the connection open without answering.
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(tcp);
        });

        let client = ReqwestHttpClient::new().with_timeout(Duration::from_millis(50));
        let err = client
            .get(&format!("http://{addr}/chat?id=1&_=1"), &Headers::new())
            .await
            .unwrap_err();
        assert_eq!(err, LongPollError::Timeout);
    }
}
