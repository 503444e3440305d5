//! # Custom HTTP Client Example
//!
//! Shows how to implement the [`HttpClient`] trait with an in-process fake
//! server and drive a [`LongPollingTransport`] through a short session. This
//! is useful for:
//!
//! - **Testing** — exercise message handling without a real server
//! - **Custom backends** — adapt any HTTP stack (hyper, a browser fetch shim)
//!
//! ## Running
//!
//! ```sh
//! cargo run --example custom_http_client
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use longpoll_transport::{
    HttpClient, HttpMethod, HttpRequest, HttpResponse, LongPollConfig, LongPollError,
    LongPollingTransport, TransportEvent,
};

// ─────────────────────────────────────────────────────────────────────
// Step 1: Define an in-process "server"
// ─────────────────────────────────────────────────────────────────────

/// A fake server that answers polls from a queue of pending messages.
///
/// Each poll takes one message (`200`). When the queue is empty the server
/// ends the stream (`204`). POSTs are echoed back into the queue.
#[derive(Clone, Default)]
pub struct FakeServer {
    outbox: Arc<Mutex<VecDeque<String>>>,
    timeout: Option<Duration>,
}

// ─────────────────────────────────────────────────────────────────────
// Step 2: Implement the HttpClient trait
// ─────────────────────────────────────────────────────────────────────

#[async_trait]
impl HttpClient for FakeServer {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LongPollError> {
        tracing::info!(method = %request.method, url = %request.url, timeout = ?self.timeout, "request");

        let mut outbox = self
            .outbox
            .lock()
            .map_err(|e| LongPollError::Http(e.to_string()))?;

        match request.method {
            HttpMethod::Get => Ok(match outbox.pop_front() {
                Some(message) => HttpResponse::new(200, message),
                None => HttpResponse::new(204, ""),
            }),
            HttpMethod::Post => {
                if let Some(body) = request.body {
                    outbox.push_back(format!("echo: {body}"));
                }
                Ok(HttpResponse::new(200, ""))
            }
            HttpMethod::Delete => Ok(HttpResponse::new(202, "")),
        }
    }

    fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            outbox: Arc::clone(&self.outbox),
            timeout: Some(timeout),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Step 3: Wire the transport to the fake server
// ─────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for readable output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let server = FakeServer::default();
    {
        let mut outbox = server
            .outbox
            .lock()
            .map_err(|e| format!("outbox poisoned: {e}"))?;
        // Consumed by the connectivity probe in `start`.
        outbox.push_back(String::new());
        outbox.push_back("welcome".into());
    }

    let config = LongPollConfig::new().with_header("X-Demo", "custom-http-client");
    let (transport, mut events) = LongPollingTransport::new(server, config);

    transport.start("http://fake/chat?id=demo").await?;
    transport.send("hello".into()).await?;

    // ── Read events until the server ends the stream ────────────────
    let mut received = 0;
    while let Some(event) = events.recv().await {
        match event {
            TransportEvent::Received(payload) => {
                received += 1;
                tracing::info!("Event: Received — {payload}");
            }
            TransportEvent::Closed { error } => {
                tracing::info!(
                    "Event: Closed — {}",
                    error.map_or_else(|| "graceful".to_string(), |e| e.to_string())
                );
                break;
            }
        }
    }

    // Already closed by the server; stop is still safe to call.
    transport.stop().await;
    tracing::info!("Done — received {received} message(s).");
    Ok(())
}
