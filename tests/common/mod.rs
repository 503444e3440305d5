#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing,
    dead_code
)]
//! Shared test utilities for long-polling transport integration tests.
//!
//! Provides a scripted [`MockHttpClient`] and helpers for waiting on requests
//! and events.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex as StdMutex, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use longpoll_transport::{
    HttpClient, HttpMethod, HttpRequest, HttpResponse, LongPollError, TransportEvent,
};
use tokio::sync::{mpsc, oneshot};

/// How long helpers wait before declaring a test hung.
pub const WAIT: Duration = Duration::from_secs(2);

// ── MockHttpClient ──────────────────────────────────────────────────

/// A scripted reply to one GET.
pub enum Scripted {
    /// Reply immediately.
    Respond(Result<HttpResponse, LongPollError>),
    /// Reply once the test sends on the paired [`oneshot::Sender`].
    Gated(oneshot::Receiver<Result<HttpResponse, LongPollError>>),
}

/// A mock HTTP client for integration testing.
///
/// GETs consume the scripted replies in order; once the script is exhausted a
/// GET hangs forever, the same as a server holding a poll open. POSTs and
/// DELETEs answer with [`MockHttpClient::set_other_status`] (200 by default).
/// Every request, from this client and from clones made by `with_timeout`, is
/// recorded in one shared log.
#[derive(Clone)]
pub struct MockHttpClient {
    gets: Arc<StdMutex<VecDeque<Scripted>>>,
    requests: Arc<StdMutex<Vec<HttpRequest>>>,
    other_status: Arc<AtomicU16>,
    timeouts: Arc<StdMutex<Vec<Duration>>>,
}

impl MockHttpClient {
    pub fn new(gets: Vec<Scripted>) -> Self {
        Self {
            gets: Arc::new(StdMutex::new(VecDeque::from(gets))),
            requests: Arc::new(StdMutex::new(Vec::new())),
            other_status: Arc::new(AtomicU16::new(200)),
            timeouts: Arc::new(StdMutex::new(Vec::new())),
        }
    }

    /// Status returned for every POST and DELETE.
    pub fn set_other_status(&self, status: u16) {
        self.other_status.store(status, Ordering::Relaxed);
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_with(&self, method: HttpMethod) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }

    pub fn get_count(&self) -> usize {
        self.requests_with(HttpMethod::Get).len()
    }

    /// Timeouts requested through `with_timeout`, in call order.
    pub fn timeouts(&self) -> Vec<Duration> {
        self.timeouts.lock().unwrap().clone()
    }

    /// Wait until at least `count` requests with `method` have been issued.
    pub async fn wait_for(&self, method: HttpMethod, count: usize) {
        tokio::time::timeout(WAIT, async {
            while self.requests_with(method).len() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {count} {method} request(s)"));
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LongPollError> {
        let method = request.method;
        self.requests.lock().unwrap().push(request);

        if method != HttpMethod::Get {
            return Ok(HttpResponse::new(
                self.other_status.load(Ordering::Relaxed),
                "",
            ));
        }

        let next = self.gets.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Respond(result)) => result,
            Some(Scripted::Gated(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(LongPollError::Http("gate dropped".into()))),
            // Script exhausted: behave like a server that never answers.
            None => std::future::pending().await,
        }
    }

    fn with_timeout(&self, timeout: Duration) -> Self {
        self.timeouts.lock().unwrap().push(timeout);
        self.clone()
    }
}

// ── Script helpers ──────────────────────────────────────────────────

pub fn ok(body: &str) -> Scripted {
    Scripted::Respond(Ok(HttpResponse::new(200, body)))
}

pub fn status(code: u16) -> Scripted {
    Scripted::Respond(Ok(HttpResponse::new(code, "")))
}

pub fn fail(error: LongPollError) -> Scripted {
    Scripted::Respond(Err(error))
}

pub fn gated() -> (
    Scripted,
    oneshot::Sender<Result<HttpResponse, LongPollError>>,
) {
    let (tx, rx) = oneshot::channel();
    (Scripted::Gated(rx), tx)
}

// ── Event helpers ───────────────────────────────────────────────────

/// Receive the next event, failing the test if none arrives in time.
pub async fn next_event(events: &mut mpsc::UnboundedReceiver<TransportEvent>) -> TransportEvent {
    tokio::time::timeout(WAIT, events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

/// Extract the cache-busting timestamp from a poll URL.
pub fn cache_buster(url: &str) -> u64 {
    let (_, millis) = url.rsplit_once("&_=").expect("poll URL has no cache buster");
    millis.parse().expect("cache buster is not a number")
}

/// Install a test tracing subscriber once per test binary.
pub fn init_tracing() {
    static ONCE: OnceLock<()> = OnceLock::new();
    ONCE.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}
