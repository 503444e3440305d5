//! Long-polling transport over a request/response HTTP client.
//!
//! [`LongPollingTransport`] is a handle shared between the caller and a
//! background poll task. The task issues one blocking `GET` at a time and
//! forwards every `200 OK` payload as a [`TransportEvent::Received`] on an
//! unbounded channel returned from [`LongPollingTransport::new`]. The channel
//! ends with exactly one [`TransportEvent::Closed`].
//!
//! # Wire format
//!
//! | Operation     | Request                                   |
//! |---------------|-------------------------------------------|
//! | connect, poll | `GET <url>&_=<epoch millis>` + headers    |
//! | send          | `POST <url>` + headers, message as body   |
//! | stop          | `DELETE <url>` + headers                  |
//!
//! A poll answered with `200` carries a message, `204` ends the stream
//! gracefully, and anything else (including a failed request) is fatal.
//!
//! # Example
//!
//! ```rust,ignore
//! let config = LongPollConfig::new().with_header("Authorization", "Bearer t0k3n");
//! let (transport, mut events) = LongPollingTransport::new(ReqwestHttpClient::new(), config);
//!
//! transport.start("https://example.com/chat?id=abc").await?;
//! transport.send("hello".to_string()).await?;
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         TransportEvent::Received(payload) => { /* … */ }
//!         TransportEvent::Closed { error } => break,
//!     }
//! }
//! ```

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex as StdMutex, OnceLock, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::error::{LongPollError, Result};
use crate::event::TransportEvent;
use crate::http_client::{Headers, HttpClient};
use crate::transport::Transport;

/// Default timeout for poll requests. Servers hold a poll open until data is
/// available, so this is far longer than an ordinary request timeout.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(100);

// ── Configuration ───────────────────────────────────────────────────

/// Configuration for a [`LongPollingTransport`].
///
/// All fields have defaults, so `LongPollConfig::default()` is a working
/// configuration.
///
/// # Example
///
/// ```
/// use longpoll_transport::LongPollConfig;
/// use std::time::Duration;
///
/// let config = LongPollConfig::new()
///     .with_header("Authorization", "Bearer t0k3n")
///     .with_poll_timeout(Duration::from_secs(30))
///     .with_request_timeout(Duration::from_secs(5));
/// assert_eq!(config.headers.len(), 1);
/// ```
///
/// # Loading
///
/// The type is `serde`-compatible. Durations are written in milliseconds:
///
/// ```text
/// poll_timeout_ms = 100000
/// request_timeout_ms = 5000
///
/// [headers]
/// Authorization = "Bearer t0k3n"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LongPollConfig {
    /// Headers attached to every poll, send and stop request.
    pub headers: Headers,
    /// Timeout applied to poll requests.
    ///
    /// Defaults to **100 seconds**.
    #[serde(rename = "poll_timeout_ms", with = "duration_millis")]
    pub poll_timeout: Duration,
    /// Timeout applied to send and stop requests.
    ///
    /// Defaults to `None`, which keeps whatever timeout the supplied
    /// [`HttpClient`] already has.
    #[serde(rename = "request_timeout_ms", with = "option_duration_millis")]
    pub request_timeout: Option<Duration>,
}

impl LongPollConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the timeout for poll requests.
    #[must_use]
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    /// Set the timeout for send and stop requests.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

impl Default for LongPollConfig {
    fn default() -> Self {
        Self {
            headers: Headers::new(),
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            request_timeout: None,
        }
    }
}

fn millis(duration: &Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        duration: &Duration,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(super::millis(duration))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

mod option_duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(
        duration: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match duration {
            Some(duration) => serializer.serialize_some(&super::millis(duration)),
            None => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(deserializer).map(|ms| ms.map(Duration::from_millis))
    }
}

// ── Lifecycle state ─────────────────────────────────────────────────

/// Lifecycle of a [`LongPollingTransport`].
///
/// Transitions only move forward: `Idle → Active → Terminated`, or straight
/// from `Idle` to `Terminated` when the transport is stopped before starting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TransportState {
    /// Created, `start` not yet called.
    Idle = 0,
    /// Polling.
    Active = 1,
    /// Stopped, ended by the server, or failed.
    Terminated = 2,
}

impl TransportState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Active,
            _ => Self::Terminated,
        }
    }
}

/// State shared between the transport handle and the poll task.
struct Shared {
    state: AtomicU8,
    /// Taken when `Closed` is emitted, so nothing can follow it.
    events: StdMutex<Option<mpsc::UnboundedSender<TransportEvent>>>,
    last_poll_url: StdMutex<Option<String>>,
}

impl Shared {
    fn new(events: mpsc::UnboundedSender<TransportEvent>) -> Self {
        Self {
            state: AtomicU8::new(TransportState::Idle as u8),
            events: StdMutex::new(Some(events)),
            last_poll_url: StdMutex::new(None),
        }
    }

    fn state(&self) -> TransportState {
        TransportState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn is_active(&self) -> bool {
        self.state() == TransportState::Active
    }

    /// `Idle → Active`. Fails with the current state otherwise.
    fn activate(&self) -> Result<()> {
        self.state
            .compare_exchange(
                TransportState::Idle as u8,
                TransportState::Active as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(|current| LongPollError::InvalidState {
                state: TransportState::from_u8(current),
            })
    }

    /// Move to `Terminated`, returning the previous state.
    fn deactivate(&self) -> TransportState {
        TransportState::from_u8(
            self.state
                .swap(TransportState::Terminated as u8, Ordering::AcqRel),
        )
    }

    /// Deactivate and emit `Closed` (if nobody has yet).
    fn terminate(&self, error: Option<LongPollError>) {
        self.deactivate();
        self.emit_closed(error);
    }

    fn next_poll_url(&self, base_url: &str) -> String {
        let url = poll_url(base_url, epoch_millis());
        *self
            .last_poll_url
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(url.clone());
        url
    }

    fn last_poll_url(&self) -> Option<String> {
        self.last_poll_url
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn emit_received(&self, payload: String) {
        let guard = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(tx) => {
                if tx.send(TransportEvent::Received(payload)).is_err() {
                    debug!("event channel closed, receiver dropped");
                }
            }
            None => debug!("transport already closed, dropping received payload"),
        }
    }

    /// Emit `Closed` and drop the sender. Returns `false` if it was already emitted.
    fn emit_closed(&self, error: Option<LongPollError>) -> bool {
        let sender = self
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(tx) = sender else {
            return false;
        };
        if tx.send(TransportEvent::Closed { error }).is_err() {
            debug!("event channel closed, receiver dropped");
        }
        true
    }
}

/// Build the URL for one poll: the base URL plus a cache-busting timestamp.
///
/// The parameter is appended with `&` unconditionally; the base URL is expected
/// to already carry a query string (typically the connection id).
pub fn poll_url(base_url: &str, epoch_millis: u64) -> String {
    format!("{base_url}&_={epoch_millis}")
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| millis(&elapsed))
        .unwrap_or(0)
}

// ── Transport handle ────────────────────────────────────────────────

/// A long-polling [`Transport`].
///
/// Created via [`LongPollingTransport::new`], which returns the handle
/// together with the event receiver. Polling begins on
/// [`start`](LongPollingTransport::start) and runs on a spawned tokio task
/// until the server ends the stream, a poll fails, or
/// [`stop`](LongPollingTransport::stop) is called.
///
/// All methods take `&self`; wrap the handle in an `Arc` to call `send` and
/// `stop` from several tasks.
pub struct LongPollingTransport<C: HttpClient> {
    /// Client for send and stop requests.
    client: Arc<C>,
    /// Client for poll requests, configured with the poll timeout.
    poll_client: Arc<C>,
    headers: Arc<Headers>,
    base_url: OnceLock<String>,
    shared: Arc<Shared>,
    /// Set by the first `stop` call.
    stop_requested: AtomicBool,
    task: OnceLock<JoinHandle<()>>,
}

impl<C: HttpClient> LongPollingTransport<C> {
    /// Create an idle transport and its event receiver.
    ///
    /// `client` is used as-is for sends and stops (or re-timed with
    /// [`LongPollConfig::request_timeout`] if set); a copy re-timed with
    /// [`LongPollConfig::poll_timeout`] is used for polls.
    #[must_use = "the event receiver must be used to receive events"]
    pub fn new(
        client: C,
        config: LongPollConfig,
    ) -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel::<TransportEvent>();

        let poll_client = client.with_timeout(config.poll_timeout);
        let client = match config.request_timeout {
            Some(timeout) => client.with_timeout(timeout),
            None => client,
        };

        let transport = Self {
            client: Arc::new(client),
            poll_client: Arc::new(poll_client),
            headers: Arc::new(config.headers),
            base_url: OnceLock::new(),
            shared: Arc::new(Shared::new(event_tx)),
            stop_requested: AtomicBool::new(false),
            task: OnceLock::new(),
        };

        (transport, event_rx)
    }

    /// Issue the first poll and, if the server answers `200`, launch the poll
    /// loop in the background.
    ///
    /// The body of the first response is not delivered.
    ///
    /// # Errors
    ///
    /// - [`LongPollError::InvalidUrl`] if `url` is empty.
    /// - [`LongPollError::InvalidState`] if the transport is not idle.
    /// - [`LongPollError::ConnectionFailed`] if the first poll returned
    ///   anything but `200`.
    /// - The client's error if the first poll could not be performed.
    pub async fn start(&self, url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(LongPollError::InvalidUrl(url.to_owned()));
        }
        self.shared.activate()?;
        info!(url = %url, "starting long-polling transport");

        let base_url = url.to_owned();
        // Only the successful `activate` above reaches this point.
        let _ = self.base_url.set(base_url.clone());

        let first_url = self.shared.next_poll_url(&base_url);
        debug!(url = %first_url, "polling");

        let response = match self.poll_client.get(&first_url, &self.headers).await {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "initial poll failed");
                self.shared.deactivate();
                return Err(e);
            }
        };

        if response.status != 200 {
            error!(status = response.status, "unexpected response code");
            self.shared.deactivate();
            return Err(LongPollError::ConnectionFailed {
                status: response.status,
            });
        }

        if !self.shared.is_active() {
            debug!("transport stopped during the initial poll; not starting the poll loop");
            return Ok(());
        }

        info!("activating poll loop");
        let task = tokio::spawn(poll_loop(
            Arc::clone(&self.poll_client),
            base_url,
            Arc::clone(&self.headers),
            Arc::clone(&self.shared),
        ));
        let _ = self.task.set(task);

        Ok(())
    }

    /// POST `message` to the endpoint.
    ///
    /// Independent of the poll loop: it may be called while a poll is in
    /// flight, and even after [`stop`](Self::stop).
    ///
    /// # Errors
    ///
    /// - [`LongPollError::NotStarted`] if [`start`](Self::start) was never called.
    /// - [`LongPollError::UnexpectedStatus`] if the server did not answer `2xx`.
    /// - The client's error if the request could not be performed.
    pub async fn send(&self, message: String) -> Result<()> {
        let url = self.base_url.get().ok_or(LongPollError::NotStarted)?;
        let response = self.client.post(url, message, &self.headers).await?;
        if response.is_success() {
            Ok(())
        } else {
            warn!(status = response.status, "send rejected by server");
            Err(LongPollError::UnexpectedStatus {
                status: response.status,
            })
        }
    }

    /// Stop polling and emit [`TransportEvent::Closed`].
    ///
    /// A poll already in flight is not cancelled; its result is discarded when
    /// it completes. The first call also issues a best-effort `DELETE` to the
    /// endpoint without waiting for it. Further calls do nothing.
    pub async fn stop(&self) {
        let previous = self.shared.deactivate();

        if self.stop_requested.swap(true, Ordering::AcqRel) {
            debug!("stop already requested");
            return;
        }
        info!(?previous, "long-polling transport stopped");

        if let Some(url) = self.base_url.get() {
            let client = Arc::clone(&self.client);
            let headers = Arc::clone(&self.headers);
            let url = url.clone();
            tokio::spawn(async move {
                match client.delete(&url, &headers).await {
                    Ok(response) => {
                        debug!(status = response.status, "session release acknowledged");
                    }
                    Err(e) => warn!(error = %e, "session release request failed"),
                }
            });
        }

        self.shared.emit_closed(None);
    }

    // ── State accessors ─────────────────────────────────────────────

    /// Current lifecycle state.
    pub fn state(&self) -> TransportState {
        self.shared.state()
    }

    /// Returns `true` while polling.
    pub fn is_active(&self) -> bool {
        self.shared.is_active()
    }

    /// The endpoint passed to [`start`](Self::start), if it has been called.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.get().map(String::as_str)
    }

    /// The URL of the most recent poll request.
    pub fn last_poll_url(&self) -> Option<String> {
        self.shared.last_poll_url()
    }
}

impl<C: HttpClient> std::fmt::Debug for LongPollingTransport<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LongPollingTransport")
            .field("state", &self.state())
            .field("base_url", &self.base_url())
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("has_task", &self.task.get().is_some())
            .finish()
    }
}

impl<C: HttpClient> Drop for LongPollingTransport<C> {
    fn drop(&mut self) {
        // No executor is available here, so the poll task (and any request it
        // is blocked on) is aborted rather than left to finish. Consumers still
        // see the stream end with `Closed`.
        self.shared.deactivate();
        if let Some(task) = self.task.get() {
            task.abort();
        }
        self.shared.emit_closed(None);
    }
}

#[async_trait]
impl<C: HttpClient> Transport for LongPollingTransport<C> {
    async fn start(&self, url: &str) -> Result<()> {
        LongPollingTransport::start(self, url).await
    }

    async fn send(&self, message: String) -> Result<()> {
        LongPollingTransport::send(self, message).await
    }

    async fn stop(&self) {
        LongPollingTransport::stop(self).await;
    }

    fn state(&self) -> TransportState {
        LongPollingTransport::state(self)
    }
}

// ── Poll loop ───────────────────────────────────────────────────────

/// Background poll loop. One request is in flight at a time.
///
/// Exits when:
/// - The transport is no longer active (checked before each poll and again
///   once its response arrives)
/// - The server answers `204 No Content`
/// - The server answers anything other than `200`/`204`, or the request fails
async fn poll_loop<C: HttpClient>(
    client: Arc<C>,
    base_url: String,
    headers: Arc<Headers>,
    shared: Arc<Shared>,
) {
    debug!("poll loop started");

    while shared.is_active() {
        let url = shared.next_poll_url(&base_url);
        debug!(url = %url, "polling");

        let result = client.get(&url, &headers).await;

        if !shared.is_active() {
            debug!("transport stopped while a poll was in flight; discarding its result");
            break;
        }

        match result {
            Ok(response) if response.status == 200 => {
                debug!(len = response.body.len(), "message received");
                shared.emit_received(response.body);
            }
            Ok(response) if response.status == 204 => {
                info!("long-polling transport terminated by server");
                shared.terminate(None);
                break;
            }
            Ok(response) => {
                error!(status = response.status, "unexpected response code");
                shared.terminate(Some(LongPollError::UnexpectedStatus {
                    status: response.status,
                }));
                break;
            }
            Err(e) => {
                error!(error = %e, "poll request failed");
                shared.terminate(Some(e));
                break;
            }
        }
    }

    debug!("poll loop exited");
}

// ── Tests ───────────────────────────────────────────────────────────

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
    use crate::http_client::{HttpMethod, HttpRequest, HttpResponse};
    use std::collections::VecDeque;

    // ── Mock client ─────────────────────────────────────────────────

    /// Replays scripted GET responses and records every request.
    /// Non-GET requests get `200`. Once the script runs out, GETs hang forever.
    #[derive(Clone)]
    struct MockClient {
        gets: Arc<StdMutex<VecDeque<Result<HttpResponse>>>>,
        requests: Arc<StdMutex<Vec<HttpRequest>>>,
        timeout: Option<Duration>,
    }

    impl MockClient {
        fn new(gets: Vec<Result<HttpResponse>>) -> Self {
            Self {
                gets: Arc::new(StdMutex::new(VecDeque::from(gets))),
                requests: Arc::new(StdMutex::new(Vec::new())),
                timeout: None,
            }
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl HttpClient for MockClient {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
            let method = request.method;
            self.requests.lock().unwrap().push(request);
            if method != HttpMethod::Get {
                return Ok(HttpResponse::new(200, ""));
            }
            let next = self.gets.lock().unwrap().pop_front();
            match next {
                Some(result) => result,
                None => std::future::pending().await,
            }
        }

        fn with_timeout(&self, timeout: Duration) -> Self {
            Self {
                timeout: Some(timeout),
                ..self.clone()
            }
        }
    }

    async fn next_event(
        events: &mut mpsc::UnboundedReceiver<TransportEvent>,
    ) -> TransportEvent {
        tokio::time::timeout(Duration::from_secs(1), events.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed")
    }

    // ── Tests ───────────────────────────────────────────────────────

    #[test]
    fn poll_url_appends_cache_buster() {
        assert_eq!(
            poll_url("http://x/chat?id=1", 1_700_000_000_000),
            "http://x/chat?id=1&_=1700000000000"
        );
        assert_eq!(poll_url("http://x/chat", 7), "http://x/chat&_=7");
    }

    #[test]
    fn config_defaults() {
        let config = LongPollConfig::new();
        assert!(config.headers.is_empty());
        assert_eq!(config.poll_timeout, Duration::from_secs(100));
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn state_round_trips_through_u8() {
        for state in [
            TransportState::Idle,
            TransportState::Active,
            TransportState::Terminated,
        ] {
            assert_eq!(TransportState::from_u8(state as u8), state);
        }
    }

    #[tokio::test]
    async fn new_transport_is_idle() {
        let (transport, _events) =
            LongPollingTransport::new(MockClient::new(vec![]), LongPollConfig::new());
        assert_eq!(transport.state(), TransportState::Idle);
        assert!(!transport.is_active());
        assert!(transport.base_url().is_none());
        assert!(transport.last_poll_url().is_none());
    }

    #[tokio::test]
    async fn poll_client_gets_the_poll_timeout() {
        let config = LongPollConfig::new()
            .with_poll_timeout(Duration::from_secs(30))
            .with_request_timeout(Duration::from_secs(2));
        let (transport, _events) = LongPollingTransport::new(MockClient::new(vec![]), config);
        assert_eq!(transport.poll_client.timeout, Some(Duration::from_secs(30)));
        assert_eq!(transport.client.timeout, Some(Duration::from_secs(2)));
    }

    #[tokio::test]
    async fn start_rejects_empty_url_without_io() {
        let client = MockClient::new(vec![]);
        let (transport, _events) =
            LongPollingTransport::new(client.clone(), LongPollConfig::new());

        let err = transport.start("").await.unwrap_err();
        assert!(matches!(err, LongPollError::InvalidUrl(_)));
        assert_eq!(transport.state(), TransportState::Idle);
        assert!(client.requests().is_empty());
    }

    #[tokio::test]
    async fn start_twice_is_rejected() {
        let client = MockClient::new(vec![Ok(HttpResponse::new(200, ""))]);
        let (transport, _events) =
            LongPollingTransport::new(client.clone(), LongPollConfig::new());

        transport.start("http://x/chat?id=1").await.unwrap();
        let err = transport.start("http://x/chat?id=1").await.unwrap_err();
        assert_eq!(
            err,
            LongPollError::InvalidState {
                state: TransportState::Active
            }
        );

        transport.stop().await;
    }

    #[tokio::test]
    async fn poll_error_closes_with_error() {
        let client = MockClient::new(vec![
            Ok(HttpResponse::new(200, "")),
            Err(LongPollError::Timeout),
        ]);
        let (transport, mut events) = LongPollingTransport::new(client, LongPollConfig::new());

        transport.start("http://x/chat?id=1").await.unwrap();

        let event = next_event(&mut events).await;
        assert_eq!(
            event,
            TransportEvent::Closed {
                error: Some(LongPollError::Timeout)
            }
        );
        assert_eq!(transport.state(), TransportState::Terminated);
        // Closed is last: the sender has been dropped.
        assert!(events.recv().await.is_none());
    }

    #[tokio::test]
    async fn nothing_is_emitted_after_closed() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let shared = Shared::new(tx);

        assert!(shared.emit_closed(None));
        assert!(!shared.emit_closed(Some(LongPollError::Timeout)));
        shared.emit_received("late".into());

        assert_eq!(rx.recv().await, Some(TransportEvent::Closed { error: None }));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn stop_before_start_closes_without_delete() {
        let client = MockClient::new(vec![]);
        let (transport, mut events) =
            LongPollingTransport::new(client.clone(), LongPollConfig::new());

        transport.stop().await;

        assert_eq!(transport.state(), TransportState::Terminated);
        assert!(next_event(&mut events).await.is_closed());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(client.requests().is_empty());

        let err = transport.start("http://x/chat?id=1").await.unwrap_err();
        assert!(matches!(err, LongPollError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn debug_output_hides_header_values() {
        let config = LongPollConfig::new().with_header("Authorization", "Bearer secret");
        let (transport, _events) = LongPollingTransport::new(MockClient::new(vec![]), config);
        let debug = format!("{transport:?}");
        assert!(debug.contains("Authorization"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn transport_is_object_safe() {
        fn assert_object_safe(_: Option<Box<dyn Transport>>) {}
        assert_object_safe(None);
    }

    #[test]
    fn transport_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LongPollingTransport<MockClient>>();
    }
}
