//! Transport contract consumed by a higher-level connection manager.
//!
//! The [`Transport`] trait is the seam between whatever negotiates a
//! connection and the concrete transport that carries messages. This crate
//! ships a single implementation,
//! [`LongPollingTransport`](crate::LongPollingTransport).
//!
//! Notifications (incoming payloads and the final close) are not part of the
//! trait: each implementation hands out a [`TransportEvent`](crate::TransportEvent)
//! receiver when it is constructed.

use async_trait::async_trait;

use crate::error::LongPollError;
use crate::long_polling::TransportState;

/// A bidirectional text message transport.
///
/// # Object Safety
///
/// This trait is object-safe, so `Box<dyn Transport>` works for a manager that
/// selects a transport at runtime.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Connect to `url` and begin receiving.
    ///
    /// Resolves once connectivity has been confirmed; receiving continues in
    /// the background.
    ///
    /// # Errors
    ///
    /// Returns [`LongPollError::ConnectionFailed`] if the server rejects the
    /// connection, or an HTTP error if it cannot be reached.
    async fn start(&self, url: &str) -> Result<(), LongPollError>;

    /// Send one message to the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the server did not acknowledge the message.
    async fn send(&self, message: String) -> Result<(), LongPollError>;

    /// Stop receiving and release the server-side session.
    ///
    /// Never fails and may be called any number of times; the close
    /// notification is emitted only once.
    async fn stop(&self);

    /// Current lifecycle state.
    fn state(&self) -> TransportState;
}
