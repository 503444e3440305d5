//! Notifications emitted by a running transport.

use crate::error::LongPollError;

/// An event delivered on the channel returned by
/// [`LongPollingTransport::new`](crate::LongPollingTransport::new).
///
/// `Received` may appear any number of times, in the order the server produced
/// the payloads. `Closed` appears at most once and is always the last event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A poll returned `200 OK` with this payload.
    Received(String),

    /// The transport terminated.
    ///
    /// `error` is `None` for an explicit stop or a server-initiated graceful
    /// end (`204 No Content`), and `Some` when polling failed.
    Closed {
        /// Why polling failed, if it did.
        error: Option<LongPollError>,
    },
}

impl TransportEvent {
    /// Returns `true` for [`TransportEvent::Closed`].
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed { .. })
    }
}
