//! Error types for the long-polling transport.

use thiserror::Error;

use crate::long_polling::TransportState;

/// Errors that can occur when using the long-polling transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LongPollError {
    /// The initial poll did not return `200 OK`.
    #[error("failed to establish connection: server responded with status {status}")]
    ConnectionFailed {
        /// Status code of the initial poll response.
        status: u16,
    },

    /// A poll or send request returned a status the transport does not accept.
    #[error("unexpected response status {status}")]
    UnexpectedStatus {
        /// The HTTP status code.
        status: u16,
    },

    /// The HTTP request failed below the status-code layer (connect, DNS, I/O).
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The HTTP request did not complete within the client's timeout.
    #[error("HTTP request timed out")]
    Timeout,

    /// An operation that needs the endpoint URL was called before `start`.
    #[error("transport has not been started")]
    NotStarted,

    /// `start` was called on a transport that is no longer idle.
    #[error("transport cannot be started from state {state:?}")]
    InvalidState {
        /// The state the transport was in.
        state: TransportState,
    },

    /// The endpoint URL is unusable.
    #[error("invalid endpoint URL: {0:?}")]
    InvalidUrl(String),
}

/// A specialized [`Result`] type for long-polling transport operations.
pub type Result<T> = std::result::Result<T, LongPollError>;
