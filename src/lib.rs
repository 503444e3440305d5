//! # Long-Polling Transport
//!
//! A bidirectional text message channel built on plain HTTP request/response,
//! for environments where streaming transports are unavailable.
//!
//! The transport repeatedly issues blocking poll requests. Each response either
//! carries a message (`200`), ends the stream gracefully (`204`), or is treated
//! as fatal. Outbound messages are independent `POST`s to the same endpoint.
//!
//! ## Features
//!
//! - **Client-agnostic** — implement the [`HttpClient`] trait for any HTTP stack
//! - **reqwest built-in** — the default `reqwest-client` feature provides `ReqwestHttpClient`
//! - **Event-driven** — receive typed [`TransportEvent`]s via a channel
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use longpoll_transport::{LongPollConfig, LongPollingTransport, ReqwestHttpClient, TransportEvent};
//!
//! let (transport, mut events) =
//!     LongPollingTransport::new(ReqwestHttpClient::new(), LongPollConfig::new());
//! transport.start("https://example.com/chat?id=abc").await?;
//!
//! while let Some(event) = events.recv().await {
//!     if let TransportEvent::Received(payload) = event {
//!         println!("{payload}");
//!     }
//! }
//! ```

pub mod error;
pub mod event;
pub mod http_client;
pub mod http_clients;
pub mod long_polling;
pub mod transport;

// Re-export primary types for ergonomic imports.
pub use error::LongPollError;
pub use event::TransportEvent;
pub use http_client::{Headers, HttpClient, HttpMethod, HttpRequest, HttpResponse};
#[cfg(feature = "reqwest-client")]
pub use http_clients::ReqwestHttpClient;
pub use long_polling::{LongPollConfig, LongPollingTransport, TransportState};
pub use transport::Transport;
