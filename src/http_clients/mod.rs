//! [`HttpClient`](crate::HttpClient) implementations.
//!
//! Concrete clients live behind feature gates. Enable the corresponding Cargo
//! feature to pull one in:
//!
//! | Feature          | Client                |
//! |------------------|-----------------------|
//! | `reqwest-client` | [`ReqwestHttpClient`] |
//!
//! # Example
//!
//! ```rust,ignore
//! # async fn example() -> Result<(), longpoll_transport::LongPollError> {
//! use longpoll_transport::{HttpClient, ReqwestHttpClient};
//!
//! let http = ReqwestHttpClient::new();
//! let response = http.get("http://localhost:5000/chat?id=abc&_=0", &Default::default()).await?;
//! println!("status {}", response.status);
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "reqwest-client")]
pub mod reqwest_client;

#[cfg(feature = "reqwest-client")]
pub use reqwest_client::ReqwestHttpClient;
