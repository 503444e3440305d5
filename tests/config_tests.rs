#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
//! Configuration loading tests.
//!
//! Hosts typically keep transport settings next to the rest of their config,
//! so `LongPollConfig` must deserialize from both TOML and JSON with durations
//! in milliseconds and every field optional.

use std::time::Duration;

use longpoll_transport::LongPollConfig;

#[test]
fn empty_toml_yields_defaults() {
    let config: LongPollConfig = toml::from_str("").unwrap();
    assert_eq!(config, LongPollConfig::default());
    assert_eq!(config.poll_timeout, Duration::from_secs(100));
}

#[test]
fn toml_with_all_fields() {
    let config: LongPollConfig = toml::from_str(
        r#"
poll_timeout_ms = 30000
request_timeout_ms = 2500

[headers]
Authorization = "Bearer t0k3n"
"X-Requested-With" = "longpoll"
"#,
    )
    .unwrap();

    assert_eq!(config.poll_timeout, Duration::from_secs(30));
    assert_eq!(config.request_timeout, Some(Duration::from_millis(2500)));
    assert_eq!(config.headers["Authorization"], "Bearer t0k3n");
    assert_eq!(config.headers["X-Requested-With"], "longpoll");
}

#[test]
fn json_null_request_timeout_is_none() {
    let config: LongPollConfig =
        serde_json::from_str(r#"{"poll_timeout_ms": 1000, "request_timeout_ms": null}"#).unwrap();
    assert_eq!(config.poll_timeout, Duration::from_secs(1));
    assert!(config.request_timeout.is_none());
    assert!(config.headers.is_empty());
}

#[test]
fn json_output_uses_millisecond_field_names() {
    let config = LongPollConfig::new()
        .with_poll_timeout(Duration::from_secs(90))
        .with_request_timeout(Duration::from_secs(3))
        .with_header("Authorization", "Bearer t0k3n");

    let value = serde_json::to_value(&config).unwrap();
    assert_eq!(value["poll_timeout_ms"], 90_000);
    assert_eq!(value["request_timeout_ms"], 3_000);
    assert_eq!(value["headers"]["Authorization"], "Bearer t0k3n");
}

#[test]
fn negative_timeout_is_rejected() {
    let result = serde_json::from_str::<LongPollConfig>(r#"{"poll_timeout_ms": -5}"#);
    assert!(result.is_err());
}
