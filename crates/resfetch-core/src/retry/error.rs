//! Request error type produced by the bundled HTTP producer.

use thiserror::Error;

/// Error returned by a single request attempt.
///
/// Kept concrete (rather than `anyhow`) so the retry loop can classify it
/// before deciding whether to wait, retry or give up.
#[derive(Debug, Error)]
pub enum RequestError {
    /// No credential is configured yet; the request was not sent.
    #[error("no credential configured")]
    MissingCredential,
    /// The host reported no network connection before sending.
    #[error("network unavailable")]
    Offline,
    /// The server answered with a non-2xx status.
    #[error("HTTP {0}")]
    Status(u32),
    /// Curl reported an error (connect, resolve, timeout, etc.).
    #[error("transport: {0}")]
    Transport(#[from] curl::Error),
    /// The key could not be turned into a request URL.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
    /// The response body did not decode.
    #[error("decode: {0}")]
    Decode(String),
    /// The blocking request task panicked or was cancelled.
    #[error("request task failed: {0}")]
    Task(String),
}
