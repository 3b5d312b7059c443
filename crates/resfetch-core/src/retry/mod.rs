//! Retry and backoff policy.
//!
//! This module classifies request failures (bad credential, no network,
//! upstream rejection) and drives the bounded retry loop, so the decorated
//! fetch in [`crate::fetch`] and any other caller share one policy.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status, Classify};
pub use error::RequestError;
pub use policy::{FailureKind, RetryDirective, RetryPolicy, SignalKind, StatusCategory};
pub use run::fetch_with_retry;
