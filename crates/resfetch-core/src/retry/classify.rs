//! Classify request failures into retry policy failure kinds.

use super::error::RequestError;
use super::policy::{FailureKind, RetryDirective, RetryPolicy, StatusCategory};

/// Errors the retry loop knows how to classify.
///
/// Implement this for a producer's error type to use it with
/// [`fetch_with_retry`](super::fetch_with_retry) and the decorated fetch.
pub trait Classify {
    fn failure_kind(&self) -> FailureKind;
}

impl<T: Classify + ?Sized> Classify for &T {
    fn failure_kind(&self) -> FailureKind {
        (**self).failure_kind()
    }
}

/// Classify an HTTP status code. Returns `None` for 2xx.
pub fn classify_http_status(code: u32) -> Option<FailureKind> {
    match code {
        200..=299 => None,
        401 => Some(FailureKind::InvalidCredential),
        400..=499 => Some(FailureKind::UpstreamRejected(StatusCategory::NotFound)),
        _ => Some(FailureKind::UpstreamRejected(StatusCategory::ServerFailure)),
    }
}

/// Classify a curl error. Only "no connection" failures wait for
/// connectivity; timeouts and everything else back off.
pub fn classify_curl_error(e: &curl::Error) -> FailureKind {
    if e.is_couldnt_connect() || e.is_couldnt_resolve_host() || e.is_couldnt_resolve_proxy() {
        return FailureKind::NetworkUnavailable;
    }
    FailureKind::Unknown
}

impl Classify for RequestError {
    fn failure_kind(&self) -> FailureKind {
        match self {
            RequestError::MissingCredential => FailureKind::InvalidCredential,
            RequestError::Offline => FailureKind::NetworkUnavailable,
            // A 2xx never becomes a Status error; treat one defensively as unknown.
            RequestError::Status(code) => {
                classify_http_status(*code).unwrap_or(FailureKind::Unknown)
            }
            RequestError::Transport(e) => classify_curl_error(e),
            RequestError::InvalidUrl(_) | RequestError::Decode(_) | RequestError::Task(_) => {
                FailureKind::Unknown
            }
        }
    }
}

/// Classify `error` for the 0-based `attempt` under `policy`.
pub fn classify<E: Classify + ?Sized>(
    error: &E,
    attempt: u32,
    policy: &RetryPolicy,
) -> RetryDirective {
    policy.decide(attempt, error.failure_kind())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::SignalKind;
    use std::time::Duration;

    #[test]
    fn http_2xx_is_not_a_failure() {
        assert_eq!(classify_http_status(200), None);
        assert_eq!(classify_http_status(204), None);
    }

    #[test]
    fn http_401_is_invalid_credential() {
        assert_eq!(
            classify_http_status(401),
            Some(FailureKind::InvalidCredential)
        );
    }

    #[test]
    fn http_4xx_is_not_found() {
        for code in [400, 403, 404, 429] {
            assert_eq!(
                classify_http_status(code),
                Some(FailureKind::UpstreamRejected(StatusCategory::NotFound)),
                "status {code}"
            );
        }
    }

    #[test]
    fn http_5xx_and_odd_codes_are_server_failures() {
        for code in [500, 502, 503, 302, 100] {
            assert_eq!(
                classify_http_status(code),
                Some(FailureKind::UpstreamRejected(StatusCategory::ServerFailure)),
                "status {code}"
            );
        }
    }

    #[test]
    fn curl_connect_failures_are_network_unavailable() {
        // CURLE_COULDNT_RESOLVE_HOST = 6, CURLE_COULDNT_CONNECT = 7
        assert_eq!(
            classify_curl_error(&curl::Error::new(6)),
            FailureKind::NetworkUnavailable
        );
        assert_eq!(
            classify_curl_error(&curl::Error::new(7)),
            FailureKind::NetworkUnavailable
        );
        // CURLE_OPERATION_TIMEDOUT = 28
        assert_eq!(
            classify_curl_error(&curl::Error::new(28)),
            FailureKind::Unknown
        );
    }

    #[test]
    fn request_errors_map_to_kinds() {
        assert_eq!(
            RequestError::MissingCredential.failure_kind(),
            FailureKind::InvalidCredential
        );
        assert_eq!(
            RequestError::Offline.failure_kind(),
            FailureKind::NetworkUnavailable
        );
        assert_eq!(
            RequestError::Status(401).failure_kind(),
            FailureKind::InvalidCredential
        );
        assert_eq!(
            RequestError::Status(404).failure_kind(),
            FailureKind::UpstreamRejected(StatusCategory::NotFound)
        );
        assert_eq!(
            RequestError::Decode("eof".into()).failure_kind(),
            FailureKind::Unknown
        );
    }

    #[test]
    fn classify_combines_kind_and_policy() {
        let policy = RetryPolicy::new(3);
        assert_eq!(
            classify(&RequestError::Status(401), 0, &policy),
            RetryDirective::WaitForSignal(SignalKind::CredentialUpdated)
        );
        assert_eq!(
            classify(&RequestError::Status(500), 1, &policy),
            RetryDirective::WaitThenRetry(Duration::from_secs(2))
        );
        assert_eq!(
            classify(&RequestError::Offline, 2, &policy),
            RetryDirective::Abort
        );
    }
}
