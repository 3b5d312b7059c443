//! Shared fixtures for async retry/fetch tests.

use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::time::Instant;

use crate::retry::{Classify, FailureKind, StatusCategory};
use crate::signal::{ConnectivityMonitor, CredentialStore, Signals};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub(crate) enum TestError {
    #[error("generic failure #{0}")]
    Generic(u32),
    #[error("bad key")]
    BadKey,
    #[error("offline")]
    Offline,
    #[error("server failure")]
    Server,
    #[error("not found")]
    NotFound,
}

impl Classify for TestError {
    fn failure_kind(&self) -> FailureKind {
        match self {
            TestError::Generic(_) => FailureKind::Unknown,
            TestError::BadKey => FailureKind::InvalidCredential,
            TestError::Offline => FailureKind::NetworkUnavailable,
            TestError::Server => FailureKind::UpstreamRejected(StatusCategory::ServerFailure),
            TestError::NotFound => FailureKind::UpstreamRejected(StatusCategory::NotFound),
        }
    }
}

pub(crate) struct SignalFixture {
    pub credentials: CredentialStore,
    pub connectivity: ConnectivityMonitor,
    pub signals: Signals,
}

pub(crate) fn signal_fixture() -> SignalFixture {
    let credentials = CredentialStore::new("initial-key");
    let connectivity = ConnectivityMonitor::new();
    let signals = Signals::new(&credentials, &connectivity);
    SignalFixture {
        credentials,
        connectivity,
        signals,
    }
}

/// Records the (virtual) time of every producer invocation.
#[derive(Clone, Default)]
pub(crate) struct CallLog(Arc<Mutex<Vec<Instant>>>);

impl CallLog {
    /// Record a call; returns its 0-based index.
    pub fn record(&self) -> usize {
        let mut calls = self.0.lock().unwrap();
        calls.push(Instant::now());
        calls.len() - 1
    }

    pub fn count(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    /// Whole seconds between consecutive calls.
    pub fn gaps_secs(&self) -> Vec<u64> {
        let calls = self.0.lock().unwrap();
        calls
            .windows(2)
            .map(|w| (w[1] - w[0]).as_secs())
            .collect()
    }

    /// Milliseconds between consecutive calls.
    pub fn gaps_millis(&self) -> Vec<u128> {
        let calls = self.0.lock().unwrap();
        calls
            .windows(2)
            .map(|w| (w[1] - w[0]).as_millis())
            .collect()
    }
}

/// Yields until the credential source has at least `expected` subscribers,
/// i.e. until a fetch is parked waiting for a new credential.
pub(crate) async fn until_credential_waiters(store: &CredentialStore, expected: usize) {
    while store.subscriber_count() < expected {
        tokio::task::yield_now().await;
    }
}
