use std::time::Duration;

/// Why an upstream server rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCategory {
    /// 4xx other than 401: the requested resource (e.g. a city) does not exist.
    NotFound,
    /// Any other non-2xx status.
    ServerFailure,
}

/// High-level classification of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Credential missing or refused; waits for a new one.
    InvalidCredential,
    /// No network connection; waits for connectivity.
    NetworkUnavailable,
    /// Server answered with an error status.
    UpstreamRejected(StatusCategory),
    /// Anything else.
    Unknown,
}

/// External event a retry can wait on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    /// A non-empty credential was published.
    CredentialUpdated,
    /// Connectivity reported online.
    ConnectivityRestored,
}

/// Decision returned by the retry policy for one failed attempt.
///
/// `Abort` does not carry the error: the caller still owns it and returns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDirective {
    /// Stop retrying and surface the original error.
    Abort,
    /// Sleep, then run the next attempt.
    WaitThenRetry(Duration),
    /// Wait for one occurrence of the signal, then run the next attempt.
    WaitForSignal(SignalKind),
}

/// Linear backoff policy with a fixed attempt budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first). 0 behaves as 1.
    pub max_attempts: u32,
    /// Backoff time unit; attempt `n` waits `(n + 1) * unit`.
    pub unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }

    pub fn with_unit(mut self, unit: Duration) -> Self {
        self.unit = unit;
        self
    }

    /// Decide what follows a failure of the given kind.
    ///
    /// `attempt` is 0-based. Once `attempt` reaches the last slot of the
    /// budget the answer is `Abort` whatever the kind.
    pub fn decide(&self, attempt: u32, kind: FailureKind) -> RetryDirective {
        if attempt >= self.max_attempts.max(1) - 1 {
            return RetryDirective::Abort;
        }

        match kind {
            FailureKind::InvalidCredential => {
                RetryDirective::WaitForSignal(SignalKind::CredentialUpdated)
            }
            FailureKind::NetworkUnavailable => {
                RetryDirective::WaitForSignal(SignalKind::ConnectivityRestored)
            }
            FailureKind::UpstreamRejected(_) | FailureKind::Unknown => {
                RetryDirective::WaitThenRetry(self.backoff(attempt))
            }
        }
    }

    /// Backoff before the attempt after `attempt`: 1, 2, 3... units.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.unit.saturating_mul(attempt.saturating_add(1))
    }
}
