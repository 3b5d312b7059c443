//! Retry loop: run a producer until success or the policy says stop.

use std::fmt;
use std::future::Future;

use super::classify::Classify;
use super::policy::{RetryDirective, RetryPolicy};
use crate::signal::Signals;

/// Runs `producer` for `key` until it succeeds or the retry policy aborts.
///
/// Attempts are strictly sequential. Between attempts the loop either sleeps
/// for the linear backoff or waits for one occurrence of an external signal
/// (new credential, connectivity restored). A credential published while an
/// attempt is in flight counts as new for the wait that follows it.
///
/// [`RetryDirective::Abort`] ends the loop with `Err` holding the error of the
/// last attempt, unchanged. A closed signal source does the same.
///
/// Dropping the returned future cancels the fetch and releases any pending
/// timer or signal subscription.
pub async fn fetch_with_retry<K, V, E, F, Fut>(
    key: &K,
    mut producer: F,
    policy: &RetryPolicy,
    signals: &Signals,
) -> Result<V, E>
where
    K: Clone + fmt::Display,
    E: Classify + fmt::Display,
    F: FnMut(K) -> Fut,
    Fut: Future<Output = Result<V, E>>,
{
    let mut attempt = 0u32;
    loop {
        let since = signals.credential_cursor();
        let err = match producer(key.clone()).await {
            Ok(value) => {
                tracing::debug!(%key, attempt, "fetch succeeded");
                return Ok(value);
            }
            Err(e) => e,
        };

        let kind = err.failure_kind();
        match policy.decide(attempt, kind) {
            RetryDirective::Abort => {
                tracing::warn!(%key, attempt, ?kind, "giving up: {}", err);
                return Err(err);
            }
            RetryDirective::WaitThenRetry(delay) => {
                tracing::info!(%key, attempt, "retrying after {:?}: {}", delay, err);
                tokio::time::sleep(delay).await;
            }
            RetryDirective::WaitForSignal(signal) => {
                tracing::info!(%key, attempt, ?signal, "waiting for signal: {}", err);
                if let Err(closed) = signals.wait_for(signal, since).await {
                    tracing::warn!(%key, attempt, "{}; giving up: {}", closed, err);
                    return Err(err);
                }
            }
        }
        attempt += 1;
    }
}
