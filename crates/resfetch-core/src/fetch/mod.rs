//! The decorated fetch: retry plus last-good-value cache.
//!
//! [`ResilientFetch`] wraps any keyed async producer:
//! - success stores the value under the key and returns it
//! - an aborted retry sequence raises a [`Notice`] and falls back to the last
//!   stored value for the key, returning it as a success
//! - with nothing cached the original error is returned
//!
//! Concurrent fetches of the same key are not merged; each runs its own
//! retry sequence and each success overwrites the cache entry.

mod builder;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::cache::ResponseCache;
use crate::notice::Notice;
use crate::retry::{fetch_with_retry, Classify, RetryPolicy};
use crate::signal::Signals;

pub use builder::ResilientFetchBuilder;

/// When the cache is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CachePolicy {
    /// Always run the producer; use the cache only after retries are exhausted.
    #[default]
    NetworkFirst,
    /// Serve a cached value without running the producer; on a miss behave
    /// like `NetworkFirst`.
    CacheFirst,
}

/// Retry-and-cache decorator for a keyed async producer.
pub struct ResilientFetch<K, V> {
    cache: Arc<ResponseCache<K, V>>,
    signals: Signals,
    policy: RetryPolicy,
    cache_policy: CachePolicy,
    notices: Option<mpsc::Sender<Notice>>,
}

impl<K, V> fmt::Debug for ResilientFetch<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResilientFetch")
            .field("policy", &self.policy)
            .field("cache_policy", &self.cache_policy)
            .field("notices", &self.notices.is_some())
            .finish()
    }
}

impl<K, V> ResilientFetch<K, V>
where
    K: Eq + Hash + Clone + fmt::Display,
    V: Clone,
{
    pub fn builder(signals: Signals) -> ResilientFetchBuilder<K, V> {
        ResilientFetchBuilder::new(signals)
    }

    pub fn cache(&self) -> &Arc<ResponseCache<K, V>> {
        &self.cache
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn cache_policy(&self) -> CachePolicy {
        self.cache_policy
    }

    /// Fetch `key` with the configured attempt budget.
    pub async fn fetch<E, F, Fut>(&self, key: K, producer: F) -> Result<V, E>
    where
        E: Classify + fmt::Display,
        F: FnMut(K) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        self.run(key, producer, &self.policy).await
    }

    /// Fetch `key` allowing at most `max_attempts` producer calls.
    pub async fn decorate<E, F, Fut>(&self, key: K, producer: F, max_attempts: u32) -> Result<V, E>
    where
        E: Classify + fmt::Display,
        F: FnMut(K) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let policy = RetryPolicy {
            max_attempts,
            ..self.policy
        };
        self.run(key, producer, &policy).await
    }

    async fn run<E, F, Fut>(&self, key: K, producer: F, policy: &RetryPolicy) -> Result<V, E>
    where
        E: Classify + fmt::Display,
        F: FnMut(K) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if self.cache_policy == CachePolicy::CacheFirst {
            if let Some(value) = self.cache.fallback(&key) {
                tracing::debug!(%key, "served from cache");
                return Ok(value);
            }
        }

        match fetch_with_retry(&key, producer, policy, &self.signals).await {
            Ok(value) => {
                self.cache.store(key, value.clone());
                Ok(value)
            }
            Err(err) => {
                self.raise(Notice::for_failure(err.failure_kind()));
                match self.cache.fallback(&key) {
                    Some(value) => {
                        tracing::warn!(%key, "serving cached value after failure: {}", err);
                        Ok(value)
                    }
                    None => Err(err),
                }
            }
        }
    }

    fn raise(&self, notice: Notice) {
        if let Some(tx) = &self.notices {
            if tx.try_send(notice).is_err() {
                tracing::debug!(?notice, "notice dropped (channel full or closed)");
            }
        }
    }
}
