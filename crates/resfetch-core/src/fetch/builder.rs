//! Builder for [`ResilientFetch`].

use std::sync::Arc;
use tokio::sync::mpsc;

use super::{CachePolicy, ResilientFetch};
use crate::cache::ResponseCache;
use crate::notice::Notice;
use crate::retry::RetryPolicy;
use crate::signal::Signals;

/// Assembles a [`ResilientFetch`]. Without an explicit cache a fresh one is
/// created; pass a shared `Arc` to let several decorators share entries.
pub struct ResilientFetchBuilder<K, V> {
    signals: Signals,
    cache: Option<Arc<ResponseCache<K, V>>>,
    policy: RetryPolicy,
    cache_policy: CachePolicy,
    notices: Option<mpsc::Sender<Notice>>,
}

impl<K, V> ResilientFetchBuilder<K, V> {
    pub fn new(signals: Signals) -> Self {
        Self {
            signals,
            cache: None,
            policy: RetryPolicy::default(),
            cache_policy: CachePolicy::default(),
            notices: None,
        }
    }

    pub fn cache(mut self, cache: Arc<ResponseCache<K, V>>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn cache_policy(mut self, cache_policy: CachePolicy) -> Self {
        self.cache_policy = cache_policy;
        self
    }

    /// Send a [`Notice`] for every aborted fetch. Sends never block; a full
    /// or closed channel drops the notice.
    pub fn notices(mut self, tx: mpsc::Sender<Notice>) -> Self {
        self.notices = Some(tx);
        self
    }

    pub fn build(self) -> ResilientFetch<K, V> {
        ResilientFetch {
            cache: self.cache.unwrap_or_default(),
            signals: self.signals,
            policy: self.policy,
            cache_policy: self.cache_policy,
            notices: self.notices,
        }
    }
}
