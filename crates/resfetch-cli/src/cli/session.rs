//! Wiring shared by `get` and `watch`: credential store, connectivity
//! monitor, HTTP producer and the decorated fetch.

use anyhow::Result;
use resfetch_core::cache::ResponseCache;
use resfetch_core::config::ResfetchConfig;
use resfetch_core::connectivity;
use resfetch_core::fetch::ResilientFetch;
use resfetch_core::http::{HttpProducer, HttpResponse};
use resfetch_core::key::RequestKey;
use resfetch_core::notice::Notice;
use resfetch_core::retry::{RequestError, RetryPolicy};
use resfetch_core::signal::{ConnectivityMonitor, CredentialStore, Signals};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

pub struct Session {
    credentials: Arc<CredentialStore>,
    connectivity: Arc<ConnectivityMonitor>,
    decorated: ResilientFetch<RequestKey, HttpResponse>,
    uses_credentials: bool,
    http: HttpProducer,
    notices: Option<mpsc::Receiver<Notice>>,
}

/// Retry policy from config, with the attempt budget optionally overridden.
pub fn effective_policy(cfg: &ResfetchConfig, attempts: Option<u32>) -> RetryPolicy {
    let policy = cfg.retry_policy();
    match attempts {
        Some(max_attempts) => RetryPolicy {
            max_attempts,
            ..policy
        },
        None => policy,
    }
}

impl Session {
    pub fn new(cfg: &ResfetchConfig, attempts: Option<u32>, key: Option<String>) -> Result<Self> {
        let credential = key.or_else(|| cfg.api_key.clone());
        let uses_credentials = credential.is_some();
        let credentials = Arc::new(CredentialStore::new(credential.unwrap_or_default()));
        let connectivity = Arc::new(ConnectivityMonitor::new());

        let mut http = HttpProducer::new();
        if let Some(base) = &cfg.base_url {
            http = http.with_base_url(base)?;
        }
        // Without a configured key, one typed later is still sent.
        http = if uses_credentials {
            http.with_credentials(&credentials)
        } else {
            http.with_optional_credentials(&credentials)
        };

        let (tx, rx) = mpsc::channel(cfg.notice_capacity.max(1));
        let decorated = ResilientFetch::builder(Signals::new(&credentials, &connectivity))
            .policy(effective_policy(cfg, attempts))
            .cache_policy(cfg.cache_policy)
            .notices(tx)
            .build();

        Ok(Self {
            credentials,
            connectivity,
            decorated,
            uses_credentials,
            http,
            notices: Some(rx),
        })
    }

    /// One decorated fetch through the HTTP producer.
    pub async fn fetch(&self, key: RequestKey) -> Result<HttpResponse, RequestError> {
        self.decorated.fetch(key, |k| self.http.get(k)).await
    }

    pub fn cache(&self) -> &ResponseCache<RequestKey, HttpResponse> {
        self.decorated.cache()
    }

    /// True when requests carry an API key (from `--key` or the config).
    pub fn uses_credentials(&self) -> bool {
        self.uses_credentials
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub fn http(&self) -> &HttpProducer {
        &self.http
    }

    /// Hand the notice receiver to a caller (only once).
    pub fn take_notices(&mut self) -> Option<mpsc::Receiver<Notice>> {
        self.notices.take()
    }

    /// Publish every non-empty stdin line as a new credential.
    pub fn spawn_credential_reader(&self) -> JoinHandle<()> {
        let store = Arc::clone(&self.credentials);
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let credential = line.trim();
                if credential.is_empty() {
                    continue;
                }
                store.publish(credential);
                tracing::info!("credential updated from stdin");
                eprintln!("resfetch: key updated");
            }
        })
    }

    pub fn spawn_probe(&self, cfg: &ResfetchConfig) -> JoinHandle<()> {
        connectivity::spawn_probe(
            Arc::clone(&self.connectivity),
            cfg.connectivity_host.clone(),
            cfg.connectivity_interval(),
        )
    }
}
