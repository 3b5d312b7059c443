//! `resfetch watch` – re-fetch on an interval, falling back to the last good body.

use anyhow::Result;
use resfetch_core::config::ResfetchConfig;
use resfetch_core::fetch::CachePolicy;
use resfetch_core::key::RequestKey;
use std::time::Duration;

use crate::cli::session::Session;

/// `watch` always goes to the network; the cache only covers failures.
/// Under cache-first every tick would replay the first body.
pub fn watch_config(cfg: &ResfetchConfig) -> ResfetchConfig {
    ResfetchConfig {
        cache_policy: CachePolicy::NetworkFirst,
        ..cfg.clone()
    }
}

pub async fn run_watch(
    cfg: &ResfetchConfig,
    target: &str,
    interval_secs: u64,
    attempts: Option<u32>,
    key: Option<String>,
) -> Result<()> {
    let cfg = &watch_config(cfg);
    let mut session = Session::new(cfg, attempts, key)?;
    let reader = session.spawn_credential_reader();
    let probe = session.spawn_probe(cfg);
    let printer = session.take_notices().map(|mut rx| {
        tokio::spawn(async move {
            while let Some(notice) = rx.recv().await {
                eprintln!("resfetch: {}", notice);
            }
        })
    });
    if session.uses_credentials() {
        eprintln!("resfetch: type a new API key and press Enter to update it");
    }

    let request_key = RequestKey::parse(target);
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => break,
        }
        // Ctrl-C drops an in-flight fetch, cancelling any backoff or signal wait.
        tokio::select! {
            result = session.fetch(request_key.clone()) => match result {
                Ok(response) => {
                    let age = session
                        .cache()
                        .entry(&request_key)
                        .map(|e| e.age())
                        .unwrap_or_default();
                    if age >= Duration::from_secs(1) {
                        println!("[stale {}s] {}", age.as_secs(), response.text());
                    } else {
                        println!("{}", response.text());
                    }
                }
                Err(e) => eprintln!("resfetch: {}: {}", request_key, e),
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    reader.abort();
    probe.abort();
    if let Some(printer) = printer {
        printer.abort();
    }
    Ok(())
}
