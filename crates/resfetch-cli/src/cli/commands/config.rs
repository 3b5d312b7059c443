//! `resfetch config` – show where the config lives and what is in effect.

use anyhow::Result;
use resfetch_core::config::{self, ResfetchConfig};

pub fn run_config(cfg: &ResfetchConfig) -> Result<()> {
    println!("config: {}", config::config_path()?.display());
    let policy = cfg.retry_policy();
    println!(
        "retry: {} attempt(s), backoff unit {:?}",
        policy.max_attempts, policy.unit
    );
    println!(
        "base_url: {}",
        cfg.base_url.as_deref().unwrap_or("(none)")
    );
    println!(
        "api_key: {}",
        if cfg.api_key.is_some() { "set" } else { "(none)" }
    );
    println!(
        "connectivity: {} every {:?}",
        cfg.connectivity_host,
        cfg.connectivity_interval()
    );
    println!("cache_policy: {:?}", cfg.cache_policy);
    println!("notice_capacity: {}", cfg.notice_capacity);
    Ok(())
}
