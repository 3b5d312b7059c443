//! `resfetch get` – one decorated fetch.

use anyhow::{Context, Result};
use resfetch_core::config::ResfetchConfig;
use resfetch_core::key::RequestKey;

use crate::cli::session::Session;

pub async fn run_get(
    cfg: &ResfetchConfig,
    target: &str,
    attempts: Option<u32>,
    key: Option<String>,
) -> Result<()> {
    let mut session = Session::new(cfg, attempts, key)?;
    let mut notices = session.take_notices();
    let reader = session.spawn_credential_reader();
    let probe = session.spawn_probe(cfg);
    if session.uses_credentials() {
        eprintln!("resfetch: if the key is rejected, type a new one and press Enter");
    }

    let request_key = RequestKey::parse(target);
    let result = tokio::select! {
        result = session.fetch(request_key.clone()) => result,
        _ = tokio::signal::ctrl_c() => {
            reader.abort();
            probe.abort();
            anyhow::bail!("interrupted");
        }
    };
    reader.abort();
    probe.abort();

    if let Some(rx) = notices.as_mut() {
        while let Ok(notice) = rx.try_recv() {
            eprintln!("resfetch: {}", notice);
        }
    }

    let response = result.with_context(|| format!("fetching {}", request_key))?;
    println!("{}", response.text());
    Ok(())
}
