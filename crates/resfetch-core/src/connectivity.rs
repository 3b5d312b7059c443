//! Background connectivity probe.
//!
//! Periodically opens a TCP connection to a well-known host and publishes
//! online/offline into a [`ConnectivityMonitor`]. Fetches parked on
//! `NetworkUnavailable` resume when the monitor flips to online.

use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

use crate::signal::{Connectivity, ConnectivityMonitor};

/// Single probe: online if a TCP connection to `target` ("host:port")
/// opens within `timeout`.
pub async fn probe_once(target: &str, timeout: Duration) -> Connectivity {
    match tokio::time::timeout(timeout, TcpStream::connect(target)).await {
        Ok(Ok(_)) => Connectivity::Online,
        Ok(Err(e)) => {
            tracing::debug!(host = %target, "connectivity probe failed: {}", e);
            Connectivity::Offline
        }
        Err(_) => {
            tracing::debug!(host = %target, "connectivity probe timed out");
            Connectivity::Offline
        }
    }
}

/// Spawns the probe loop. Probes once immediately, then every `interval`.
/// Abort the returned handle to stop it; it also stops on its own once
/// nothing subscribes to the monitor any more.
pub fn spawn_probe(
    monitor: Arc<ConnectivityMonitor>,
    target: String,
    interval: Duration,
) -> JoinHandle<()> {
    let probe_timeout = interval.min(Duration::from_secs(5));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let status = probe_once(&target, probe_timeout).await;
            if monitor.publish(status) {
                tracing::info!(host = %target, ?status, "connectivity changed");
            }
            if monitor.subscriber_count() == 0 {
                tracing::debug!("no connectivity subscribers left; stopping probe");
                break;
            }
        }
    })
}
