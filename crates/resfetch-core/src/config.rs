use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetch::CachePolicy;
use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per fetch (including the first).
    pub max_attempts: u32,
    /// Backoff unit in seconds; attempt n waits (n + 1) units.
    pub unit_secs: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            unit_secs: 1.0,
        }
    }
}

impl RetryConfig {
    /// Retry policy for these settings. A negative or non-finite unit falls
    /// back to one second.
    pub fn policy(&self) -> RetryPolicy {
        let unit = Duration::try_from_secs_f64(self.unit_secs).unwrap_or(Duration::from_secs(1));
        RetryPolicy::new(self.max_attempts).with_unit(unit)
    }
}

/// Global configuration loaded from `~/.config/resfetch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResfetchConfig {
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Base URL for keys that are not URLs (e.g. a weather search endpoint).
    #[serde(default)]
    pub base_url: Option<String>,
    /// Initial API key sent as `appid`. When unset no credential is sent.
    #[serde(default)]
    pub api_key: Option<String>,
    /// "host:port" probed to track connectivity.
    pub connectivity_host: String,
    /// Seconds between connectivity probes.
    pub connectivity_interval_secs: u64,
    /// Capacity of the user notice channel.
    pub notice_capacity: usize,
    /// "network-first" (default) or "cache-first".
    #[serde(default)]
    pub cache_policy: CachePolicy,
}

impl Default for ResfetchConfig {
    fn default() -> Self {
        Self {
            retry: None,
            base_url: None,
            api_key: None,
            connectivity_host: "example.com:80".to_string(),
            connectivity_interval_secs: 5,
            notice_capacity: 16,
            cache_policy: CachePolicy::NetworkFirst,
        }
    }
}

impl ResfetchConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
            .as_ref()
            .map(RetryConfig::policy)
            .unwrap_or_default()
    }

    pub fn connectivity_interval(&self) -> Duration {
        Duration::from_secs(self.connectivity_interval_secs.max(1))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("resfetch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ResfetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ResfetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from_path(&path)
}

pub fn load_from_path(path: &Path) -> Result<ResfetchConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: ResfetchConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let cfg = ResfetchConfig::default();
        assert!(cfg.retry.is_none());
        assert_eq!(cfg.retry_policy(), RetryPolicy::default());
        assert_eq!(cfg.retry_policy().max_attempts, 4);
        assert_eq!(cfg.connectivity_interval(), Duration::from_secs(5));
        assert_eq!(cfg.cache_policy, CachePolicy::NetworkFirst);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = ResfetchConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ResfetchConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.connectivity_host, cfg.connectivity_host);
        assert_eq!(parsed.notice_capacity, cfg.notice_capacity);
        assert_eq!(parsed.cache_policy, cfg.cache_policy);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            base_url = "http://api.openweathermap.org/data/2.5/weather"
            api_key = "abc"
            connectivity_host = "1.1.1.1:53"
            connectivity_interval_secs = 0
            notice_capacity = 4
            cache_policy = "cache-first"

            [retry]
            max_attempts = 2
            unit_secs = 0.5
        "#;
        let cfg: ResfetchConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.api_key.as_deref(), Some("abc"));
        assert_eq!(cfg.cache_policy, CachePolicy::CacheFirst);
        // zero interval is clamped so the probe never spins
        assert_eq!(cfg.connectivity_interval(), Duration::from_secs(1));
        let policy = cfg.retry_policy();
        assert_eq!(policy.max_attempts, 2);
        assert_eq!(policy.unit, Duration::from_millis(500));
    }

    #[test]
    fn negative_unit_falls_back_to_one_second() {
        let retry = RetryConfig {
            max_attempts: 3,
            unit_secs: -2.0,
        };
        assert_eq!(retry.policy().unit, Duration::from_secs(1));
    }

    #[test]
    fn load_from_path_reads_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            f,
            "connectivity_host = \"localhost:80\"\nconnectivity_interval_secs = 9\nnotice_capacity = 2"
        )
        .unwrap();
        let cfg = load_from_path(f.path()).unwrap();
        assert_eq!(cfg.connectivity_host, "localhost:80");
        assert_eq!(cfg.connectivity_interval_secs, 9);
        assert!(cfg.base_url.is_none());
    }

    #[test]
    fn load_from_path_reports_bad_toml() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "notice_capacity = \"many\"").unwrap();
        let err = load_from_path(f.path()).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config"));
    }
}
