//! Request identity used for cache lookup and retry bookkeeping.

use anyhow::{Context, Result};
use std::fmt;

/// Identifier for a logical request.
///
/// Two keys compare equal only when they address the same request, so
/// constructors normalise the raw input before storing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestKey(String);

impl RequestKey {
    /// Key taken verbatim.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Key for a city-name search: trimmed and lowercased, so "  Paris" and
    /// "paris" share a cache entry.
    pub fn city(name: &str) -> Self {
        Self(name.trim().to_lowercase())
    }

    /// Key for an http(s) URL, using the serialized form from the `url`
    /// crate (lowercased scheme and host, default port dropped).
    pub fn url(raw: &str) -> Result<Self> {
        let parsed = url::Url::parse(raw.trim())
            .with_context(|| format!("invalid URL for request key: {raw}"))?;
        if !is_web_url(&parsed) {
            anyhow::bail!("not an http(s) URL: {raw}");
        }
        Ok(Self(parsed.into()))
    }

    /// URL when the input parses as one, city name otherwise.
    pub fn parse(raw: &str) -> Self {
        Self::url(raw).unwrap_or_else(|_| Self::city(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The key as an http(s) URL with a host, if it is one. "paris:fr"
    /// parses as a URL with scheme `paris` but is a search term.
    pub fn as_url(&self) -> Option<url::Url> {
        url::Url::parse(&self.0).ok().filter(is_web_url)
    }

    pub fn is_url(&self) -> bool {
        self.as_url().is_some()
    }
}

fn is_web_url(url: &url::Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.has_host()
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RequestKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
