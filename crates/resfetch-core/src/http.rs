//! HTTP request producer.
//!
//! Uses the curl crate (libcurl) for a plain GET per attempt, run on the
//! blocking pool. Keys are either absolute URLs or search terms that are sent
//! as `q=<key>` against a configured base URL. When a credential store is
//! attached its current value is appended as `appid=<credential>`; a
//! required credential that is empty fails the attempt, an optional one is
//! left out.

use std::time::Duration;
use tokio::sync::watch;

use crate::key::RequestKey;
use crate::retry::RequestError;
use crate::signal::CredentialStore;

/// Status and body of a successful (2xx) response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Body as text; invalid UTF-8 is replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body parsed as JSON.
    pub fn json(&self) -> Result<serde_json::Value, RequestError> {
        serde_json::from_slice(&self.body).map_err(|e| RequestError::Decode(e.to_string()))
    }
}

/// Builds and sends GET requests for request keys.
#[derive(Debug, Clone)]
pub struct HttpProducer {
    base_url: Option<url::Url>,
    credentials: Option<watch::Receiver<String>>,
    credential_required: bool,
    query: Vec<(String, String)>,
    timeout: Duration,
}

impl Default for HttpProducer {
    fn default() -> Self {
        Self {
            base_url: None,
            credentials: None,
            credential_required: false,
            query: Vec::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl HttpProducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Base URL for keys that are not absolute URLs (e.g. city names).
    pub fn with_base_url(mut self, base: &str) -> anyhow::Result<Self> {
        let parsed = url::Url::parse(base)
            .map_err(|e| anyhow::anyhow!("invalid base URL {base}: {e}"))?;
        self.base_url = Some(parsed);
        Ok(self)
    }

    /// Send the store's current credential as `appid` with every request.
    /// An empty credential fails the attempt with `MissingCredential`.
    pub fn with_credentials(mut self, store: &CredentialStore) -> Self {
        self.credentials = Some(store.subscribe());
        self.credential_required = true;
        self
    }

    /// Like [`with_credentials`](Self::with_credentials), but requests go out
    /// without `appid` while the store is empty.
    pub fn with_optional_credentials(mut self, store: &CredentialStore) -> Self {
        self.credentials = Some(store.subscribe());
        self.credential_required = false;
        self
    }

    /// Extra query parameter sent with every request (e.g. `units=metric`).
    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full request URL for `key`, including credential and extra parameters.
    pub fn request_url(&self, key: &RequestKey) -> Result<String, RequestError> {
        let mut url = match key.as_url() {
            Some(url) => url,
            None => {
                let mut url = self
                    .base_url
                    .clone()
                    .ok_or_else(|| RequestError::InvalidUrl(key.to_string()))?;
                url.query_pairs_mut().append_pair("q", key.as_str());
                url
            }
        };

        if let Some(rx) = &self.credentials {
            let credential = rx.borrow().clone();
            if !credential.is_empty() {
                url.query_pairs_mut().append_pair("appid", &credential);
            } else if self.credential_required {
                return Err(RequestError::MissingCredential);
            }
        }
        for (name, value) in &self.query {
            url.query_pairs_mut().append_pair(name, value);
        }
        Ok(url.into())
    }

    /// One GET attempt for `key`.
    pub async fn get(&self, key: RequestKey) -> Result<HttpResponse, RequestError> {
        let url = self.request_url(&key)?;
        let timeout = self.timeout;
        tokio::task::spawn_blocking(move || perform_get(&url, timeout))
            .await
            .map_err(|e| RequestError::Task(e.to_string()))?
    }
}

/// Performs a blocking GET. Non-2xx statuses become `RequestError::Status`.
fn perform_get(url: &str, timeout: Duration) -> Result<HttpResponse, RequestError> {
    let mut body = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(Duration::from_secs(15))?;
    easy.timeout(timeout)?;

    let mut list = curl::easy::List::new();
    list.append("Content-Type: application/json")?;
    easy.http_headers(list)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    if !(200..300).contains(&status) {
        tracing::debug!(url, status, "request rejected");
        return Err(RequestError::Status(status));
    }
    Ok(HttpResponse { status, body })
}
