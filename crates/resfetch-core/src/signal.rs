//! External signal sources a retry can wait on.
//!
//! Both sources are shared, long-lived `watch` channels. Publishers
//! ([`CredentialStore`], [`ConnectivityMonitor`]) own the sender; every
//! waiting fetch holds its own cloned receiver, so dropping a fetch only
//! unsubscribes it and never closes the source.

use std::fmt;
use tokio::sync::watch;

use crate::retry::SignalKind;

/// Network reachability as reported by a connectivity monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    Online,
    Offline,
    #[default]
    Unknown,
}

impl Connectivity {
    /// Online only when the target is reachable without first having to
    /// establish a connection (dial-up, VPN on demand).
    pub fn from_flags(reachable: bool, connection_required: bool) -> Self {
        if reachable && !connection_required {
            Connectivity::Online
        } else {
            Connectivity::Offline
        }
    }

    pub fn is_online(self) -> bool {
        matches!(self, Connectivity::Online)
    }
}

/// The source stopped publishing (every sender was dropped).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalClosed(pub SignalKind);

impl fmt::Display for SignalClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "signal source closed: {:?}", self.0)
    }
}

impl std::error::Error for SignalClosed {}

/// Holds the current credential (e.g. an API key) and publishes updates.
#[derive(Debug)]
pub struct CredentialStore {
    tx: watch::Sender<String>,
}

impl CredentialStore {
    pub fn new(initial: impl Into<String>) -> Self {
        let (tx, _) = watch::channel(initial.into());
        Self { tx }
    }

    /// Publish a new credential. Every call notifies waiters, even when the
    /// value is unchanged, so re-entering the same key retries.
    pub fn publish(&self, credential: impl Into<String>) {
        self.tx.send_replace(credential.into());
    }

    pub fn current(&self) -> String {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new(String::new())
    }
}

/// Holds the current connectivity status; unchanged statuses are not
/// re-published.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    tx: watch::Sender<Connectivity>,
}

impl ConnectivityMonitor {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Connectivity::Unknown);
        Self { tx }
    }

    /// Record a status. Returns true when it differed from the previous one.
    pub fn publish(&self, status: Connectivity) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            *current = status;
            true
        })
    }

    pub fn status(&self) -> Connectivity {
        *self.tx.borrow()
    }

    pub fn is_online(&self) -> bool {
        self.status().is_online()
    }

    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Subscriptions to both signal sources, handed to the retry loop.
#[derive(Debug, Clone)]
pub struct Signals {
    credentials: watch::Receiver<String>,
    connectivity: watch::Receiver<Connectivity>,
}

impl Signals {
    pub fn new(credentials: &CredentialStore, connectivity: &ConnectivityMonitor) -> Self {
        Self {
            credentials: credentials.subscribe(),
            connectivity: connectivity.subscribe(),
        }
    }

    /// Marks the current credential as seen and returns the position.
    ///
    /// Taken before an attempt, so a credential published while the attempt
    /// is in flight still counts as new once it fails.
    pub fn credential_cursor(&self) -> CredentialCursor {
        let mut rx = self.credentials.clone();
        rx.borrow_and_update();
        CredentialCursor(rx)
    }

    /// Wait for one occurrence of `kind`. Credential updates are counted
    /// from `since`.
    pub async fn wait_for(
        &self,
        kind: SignalKind,
        since: CredentialCursor,
    ) -> Result<(), SignalClosed> {
        match kind {
            SignalKind::CredentialUpdated => since.next().await.map(|_| ()),
            SignalKind::ConnectivityRestored => self.online().await,
        }
    }

    /// Wait for a non-empty credential published after this call.
    pub async fn next_credential(&self) -> Result<String, SignalClosed> {
        self.credential_cursor().next().await
    }

    /// Wait until connectivity is online; returns at once if it already is.
    pub async fn online(&self) -> Result<(), SignalClosed> {
        let mut rx = self.connectivity.clone();
        rx.wait_for(|status| status.is_online())
            .await
            .map(|_| ())
            .map_err(|_| SignalClosed(SignalKind::ConnectivityRestored))
    }
}

/// A position in the credential stream; see [`Signals::credential_cursor`].
#[derive(Debug)]
pub struct CredentialCursor(watch::Receiver<String>);

impl CredentialCursor {
    /// Resolves with the first non-empty credential published after the
    /// cursor was taken, including one that is already pending.
    pub async fn next(mut self) -> Result<String, SignalClosed> {
        loop {
            self.0
                .changed()
                .await
                .map_err(|_| SignalClosed(SignalKind::CredentialUpdated))?;
            let accepted = {
                let credential = self.0.borrow_and_update();
                (!credential.is_empty()).then(|| credential.clone())
            };
            if let Some(credential) = accepted {
                return Ok(credential);
            }
        }
    }
}
