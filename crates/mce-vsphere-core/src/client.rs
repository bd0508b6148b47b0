// ── Session handle ──
//
// `Client` owns one `ConnectionConfig` and at most one live service
// instance. `connect` opens the session through a `Connector`, classifying
// any failure into the core error taxonomy; `disconnect` is best-effort and
// always lands back in `Disconnected`. `session()` and `oneshot()` scope a
// connection so it is torn down even when the caller bails out early.

use std::fmt;
use std::ops::{Deref, DerefMut};

use mce_vsphere_api::{Connector, ServiceContent, ServiceInstance};
use tracing::{debug, error, info, warn};

use crate::config::ConnectionConfig;
use crate::error::Error;

// ── ConnectionState ──────────────────────────────────────────────────

/// Lifecycle state of a [`Client`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum ConnectionState {
    Disconnected,
    Connected,
    /// The last connect attempt failed; no handle is retained.
    Failed,
}

// ── Client ───────────────────────────────────────────────────────────

/// A vCenter client bound to one configuration and one connector.
pub struct Client<C> {
    config: ConnectionConfig,
    connector: C,
    service: Option<Box<dyn ServiceInstance>>,
    state: ConnectionState,
}

impl<C> fmt::Debug for Client<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.config.endpoint())
            .field("username", &self.config.username)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<C: Connector> Client<C> {
    /// Create a client. Does NOT connect; call [`connect()`](Self::connect).
    pub fn new(config: ConnectionConfig, connector: C) -> Self {
        Self {
            config,
            connector,
            service: None,
            state: ConnectionState::Disconnected,
        }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Open the session. A no-op when already connected.
    pub fn connect(&mut self) -> Result<&ServiceContent, Error> {
        if self.service.is_none() {
            let service = self.open().inspect_err(|_| {
                self.state = ConnectionState::Failed;
            })?;
            self.service = Some(service);
            self.state = ConnectionState::Connected;
        } else {
            debug!(endpoint = %self.config.endpoint(), "already connected");
        }
        self.content()
    }

    fn open(&self) -> Result<Box<dyn ServiceInstance>, Error> {
        let config = &self.config;
        debug!(
            host = %config.host,
            port = config.port,
            path = %config.path,
            protocol = %config.protocol(),
            verify = config.verify_certificate,
            timeout_secs = config.timeout_secs,
            pool_size = config.pool_size,
            "connecting to vcenter"
        );

        let result = config
            .connect_spec()
            .and_then(|spec| self.connector.connect(&spec));

        match result {
            Ok(service) => {
                info!(endpoint = %config.endpoint(), "connected to vcenter");
                Ok(service)
            }
            Err(fault) => {
                if config.debug {
                    error!(?fault, endpoint = %config.endpoint(), "connect failed");
                }
                Err(Error::from_connect_fault(fault, config))
            }
        }
    }

    /// Connect if needed and return a guard that disconnects on drop.
    pub fn session(&mut self) -> Result<Session<'_, C>, Error> {
        self.connect()?;
        Ok(Session { client: self })
    }

    /// Connect, run `f`, and disconnect regardless of its outcome, a panic
    /// inside `f` included.
    pub fn oneshot<T, F>(config: ConnectionConfig, connector: C, f: F) -> Result<T, Error>
    where
        F: FnOnce(&Client<C>) -> Result<T, Error>,
    {
        let mut client = Self::new(config, connector);
        let session = client.session()?;
        f(&session)
    }

    // ── Service access ───────────────────────────────────────────────

    /// The live service instance, or `NotConnected`.
    pub fn service(&self) -> Result<&dyn ServiceInstance, Error> {
        self.service
            .as_deref()
            .ok_or_else(|| Error::NotConnected {
                host: self.config.host.clone(),
                port: self.config.port,
            })
    }

    /// Service content captured at login.
    pub fn content(&self) -> Result<&ServiceContent, Error> {
        Ok(self.service()?.content())
    }
}

impl<C> Client<C> {
    /// Close the session. Never fails; logout errors are logged and dropped.
    pub fn disconnect(&mut self) {
        match self.service.take() {
            Some(mut service) => {
                if let Err(e) = service.logout() {
                    warn!(error = %e, endpoint = %self.config.endpoint(), "logout failed (non-fatal)");
                }
                debug!(endpoint = %self.config.endpoint(), "disconnected");
            }
            None => debug!(state = %self.state, "disconnect without a session"),
        }
        self.state = ConnectionState::Disconnected;
    }
}

impl<C> Drop for Client<C> {
    fn drop(&mut self) {
        if self.service.is_some() {
            self.disconnect();
        }
    }
}

// ── Session guard ────────────────────────────────────────────────────

/// A connected [`Client`] borrowed for a scope. Disconnects on drop.
pub struct Session<'a, C: Connector> {
    client: &'a mut Client<C>,
}

impl<C: Connector> Deref for Session<'_, C> {
    type Target = Client<C>;

    fn deref(&self) -> &Self::Target {
        self.client
    }
}

impl<C: Connector> DerefMut for Session<'_, C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.client
    }
}

impl<C: Connector> Drop for Session<'_, C> {
    fn drop(&mut self) {
        self.client.disconnect();
    }
}
