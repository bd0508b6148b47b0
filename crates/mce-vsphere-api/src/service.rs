// ── Connector and service-instance seams ──
//
// These traits are the whole surface this workspace needs from a vSphere
// API client: open an authenticated session, read the service content,
// enumerate objects through a container view, snapshot properties, follow
// parent references, and log out. Everything is synchronous; a call blocks
// until the server answers or the transport gives up.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::fault::Fault;
use crate::moref::{ManagedObjectKind, ManagedObjectRef};
use crate::properties::PropertySet;
use crate::transport::TransportConfig;

/// `ServiceInstance.content.about`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutInfo {
    pub version: String,
    pub build: String,
    pub os_type: String,
    pub api_type: String,
    pub api_version: String,
    pub license_product_name: String,
    pub license_product_version: String,
}

/// The subset of `ServiceInstanceContent` a session keeps after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceContent {
    pub about: AboutInfo,
    pub root_folder: ManagedObjectRef,
}

/// `SessionManager.currentSession`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub key: String,
    pub user_name: String,
    pub full_name: String,
    pub ip_address: String,
    pub user_agent: String,
    pub locale: String,
    pub login_time: DateTime<Utc>,
    pub call_count: u64,
}

/// Everything a connector needs to open one authenticated session.
#[derive(Debug, Clone)]
pub struct ConnectSpec {
    pub host: String,
    pub port: u16,
    /// SDK endpoint path, e.g. `/sdk`.
    pub path: String,
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub transport: TransportConfig,
}

/// Opens authenticated sessions against a management endpoint.
pub trait Connector {
    /// Perform the handshake and login described by `spec`.
    fn connect(&self, spec: &ConnectSpec) -> Result<Box<dyn ServiceInstance>, Fault>;
}

impl<C: Connector + ?Sized> Connector for Arc<C> {
    fn connect(&self, spec: &ConnectSpec) -> Result<Box<dyn ServiceInstance>, Fault> {
        (**self).connect(spec)
    }
}

impl<C: Connector + ?Sized> Connector for &C {
    fn connect(&self, spec: &ConnectSpec) -> Result<Box<dyn ServiceInstance>, Fault> {
        (**self).connect(spec)
    }
}

/// A live, authenticated session.
///
/// Not reentrant: callers serialize access to one instance.
pub trait ServiceInstance: Send {
    /// Service content captured at login.
    fn content(&self) -> &ServiceContent;

    /// The session record for the logged-in user, if the server still has one.
    fn current_session(&self) -> Result<Option<UserSession>, Fault>;

    /// The `parent` reference of `object`; `None` for the root folder.
    fn parent(&self, object: &ManagedObjectRef) -> Result<Option<ManagedObjectRef>, Fault>;

    /// Snapshot of every property of `object`.
    fn retrieve_properties(&self, object: &ManagedObjectRef) -> Result<PropertySet, Fault>;

    /// Objects under `container` whose kind satisfies one of `kinds`.
    ///
    /// Equivalent to creating a container view, reading `view`, and
    /// destroying it. With `recursive == false` only direct children are
    /// considered. Order follows the server's inventory order.
    fn container_view(
        &self,
        container: &ManagedObjectRef,
        kinds: &[ManagedObjectKind],
        recursive: bool,
    ) -> Result<Vec<ManagedObjectRef>, Fault>;

    /// End the session on the server.
    fn logout(&mut self) -> Result<(), Fault>;
}
