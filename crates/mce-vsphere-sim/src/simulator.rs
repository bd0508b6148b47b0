// ── In-process vCenter simulator ──
//
// Serves an `Inventory` through the `Connector` / `ServiceInstance` seam.
// The listening address, accepted credentials, and SDK path behave like a
// real endpoint: a mismatched host or port is a refused connection, a
// wrong password is `InvalidLogin`, an unknown path is a 404. Faults can be
// injected into connect and logout to drive the error paths.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use mce_vsphere_api::{
    AboutInfo, ConnectSpec, Connector, Fault, ManagedObjectKind, ManagedObjectRef, PropertySet,
    Protocol, ServiceContent, ServiceInstance, UserSession,
};
use secrecy::ExposeSecret;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::inventory::Inventory;
use crate::vpx;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8989;
pub const DEFAULT_PATH: &str = "/sdk";
pub const DEFAULT_USERNAME: &str = "user1";
pub const DEFAULT_PASSWORD: &str = "pass";

const USER_AGENT: &str = concat!("mce-vsphere/", env!("CARGO_PKG_VERSION"));

type FaultFactory = Arc<dyn Fn() -> Fault + Send + Sync>;

#[derive(Default)]
struct Knobs {
    connect_fault: Option<FaultFactory>,
    logout_fault: Option<FaultFactory>,
    last_connect: Option<ConnectSpec>,
}

struct SimulatorInner {
    inventory: Inventory,
    about: AboutInfo,
    host: String,
    port: u16,
    path: String,
    protocol: Protocol,
    username: String,
    password: String,
    knobs: Mutex<Knobs>,
    logins: AtomicU64,
    logouts: AtomicU64,
}

/// A simulated vCenter endpoint. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct Simulator {
    inner: Arc<SimulatorInner>,
}

impl fmt::Debug for Simulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulator")
            .field("host", &self.inner.host)
            .field("port", &self.inner.port)
            .field("objects", &self.inner.inventory.len())
            .finish_non_exhaustive()
    }
}

impl Simulator {
    /// Default two-datacenter inventory on `https://127.0.0.1:8989/sdk`,
    /// accepting `user1` / `pass`.
    pub fn vpx() -> Self {
        SimulatorBuilder::new(vpx::inventory()).build()
    }

    pub fn builder(inventory: Inventory) -> SimulatorBuilder {
        SimulatorBuilder::new(inventory)
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inner.inventory
    }

    /// Connection URL with credentials embedded, as `vcsim` prints it.
    pub fn url(&self) -> String {
        format!(
            "{}://{}:{}@{}:{}{}",
            self.inner.protocol,
            self.inner.username,
            self.inner.password,
            self.inner.host,
            self.inner.port,
            self.inner.path,
        )
    }

    pub fn host(&self) -> &str {
        &self.inner.host
    }

    pub fn port(&self) -> u16 {
        self.inner.port
    }

    pub fn username(&self) -> &str {
        &self.inner.username
    }

    pub fn password(&self) -> &str {
        &self.inner.password
    }

    /// Fail every subsequent connect with the fault `make` builds.
    pub fn fail_connect_with(&self, make: impl Fn() -> Fault + Send + Sync + 'static) {
        self.knobs().connect_fault = Some(Arc::new(make));
    }

    /// Fail every subsequent logout with the fault `make` builds.
    pub fn fail_logout_with(&self, make: impl Fn() -> Fault + Send + Sync + 'static) {
        self.knobs().logout_fault = Some(Arc::new(make));
    }

    pub fn clear_faults(&self) {
        let mut knobs = self.knobs();
        knobs.connect_fault = None;
        knobs.logout_fault = None;
    }

    /// Parameters of the most recent connect attempt, successful or not.
    pub fn last_connect(&self) -> Option<ConnectSpec> {
        self.knobs().last_connect.clone()
    }

    /// Sessions opened so far.
    pub fn logins(&self) -> u64 {
        self.inner.logins.load(Ordering::SeqCst)
    }

    /// Sessions closed through a successful logout.
    pub fn logouts(&self) -> u64 {
        self.inner.logouts.load(Ordering::SeqCst)
    }

    /// Sessions opened and not yet logged out.
    pub fn active_sessions(&self) -> u64 {
        self.logins().saturating_sub(self.logouts())
    }

    fn knobs(&self) -> std::sync::MutexGuard<'_, Knobs> {
        self.inner.knobs.lock().expect("simulator knobs lock poisoned")
    }

    fn handshake(&self, spec: &ConnectSpec) -> Result<(), Fault> {
        let inner = &self.inner;
        if spec.host != inner.host || spec.port != inner.port {
            return Err(Fault::from(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                format!("[Errno 111] Connection refused ({}:{})", spec.host, spec.port),
            )));
        }
        if spec.transport.protocol != inner.protocol {
            return Err(Fault::transport(format!(
                "remote end closed connection without response ({} to {} endpoint)",
                spec.transport.protocol, inner.protocol
            )));
        }
        if spec.transport.protocol == Protocol::Https && spec.transport.tls.is_none() {
            return Err(Fault::Tls("https requested without a TLS context".into()));
        }
        if spec.path != inner.path {
            return Err(Fault::Other(format!("404 Not Found: {}", spec.path)));
        }

        let username_ok = spec.username.as_deref() == Some(inner.username.as_str());
        let password_ok = spec
            .password
            .as_ref()
            .is_some_and(|p| p.expose_secret() == inner.password);
        if username_ok && password_ok {
            Ok(())
        } else {
            Err(Fault::InvalidLogin)
        }
    }
}

impl Connector for Simulator {
    fn connect(&self, spec: &ConnectSpec) -> Result<Box<dyn ServiceInstance>, Fault> {
        debug!(host = %spec.host, port = spec.port, path = %spec.path, "simulator connect");
        let injected = {
            let mut knobs = self.knobs();
            knobs.last_connect = Some(spec.clone());
            knobs.connect_fault.clone()
        };
        if let Some(make) = injected {
            return Err(make());
        }
        self.handshake(spec)?;

        self.inner.logins.fetch_add(1, Ordering::SeqCst);
        let user = spec.username.clone().unwrap_or_default();
        let session = UserSession {
            key: Uuid::new_v4().to_string(),
            full_name: user.clone(),
            user_name: user,
            ip_address: DEFAULT_HOST.into(),
            user_agent: USER_AGENT.into(),
            locale: "en_US".into(),
            login_time: Utc::now(),
            call_count: 0,
        };
        Ok(Box::new(SimService {
            simulator: self.clone(),
            content: ServiceContent {
                about: self.inner.about.clone(),
                root_folder: self.inner.inventory.root().clone(),
            },
            session,
            call_count: AtomicU64::new(0),
            logged_out: false,
        }))
    }
}

// ── SimulatorBuilder ────────────────────────────────────────────────

/// Customizes the endpoint a [`Simulator`] pretends to be.
pub struct SimulatorBuilder {
    inventory: Inventory,
    about: AboutInfo,
    host: String,
    port: u16,
    path: String,
    protocol: Protocol,
    username: String,
    password: String,
}

impl SimulatorBuilder {
    pub fn new(inventory: Inventory) -> Self {
        Self {
            inventory,
            about: vpx::about(),
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
            path: DEFAULT_PATH.into(),
            protocol: Protocol::Https,
            username: DEFAULT_USERNAME.into(),
            password: DEFAULT_PASSWORD.into(),
        }
    }

    pub fn listen(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = username.into();
        self.password = password.into();
        self
    }

    pub fn about(mut self, about: AboutInfo) -> Self {
        self.about = about;
        self
    }

    pub fn build(self) -> Simulator {
        Simulator {
            inner: Arc::new(SimulatorInner {
                inventory: self.inventory,
                about: self.about,
                host: self.host,
                port: self.port,
                path: self.path,
                protocol: self.protocol,
                username: self.username,
                password: self.password,
                knobs: Mutex::new(Knobs::default()),
                logins: AtomicU64::new(0),
                logouts: AtomicU64::new(0),
            }),
        }
    }
}

// ── SimService ──────────────────────────────────────────────────────

/// One authenticated session against a [`Simulator`].
struct SimService {
    simulator: Simulator,
    content: ServiceContent,
    session: UserSession,
    call_count: AtomicU64,
    logged_out: bool,
}

impl SimService {
    fn call(&self) -> Result<&Inventory, Fault> {
        if self.logged_out {
            return Err(Fault::NotAuthenticated);
        }
        self.call_count.fetch_add(1, Ordering::Relaxed);
        Ok(self.simulator.inventory())
    }
}

impl ServiceInstance for SimService {
    fn content(&self) -> &ServiceContent {
        &self.content
    }

    fn current_session(&self) -> Result<Option<UserSession>, Fault> {
        self.call()?;
        Ok(Some(UserSession {
            call_count: self.call_count.load(Ordering::Relaxed),
            ..self.session.clone()
        }))
    }

    fn parent(&self, object: &ManagedObjectRef) -> Result<Option<ManagedObjectRef>, Fault> {
        self.call()?.parent(object)
    }

    fn retrieve_properties(&self, object: &ManagedObjectRef) -> Result<PropertySet, Fault> {
        trace!(object = %object, "retrieve properties");
        self.call()?.properties(object)
    }

    fn container_view(
        &self,
        container: &ManagedObjectRef,
        kinds: &[ManagedObjectKind],
        recursive: bool,
    ) -> Result<Vec<ManagedObjectRef>, Fault> {
        self.call()?.view(container, kinds, recursive)
    }

    fn logout(&mut self) -> Result<(), Fault> {
        let injected = self.simulator.knobs().logout_fault.clone();
        if let Some(make) = injected {
            return Err(make());
        }
        if self.logged_out {
            return Err(Fault::NotAuthenticated);
        }
        self.logged_out = true;
        self.simulator.inner.logouts.fetch_add(1, Ordering::SeqCst);
        debug!(session = %self.session.key, "simulator logout");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use mce_vsphere_api::{TlsMode, TransportConfig};
    use secrecy::SecretString;

    use super::*;

    fn spec(sim: &Simulator) -> ConnectSpec {
        ConnectSpec {
            host: sim.host().into(),
            port: sim.port(),
            path: DEFAULT_PATH.into(),
            username: Some(sim.username().into()),
            password: Some(SecretString::from(sim.password().to_owned())),
            transport: TransportConfig::secure(
                &TlsMode::DangerAcceptInvalid,
                Duration::from_secs(60),
                5,
            )
            .unwrap(),
        }
    }

    #[test]
    fn connect_and_logout() {
        let sim = Simulator::vpx();
        let mut si = sim.connect(&spec(&sim)).unwrap();
        assert_eq!(si.content().root_folder.id(), "group-d1");
        assert_eq!(sim.active_sessions(), 1);
        si.logout().unwrap();
        assert_eq!(sim.active_sessions(), 0);
        assert!(matches!(
            si.retrieve_properties(&si.content().root_folder.clone()),
            Err(Fault::NotAuthenticated)
        ));
    }

    #[test]
    fn wrong_port_is_refused() {
        let sim = Simulator::vpx();
        let mut bad = spec(&sim);
        bad.port = 1;
        let err = sim.connect(&bad).err().unwrap();
        assert!(err.is_transport(), "got {err:?}");
        assert_eq!(sim.last_connect().unwrap().port, 1);
    }

    #[test]
    fn wrong_password_is_invalid_login() {
        let sim = Simulator::vpx();
        let mut bad = spec(&sim);
        bad.password = Some(SecretString::from("nope".to_owned()));
        assert!(sim.connect(&bad).err().unwrap().is_invalid_login());
        assert_eq!(sim.logins(), 0);
    }

    #[test]
    fn injected_fault_wins() {
        let sim = Simulator::vpx();
        sim.fail_connect_with(|| Fault::Other("boom".into()));
        assert!(matches!(sim.connect(&spec(&sim)), Err(Fault::Other(_))));
        sim.clear_faults();
        assert!(sim.connect(&spec(&sim)).is_ok());
    }

    #[test]
    fn call_count_tracks_requests() {
        let sim = Simulator::vpx();
        let si = sim.connect(&spec(&sim)).unwrap();
        let root = si.content().root_folder.clone();
        si.retrieve_properties(&root).unwrap();
        si.parent(&root).unwrap();
        let session = si.current_session().unwrap().unwrap();
        assert_eq!(session.call_count, 3);
        assert_eq!(session.user_name, DEFAULT_USERNAME);
    }

    #[test]
    #[should_panic(expected = "simulator knobs lock poisoned")]
    fn poisoned_knobs_name_the_lock() {
        let sim = Simulator::vpx();
        let holder = sim.clone();
        let _ = std::thread::spawn(move || {
            let _knobs = holder.inner.knobs.lock().unwrap();
            panic!("poison");
        })
        .join();
        sim.last_connect();
    }
}
