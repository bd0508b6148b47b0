// ── Inventory queries ──
//
// Enumeration and lookup helpers on a connected `Client`. Every call goes
// through a container view rooted at the inventory root folder unless a
// container is given, and returns managed object references; use the
// flatteners in `inventory` or `dump_to_dict` to read their properties.

use mce_vsphere_api::{Connector, Fault, ManagedObjectKind, ManagedObjectRef, UserSession};
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};
use tracing::debug;

use crate::client::Client;
use crate::error::Error;
use crate::identity;

// ── NameMatch ────────────────────────────────────────────────────────

/// How `get_object_by_name` compares object names.
#[derive(Debug, Clone)]
pub enum NameMatch {
    /// Byte-for-byte equality.
    Exact(String),
    /// Regex that must match at the start of the name.
    Pattern(Regex),
}

impl NameMatch {
    pub fn exact(name: impl Into<String>) -> Self {
        Self::Exact(name.into())
    }

    pub fn pattern(pattern: &str) -> Result<Self, Error> {
        Regex::new(pattern)
            .map(Self::Pattern)
            .map_err(|source| Error::InvalidPattern {
                pattern: pattern.to_owned(),
                source,
            })
    }

    /// Whole-name, case-insensitive match of the literal `name`.
    pub fn whole_name_ignore_case(name: &str) -> Result<Self, Error> {
        let pattern = format!("^{}$", regex::escape(name));
        RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map(Self::Pattern)
            .map_err(|source| Error::InvalidPattern { pattern, source })
    }

    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(expected) => expected == name,
            Self::Pattern(re) => re.find(name).is_some_and(|m| m.start() == 0),
        }
    }
}

impl<C: Connector> Client<C> {
    // ── Service information ──────────────────────────────────────────

    /// The server's `about` block.
    pub fn vcenter_infos(&self) -> Result<Map<String, Value>, Error> {
        let about = &self.content()?.about;
        let mut infos = Map::new();
        for (key, value) in [
            ("version", &about.version),
            ("build", &about.build),
            ("osType", &about.os_type),
            ("apiType", &about.api_type),
            ("apiVersion", &about.api_version),
            ("licenseProductName", &about.license_product_name),
            ("licenseProductVersion", &about.license_product_version),
        ] {
            infos.insert(key.into(), Value::from(value.as_str()));
        }
        Ok(infos)
    }

    /// The logged-in user's session record; `loginTime` is RFC 3339.
    pub fn current_session(&self) -> Result<Map<String, Value>, Error> {
        let mut data = Map::new();
        let Some(session) = self.service()?.current_session()? else {
            return Ok(data);
        };
        let UserSession {
            user_name,
            full_name,
            ip_address,
            user_agent,
            locale,
            login_time,
            call_count,
            ..
        } = session;
        data.insert("userName".into(), user_name.into());
        data.insert("fullName".into(), full_name.into());
        data.insert("ipAddress".into(), ip_address.into());
        data.insert("userAgent".into(), user_agent.into());
        data.insert("locale".into(), locale.into());
        data.insert("loginTime".into(), login_time.to_rfc3339().into());
        data.insert("callCount".into(), call_count.into());
        Ok(data)
    }

    // ── Enumeration ──────────────────────────────────────────────────

    /// Every object under `container` that is a `kind`.
    pub fn get_all(
        &self,
        container: &ManagedObjectRef,
        kind: ManagedObjectKind,
        recursive: bool,
    ) -> Result<Vec<ManagedObjectRef>, Error> {
        let objects: Vec<ManagedObjectRef> = self
            .service()?
            .container_view(container, &[kind], recursive)?
            .into_iter()
            .filter(|object| object.kind().is_a(kind))
            .collect();
        debug!(container = %container, %kind, count = objects.len(), "enumerated");
        Ok(objects)
    }

    fn get_all_from_root(&self, kind: ManagedObjectKind) -> Result<Vec<ManagedObjectRef>, Error> {
        let root = self.content()?.root_folder.clone();
        self.get_all(&root, kind, true)
    }

    pub fn get_all_folders(&self) -> Result<Vec<ManagedObjectRef>, Error> {
        self.get_all_from_root(ManagedObjectKind::Folder)
    }

    pub fn get_all_hosts(&self) -> Result<Vec<ManagedObjectRef>, Error> {
        self.get_all_from_root(ManagedObjectKind::HostSystem)
    }

    pub fn get_all_pools(&self) -> Result<Vec<ManagedObjectRef>, Error> {
        self.get_all_from_root(ManagedObjectKind::ResourcePool)
    }

    pub fn get_all_clusters(&self) -> Result<Vec<ManagedObjectRef>, Error> {
        self.get_all_from_root(ManagedObjectKind::ClusterComputeResource)
    }

    pub fn get_all_datacenters(&self) -> Result<Vec<ManagedObjectRef>, Error> {
        self.get_all_from_root(ManagedObjectKind::Datacenter)
    }

    pub fn get_all_datastores(&self) -> Result<Vec<ManagedObjectRef>, Error> {
        self.get_all_from_root(ManagedObjectKind::Datastore)
    }

    pub fn get_all_vms(&self) -> Result<Vec<ManagedObjectRef>, Error> {
        self.get_all_from_root(ManagedObjectKind::VirtualMachine)
    }

    pub fn get_all_networks(&self) -> Result<Vec<ManagedObjectRef>, Error> {
        self.get_all_from_root(ManagedObjectKind::Network)
    }

    pub fn get_all_dvswitches(&self) -> Result<Vec<ManagedObjectRef>, Error> {
        self.get_all_from_root(ManagedObjectKind::DistributedVirtualSwitch)
    }

    pub fn get_all_dport_groups(&self) -> Result<Vec<ManagedObjectRef>, Error> {
        self.get_all_from_root(ManagedObjectKind::DistributedVirtualPortgroup)
    }

    pub fn get_hosts_in_datacenter(
        &self,
        datacenter: &ManagedObjectRef,
    ) -> Result<Vec<ManagedObjectRef>, Error> {
        self.get_all(datacenter, ManagedObjectKind::HostSystem, true)
    }

    pub fn get_vms_in_datacenter(
        &self,
        datacenter: &ManagedObjectRef,
    ) -> Result<Vec<ManagedObjectRef>, Error> {
        self.get_all(datacenter, ManagedObjectKind::VirtualMachine, true)
    }

    // ── Lookups ──────────────────────────────────────────────────────

    /// First object of `kind`, in inventory order, whose name matches.
    pub fn get_object_by_name(
        &self,
        kind: ManagedObjectKind,
        matcher: &NameMatch,
    ) -> Result<Option<ManagedObjectRef>, Error> {
        let service = self.service()?;
        for object in self.get_all_from_root(kind)? {
            let properties = service.retrieve_properties(&object)?;
            if properties.name().is_some_and(|name| matcher.matches(name)) {
                return Ok(Some(object));
            }
        }
        Ok(None)
    }

    /// Virtual machine whose whole name equals `name`, ignoring case.
    ///
    /// With `raise` set a miss is `ResourceNotFound`; otherwise `None`.
    /// `name` is matched literally; for regex lookups pass
    /// [`NameMatch::pattern`] to [`Client::get_object_by_name`].
    pub fn get_vm_by_name(&self, name: &str, raise: bool) -> Result<Option<ManagedObjectRef>, Error> {
        let matcher = NameMatch::whole_name_ignore_case(name)?;
        let found = self.get_object_by_name(ManagedObjectKind::VirtualMachine, &matcher)?;
        if found.is_none() && raise {
            return Err(self.not_found(ManagedObjectKind::VirtualMachine, name));
        }
        Ok(found)
    }

    /// Object of `kind` with managed object id `id`, if the server knows it.
    pub fn get_object_by_id(
        &self,
        kind: ManagedObjectKind,
        id: &str,
        raise: bool,
    ) -> Result<Option<ManagedObjectRef>, Error> {
        let object = ManagedObjectRef::new(kind, id);
        match self.service()?.retrieve_properties(&object) {
            Ok(_) => Ok(Some(object)),
            Err(Fault::ManagedObjectNotFound(_)) if raise => Err(self.not_found(kind, id)),
            Err(Fault::ManagedObjectNotFound(_)) => Ok(None),
            Err(fault) => Err(fault.into()),
        }
    }

    pub(crate) fn not_found(&self, kind: ManagedObjectKind, name: &str) -> Error {
        let config = self.config();
        Error::ResourceNotFound {
            kind: kind.label().into(),
            name: name.into(),
            host: config.host.clone(),
            port: config.port,
            username: config.username.clone().unwrap_or_default(),
        }
    }

    // ── Identity & raw properties ────────────────────────────────────

    /// Root-to-object id chain, see [`identity::resource_id`].
    pub fn resource_id(&self, object: &ManagedObjectRef) -> Result<String, Error> {
        identity::resource_id(self.service()?, object)
    }

    /// Full property snapshot of `object` as JSON.
    pub fn dump_to_dict(&self, object: &ManagedObjectRef) -> Result<Value, Error> {
        Ok(self.service()?.retrieve_properties(object)?.into_value())
    }
}
