// ── Managed object references ──
//
// A `ManagedObjectRef` is the client-side handle for a server-side entity:
// its VMODL type plus the opaque `_moId` the server assigned. Every other
// piece of data (name, parent, summary, config) is fetched through a
// `ServiceInstance` using this handle.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

// ── ManagedObjectKind ───────────────────────────────────────────────

/// VMODL managed object types this client knows how to enumerate.
///
/// `Display` / `FromStr` use the VMODL type name without the `vim.`
/// namespace (`VirtualMachine`, `dvs.DistributedVirtualPortgroup` is
/// spelled `DistributedVirtualPortgroup`).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[non_exhaustive]
pub enum ManagedObjectKind {
    Folder,
    Datacenter,
    ComputeResource,
    ClusterComputeResource,
    HostSystem,
    ResourcePool,
    VirtualApp,
    VirtualMachine,
    Datastore,
    StoragePod,
    Network,
    OpaqueNetwork,
    DistributedVirtualSwitch,
    DistributedVirtualPortgroup,
}

impl ManagedObjectKind {
    /// Whether an object of kind `self` also satisfies a filter on `filter`.
    ///
    /// Mirrors VMODL inheritance for the types a container view can be
    /// asked for: a cluster is a compute resource, a vApp is a resource
    /// pool, a storage pod is a folder, and opaque networks and port
    /// groups are networks.
    pub fn is_a(self, filter: Self) -> bool {
        if self == filter {
            return true;
        }
        matches!(
            (self, filter),
            (Self::ClusterComputeResource, Self::ComputeResource)
                | (Self::VirtualApp, Self::ResourcePool)
                | (Self::StoragePod, Self::Folder)
                | (Self::OpaqueNetwork | Self::DistributedVirtualPortgroup, Self::Network)
        )
    }

    /// Short lower-case label used in log fields and error messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::Datacenter => "datacenter",
            Self::ComputeResource => "compute resource",
            Self::ClusterComputeResource => "cluster",
            Self::HostSystem => "host",
            Self::ResourcePool => "pool",
            Self::VirtualApp => "vapp",
            Self::VirtualMachine => "vm",
            Self::Datastore => "datastore",
            Self::StoragePod => "storage pod",
            Self::Network => "network",
            Self::OpaqueNetwork => "opaque network",
            Self::DistributedVirtualSwitch => "dvswitch",
            Self::DistributedVirtualPortgroup => "port group",
        }
    }
}

// ── ManagedObjectRef ────────────────────────────────────────────────

/// Reference to a managed object on the server (`type` + `_moId`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManagedObjectRef {
    #[serde(rename = "type")]
    kind: ManagedObjectKind,
    #[serde(rename = "value")]
    id: String,
}

impl ManagedObjectRef {
    pub fn new(kind: ManagedObjectKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ManagedObjectKind {
        self.kind
    }

    /// The server-assigned managed object id (`_moId`), e.g. `datacenter-2`.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for ManagedObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
