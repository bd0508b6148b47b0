// mce-vsphere-core: session handling and inventory flattening for vCenter.
//
// Talks to a server only through the `mce_vsphere_api::Connector` seam;
// never reads configuration files or the environment.

pub mod client;
pub mod config;
pub mod error;
pub mod guest;
pub mod identity;
pub mod inventory;
pub mod query;
pub mod roles;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::{Client, ConnectionState, Session};
pub use config::{ConnectionConfig, ConnectionDefaults, ConnectionDescriptor};
pub use error::Error;
pub use guest::VmSelector;
pub use identity::{MAX_PARENT_DEPTH, resource_id};
pub use inventory::Record;
pub use query::NameMatch;
pub use roles::{Role, role_name};

// The seam types callers need alongside a `Client`.
pub use mce_vsphere_api::{Fault, ManagedObjectKind, ManagedObjectRef, PropertySet};
