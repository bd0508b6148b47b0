// mce-vsphere-api: managed-object model and client seams for vSphere inventory

pub mod fault;
pub mod moref;
pub mod properties;
pub mod service;
pub mod transport;

pub use fault::Fault;
pub use moref::{ManagedObjectKind, ManagedObjectRef};
pub use properties::PropertySet;
pub use service::{AboutInfo, ConnectSpec, Connector, ServiceContent, ServiceInstance, UserSession};
pub use transport::{Protocol, TlsContext, TlsMode, TransportConfig};
