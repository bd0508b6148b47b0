// ── Inventory flattener ──
//
// Turns property snapshots into flat JSON records for downstream
// inventory consumers. The pure functions take a `PropertySet` and never
// touch the network; the `Client` methods fetch the snapshot first.

pub mod fields;
pub mod vm;

use mce_vsphere_api::{Connector, ManagedObjectKind, ManagedObjectRef, PropertySet};
use serde_json::{Map, Value};
use tracing::trace;

use crate::client::Client;
use crate::error::Error;

/// A flattened object.
pub type Record = Map<String, Value>;

pub fn datacenter(properties: &PropertySet) -> Record {
    fields::project(properties, fields::DATACENTER)
}

pub fn cluster(properties: &PropertySet) -> Record {
    fields::project(properties, fields::CLUSTER)
}

pub fn host(properties: &PropertySet) -> Record {
    fields::project(properties, fields::HOST)
}

pub fn pool(properties: &PropertySet) -> Record {
    fields::project(properties, fields::POOL)
}

/// Datastore record; `provisioned` is `(capacity - freespace) + uncommitted`.
pub fn datastore(object: &ManagedObjectRef, properties: &PropertySet) -> Record {
    let mut record = Record::new();
    record.insert("id".into(), Value::from(object.id()));
    record.extend(fields::project(properties, fields::DATASTORE));

    let number = |key: &str| record.get(key).and_then(Value::as_i64);
    // Out-of-range sizes leave `provisioned` null.
    let provisioned = match (number("capacity"), number("freespace")) {
        (Some(capacity), Some(free)) => {
            let uncommitted = number("uncommitted").unwrap_or(0);
            capacity
                .checked_sub(free)
                .and_then(|used| used.checked_add(uncommitted))
                .map_or(Value::Null, Value::from)
        }
        _ => Value::Null,
    };
    record.insert("provisioned".into(), provisioned);
    record
}

/// Standard network, opaque network or port group. `vms` lists the ids
/// of attached virtual machines.
pub fn network(object: &ManagedObjectRef, properties: &PropertySet) -> Record {
    let mut record = Record::new();
    record.insert("id".into(), Value::from(object.id()));
    record.extend(fields::project(properties, fields::NETWORK));
    let vms: Vec<Value> = properties
        .array("vm")
        .iter()
        .filter_map(|vm| vm.get("value").cloned())
        .collect();
    record.insert("vms".into(), Value::Array(vms));
    record
}

pub fn dvswitch(object: &ManagedObjectRef, properties: &PropertySet) -> Record {
    let mut record = Record::new();
    record.insert("id".into(), Value::from(object.id()));
    record.extend(fields::project(properties, fields::DVSWITCH));
    record
}

/// Record for any supported kind; folders and storage pods get `id` and `name`.
pub fn flatten(object: &ManagedObjectRef, properties: &PropertySet) -> Record {
    match object.kind() {
        ManagedObjectKind::Datacenter => datacenter(properties),
        ManagedObjectKind::ClusterComputeResource | ManagedObjectKind::ComputeResource => {
            cluster(properties)
        }
        ManagedObjectKind::HostSystem => host(properties),
        ManagedObjectKind::ResourcePool | ManagedObjectKind::VirtualApp => pool(properties),
        ManagedObjectKind::Datastore => datastore(object, properties),
        ManagedObjectKind::VirtualMachine => vm::summary(properties),
        ManagedObjectKind::Network
        | ManagedObjectKind::OpaqueNetwork
        | ManagedObjectKind::DistributedVirtualPortgroup => network(object, properties),
        ManagedObjectKind::DistributedVirtualSwitch => dvswitch(object, properties),
        _ => {
            let mut record = Record::new();
            record.insert("id".into(), Value::from(object.id()));
            record.extend(fields::project(properties, &[fields::NAME]));
            record
        }
    }
}

impl<C: Connector> Client<C> {
    fn snapshot(&self, object: &ManagedObjectRef) -> Result<PropertySet, Error> {
        trace!(object = %object, "snapshot");
        Ok(self.service()?.retrieve_properties(object)?)
    }

    /// Flatten any object according to its kind.
    pub fn infos(&self, object: &ManagedObjectRef) -> Result<Record, Error> {
        Ok(flatten(object, &self.snapshot(object)?))
    }

    pub fn datacenter_infos(&self, object: &ManagedObjectRef) -> Result<Record, Error> {
        Ok(datacenter(&self.snapshot(object)?))
    }

    pub fn cluster_infos(&self, object: &ManagedObjectRef) -> Result<Record, Error> {
        Ok(cluster(&self.snapshot(object)?))
    }

    pub fn host_infos(&self, object: &ManagedObjectRef) -> Result<Record, Error> {
        Ok(host(&self.snapshot(object)?))
    }

    pub fn pool_infos(&self, object: &ManagedObjectRef) -> Result<Record, Error> {
        Ok(pool(&self.snapshot(object)?))
    }

    pub fn datastore_infos(&self, object: &ManagedObjectRef) -> Result<Record, Error> {
        Ok(datastore(object, &self.snapshot(object)?))
    }

    pub fn network_infos(&self, object: &ManagedObjectRef) -> Result<Record, Error> {
        Ok(network(object, &self.snapshot(object)?))
    }

    pub fn dvswitch_infos(&self, object: &ManagedObjectRef) -> Result<Record, Error> {
        Ok(dvswitch(object, &self.snapshot(object)?))
    }

    pub fn custom_fields(&self, vm: &ManagedObjectRef) -> Result<Record, Error> {
        Ok(vm::custom_fields(&self.snapshot(vm)?))
    }

    /// Flat VM summary without the raw snapshot.
    pub fn vm_summary(&self, vm: &ManagedObjectRef) -> Result<Record, Error> {
        Ok(vm::summary(&self.snapshot(vm)?))
    }

    /// `{ "vm": <summary>, "properties": <full snapshot> }`.
    pub fn vm_infos(&self, vm: &ManagedObjectRef) -> Result<Record, Error> {
        let properties = self.snapshot(vm)?;
        let mut infos = Record::new();
        infos.insert("vm".into(), Value::Object(vm::summary(&properties)));
        infos.insert("properties".into(), properties.into_value());
        Ok(infos)
    }
}
