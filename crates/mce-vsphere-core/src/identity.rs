// ── Resource identity ──
//
// A resource id is the chain of managed object ids from the root folder
// down to the object, joined with `/` and lower-cased:
// `group-d1/datacenter-2/group-v3/vm-14`. It reflects the inventory at the
// time of the call; moving an object changes its id.

use std::collections::HashSet;

use mce_vsphere_api::{ManagedObjectRef, ServiceInstance};
use tracing::trace;

use crate::error::Error;

/// Longest parent chain `resource_id` will follow.
pub const MAX_PARENT_DEPTH: usize = 256;

/// Derive the resource id of `object` by walking its parents.
pub fn resource_id<S>(service: &S, object: &ManagedObjectRef) -> Result<String, Error>
where
    S: ServiceInstance + ?Sized,
{
    let mut chain = vec![object.id().to_lowercase()];
    let mut seen = HashSet::from([object.clone()]);
    let mut next = service.parent(object)?;

    while let Some(parent) = next {
        if chain.len() >= MAX_PARENT_DEPTH || !seen.insert(parent.clone()) {
            return Err(Error::CycleDetected {
                object: object.to_string(),
                max_depth: MAX_PARENT_DEPTH,
            });
        }
        chain.push(parent.id().to_lowercase());
        next = service.parent(&parent)?;
    }

    chain.reverse();
    let id = chain.join("/");
    trace!(object = %object, resource_id = %id, "derived resource id");
    Ok(id)
}
