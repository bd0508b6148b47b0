// ── Field tables ──
//
// Each output key is backed by an ordered list of property paths; the
// first one set on the snapshot wins. Newer property names come first so
// records keep the same shape across API versions.

use mce_vsphere_api::PropertySet;
use serde_json::{Map, Value};

/// What to emit when none of a field's candidates is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Null,
    Zero,
    EmptyString,
    /// Leave the key out of the record.
    Omit,
}

/// One output key and where to read it from.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub candidates: &'static [&'static str],
    pub fallback: Fallback,
}

const fn field(key: &'static str, candidates: &'static [&'static str]) -> FieldSpec {
    FieldSpec {
        key,
        candidates,
        fallback: Fallback::Null,
    }
}

const fn field_or(
    key: &'static str,
    candidates: &'static [&'static str],
    fallback: Fallback,
) -> FieldSpec {
    FieldSpec {
        key,
        candidates,
        fallback,
    }
}

pub const NAME: FieldSpec = field("name", &["name"]);

pub const DATACENTER: &[FieldSpec] = &[NAME];

pub const CLUSTER: &[FieldSpec] = &[
    NAME,
    field("totalCpu", &["summary.totalCpu"]),
    field("numCpuCores", &["summary.numCpuCores"]),
    field("totalMemory", &["summary.totalMemory"]),
    field("numCpuThreads", &["summary.numCpuThreads"]),
    field("effectiveCpu", &["summary.effectiveCpu"]),
    field("effectiveMemory", &["summary.effectiveMemory"]),
    field("numHosts", &["summary.numHosts"]),
    field("numEffectiveHosts", &["summary.numEffectiveHosts"]),
];

pub const HOST: &[FieldSpec] = &[
    NAME,
    field("managementServerIp", &["summary.managementServerIp"]),
    field("fullName", &["config.product.fullName", "summary.config.product.fullName"]),
    field("version", &["config.product.version", "summary.config.product.version"]),
    field(
        "apiVersion",
        &["config.product.apiVersion", "summary.config.product.apiVersion"],
    ),
];

pub const POOL: &[FieldSpec] = &[NAME];

/// Datastore fields read directly; `id` and `provisioned` are derived.
pub const DATASTORE: &[FieldSpec] = &[
    NAME,
    field("capacity", &["summary.capacity"]),
    field("freespace", &["summary.freeSpace"]),
    field_or("uncommitted", &["summary.uncommitted"], Fallback::Zero),
    field("type", &["summary.type"]),
    field("accessible", &["summary.accessible"]),
    field("maintenance_mode", &["summary.maintenanceMode"]),
];

pub const NETWORK: &[FieldSpec] = &[
    NAME,
    field("accessible", &["summary.accessible"]),
];

pub const DVSWITCH: &[FieldSpec] = &[
    NAME,
    field("uuid", &["uuid", "summary.uuid"]),
    field("numPorts", &["summary.numPorts"]),
    field("numHosts", &["summary.numHosts"]),
    field("productVersion", &["summary.productInfo.version", "config.productInfo.version"]),
];

/// Virtual machine fields read directly; sizes, NICs and custom fields
/// are computed in `vm`.
pub const VM: &[FieldSpec] = &[
    field("name", &["name", "summary.config.name"]),
    field("uuid", &["config.instanceUuid", "summary.config.instanceUuid"]),
    field("bios_uuid", &["config.uuid", "summary.config.uuid"]),
    field("hostname", &["guest.hostName", "summary.guest.hostName"]),
    field("is_template", &["config.template", "summary.config.template"]),
    field("cpu", &["summary.config.numCpu", "config.hardware.numCPU"]),
    field("path", &["summary.config.vmPathName", "config.files.vmPathName"]),
    field("ostype", &["summary.config.guestFullName", "config.guestFullName"]),
    field("state", &["summary.runtime.powerState", "runtime.powerState"]),
    field_or(
        "annotation",
        &["summary.config.annotation", "config.annotation"],
        Fallback::EmptyString,
    ),
    field("boot_time", &["summary.runtime.bootTime", "runtime.bootTime"]),
    field("guestFamily", &["guest.guestFamily"]),
    field("toolsVersion", &["guest.toolsVersion"]),
    field_or(
        "toolsVersionStatus",
        &["guest.toolsVersionStatus2", "guest.toolsVersionStatus"],
        Fallback::Omit,
    ),
    field("toolsStatus", &["guest.toolsStatus2", "guest.toolsStatus"]),
    field("toolsRunningStatus", &["guest.toolsRunningStatus"]),
    field("guestState", &["guest.guestState"]),
    field("guestOperationsReady", &["guest.guestOperationsReady"]),
    field(
        "interactiveGuestOperationsReady",
        &["guest.interactiveGuestOperationsReady"],
    ),
    field("guestStateChangeSupported", &["guest.guestStateChangeSupported"]),
];

/// Project `specs` out of `properties`, in table order.
pub fn project(properties: &PropertySet, specs: &[FieldSpec]) -> Map<String, Value> {
    let mut record = Map::new();
    for spec in specs {
        let value = match (properties.first_of(spec.candidates), spec.fallback) {
            (Some(value), _) => value.clone(),
            (None, Fallback::Null) => Value::Null,
            (None, Fallback::Zero) => Value::from(0),
            (None, Fallback::EmptyString) => Value::from(""),
            (None, Fallback::Omit) => continue,
        };
        record.insert(spec.key.into(), value);
    }
    record
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn props(value: Value) -> PropertySet {
        let Value::Object(map) = value else {
            unreachable!("test literal is an object");
        };
        PropertySet::new(map)
    }

    #[test]
    fn newest_candidate_wins() {
        let p = props(json!({ "guest": { "toolsStatus": "toolsOld", "toolsStatus2": "toolsOk" } }));
        let record = project(&p, &[field("toolsStatus", &["guest.toolsStatus2", "guest.toolsStatus"])]);
        assert_eq!(record["toolsStatus"], json!("toolsOk"));
    }

    #[test]
    fn fallbacks_apply_only_when_unset() {
        let p = props(json!({ "summary": { "uncommitted": null } }));
        let record = project(
            &p,
            &[
                field("missing", &["nope"]),
                field_or("uncommitted", &["summary.uncommitted"], Fallback::Zero),
                field_or("annotation", &["nope"], Fallback::EmptyString),
                field_or("omitted", &["nope"], Fallback::Omit),
            ],
        );
        assert_eq!(
            Value::Object(record),
            json!({ "missing": null, "uncommitted": 0, "annotation": "" })
        );
    }

    #[test]
    fn every_vm_key_is_unique() {
        let mut keys: Vec<&str> = VM.iter().map(|f| f.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), VM.len());
    }
}
