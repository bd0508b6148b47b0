// ── Virtual machine record ──

use mce_vsphere_api::PropertySet;
use serde_json::{Map, Value};

use super::fields;

const MIB_PER_GIB: f64 = 1024.0;
const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Flat summary of one VM: table fields plus derived sizes, NICs, and
/// custom fields.
pub fn summary(properties: &PropertySet) -> Map<String, Value> {
    let mut record = fields::project(properties, fields::VM);

    let mem = properties
        .first_of(&["summary.config.memorySizeMB", "config.hardware.memoryMB"])
        .and_then(Value::as_f64)
        .map_or(Value::Null, |mib| Value::from(mib / MIB_PER_GIB));
    record.insert("mem".into(), mem);

    let disk = properties
        .lookup("summary.storage.committed")
        .and_then(Value::as_f64)
        .map_or(Value::Null, |bytes| Value::from(bytes / BYTES_PER_GIB));
    record.insert("diskGB".into(), disk);

    record.insert("net".into(), Value::Object(nics(properties)));
    record.insert("fields".into(), Value::Object(custom_fields(properties)));
    record
}

/// Adapter-backed NICs keyed by MAC address.
///
/// Each entry carries `netlabel` and the NIC's IPv4 addresses; when at
/// least one IPv4 address exists it also carries the prefix length,
/// origin and state of the last one, and the NIC's `connected` flag.
pub fn nics(properties: &PropertySet) -> Map<String, Value> {
    let mut nics = Map::new();
    for nic in properties.array("guest.net") {
        let Some(network) = nic.get("network").filter(|n| !n.is_null()) else {
            continue;
        };
        let Some(mac) = nic.get("macAddress").and_then(Value::as_str) else {
            continue;
        };
        let Some(addresses) = nic
            .get("ipConfig")
            .and_then(|c| c.get("ipAddress"))
            .and_then(Value::as_array)
        else {
            continue;
        };

        let mut entry = Map::new();
        entry.insert("netlabel".into(), network.clone());
        let mut ipv4 = Vec::new();
        for address in addresses {
            let Some(ip) = address.get("ipAddress").and_then(Value::as_str) else {
                continue;
            };
            if ip.contains(':') {
                continue;
            }
            ipv4.push(Value::from(ip));
            for (key, source) in [
                ("prefixLength", address.get("prefixLength")),
                ("connected", nic.get("connected")),
                ("origin", address.get("origin")),
                ("state", address.get("state")),
            ] {
                entry.insert(key.into(), source.cloned().unwrap_or(Value::Null));
            }
        }
        entry.insert("ipAddress".into(), Value::Array(ipv4));
        nics.insert(mac.into(), Value::Object(entry));
    }
    nics
}

/// Custom attribute values keyed by attribute name.
///
/// Only attribute definitions that apply to virtual machines (or to every
/// object type) are considered.
pub fn custom_fields(properties: &PropertySet) -> Map<String, Value> {
    let values = properties.array("customValue");
    let mut fields = Map::new();
    for definition in properties.array("availableField") {
        let applies = definition
            .get("managedObjectType")
            .and_then(Value::as_str)
            .is_none_or(|kind| kind == "VirtualMachine");
        if !applies {
            continue;
        }
        let (Some(key), Some(name)) = (
            definition.get("key"),
            definition.get("name").and_then(Value::as_str),
        ) else {
            continue;
        };
        if let Some(value) = values
            .iter()
            .find(|v| v.get("key") == Some(key))
            .and_then(|v| v.get("value"))
        {
            fields.insert(name.into(), value.clone());
        }
    }
    fields
}
