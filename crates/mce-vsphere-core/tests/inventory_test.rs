// Integration tests for enumeration, identity and flattening against the
// default simulator inventory.
#![allow(clippy::unwrap_used)]

use mce_vsphere_core::{
    Client, ConnectionDefaults, ConnectionDescriptor, Error, ManagedObjectKind, ManagedObjectRef,
    NameMatch, VmSelector, role_name,
};
use mce_vsphere_sim::{InventoryBuilder, Simulator};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

// ── Helpers ─────────────────────────────────────────────────────────

fn connect(sim: &Simulator) -> Client<Simulator> {
    let config = ConnectionDescriptor::url(sim.url())
        .resolve(&ConnectionDefaults::default())
        .unwrap();
    let mut client = Client::new(config, sim.clone());
    client.connect().unwrap();
    client
}

fn setup() -> Client<Simulator> {
    connect(&Simulator::vpx())
}

fn named(client: &Client<Simulator>, kind: ManagedObjectKind, name: &str) -> ManagedObjectRef {
    client
        .get_object_by_name(kind, &NameMatch::exact(name))
        .unwrap()
        .unwrap()
}

// ── Service information ─────────────────────────────────────────────

#[test]
fn test_vcenter_infos() {
    let client = setup();
    assert_eq!(
        Value::Object(client.vcenter_infos().unwrap()),
        json!({
            "version": "6.5.0",
            "build": "5973321",
            "osType": "linux-amd64",
            "apiType": "VirtualCenter",
            "apiVersion": "6.5",
            "licenseProductName": "VMware VirtualCenter Server",
            "licenseProductVersion": "6.0",
        })
    );
}

#[test]
fn test_current_session() {
    let client = setup();
    let session = client.current_session().unwrap();
    assert_eq!(session["userName"], json!("user1"));
    assert!(session["loginTime"].as_str().unwrap().contains('T'));
    assert!(session["callCount"].as_u64().unwrap() >= 1);
}

// ── Enumeration ─────────────────────────────────────────────────────

#[test]
fn test_enumeration_counts() {
    let client = setup();
    assert_eq!(client.get_all_datacenters().unwrap().len(), 2);
    assert_eq!(client.get_all_hosts().unwrap().len(), 8);
    assert_eq!(client.get_all_clusters().unwrap().len(), 2);
    assert_eq!(client.get_all_vms().unwrap().len(), 8);
    assert_eq!(client.get_all_datastores().unwrap().len(), 2);
    assert_eq!(client.get_all_dvswitches().unwrap().len(), 2);
    assert_eq!(client.get_all_dport_groups().unwrap().len(), 2);
}

#[test]
fn test_datacenter_scoped_enumeration() {
    let client = setup();
    let dc = &client.get_all_datacenters().unwrap()[0];
    assert_eq!(client.get_hosts_in_datacenter(dc).unwrap().len(), 4);
    assert_eq!(client.get_vms_in_datacenter(dc).unwrap().len(), 4);
}

// ── Flattened records ───────────────────────────────────────────────

#[test]
fn test_cluster_infos() {
    let client = setup();
    let cluster = &client.get_all_clusters().unwrap()[0];
    assert_eq!(
        Value::Object(client.cluster_infos(cluster).unwrap()),
        json!({
            "name": "DC0_C0",
            "totalCpu": 6882,
            "numCpuCores": 6,
            "totalMemory": 12_883_292_160_i64,
            "numCpuThreads": 6,
            "effectiveCpu": 6882,
            "effectiveMemory": 12_883_292_160_i64,
            "numHosts": 3,
            "numEffectiveHosts": 3,
        })
    );
}

#[test]
fn test_host_infos() {
    let client = setup();
    let host = &client.get_all_hosts().unwrap()[0];
    assert_eq!(
        Value::Object(client.host_infos(host).unwrap()),
        json!({
            "name": "DC0_H0",
            "managementServerIp": null,
            "fullName": "VMware ESXi 6.5.0 build-5969303",
            "version": "6.5.0",
            "apiVersion": "6.5",
        })
    );
}

#[test]
fn test_pool_infos() {
    let client = setup();
    let pool = &client.get_all_pools().unwrap()[0];
    assert_eq!(
        Value::Object(client.pool_infos(pool).unwrap()),
        json!({ "name": "Resources" })
    );
}

#[test]
fn test_datastore_infos() {
    let client = setup();
    let ds = &client.get_all_datastores().unwrap()[0];
    let mut record = client.datastore_infos(ds).unwrap();
    assert_eq!(record.remove("id"), Some(json!(ds.id())));
    assert_eq!(
        Value::Object(record),
        json!({
            "name": "LocalDS_0",
            "capacity": 3_117_400_064_i64,
            "freespace": 3_083_849_728_i64,
            "uncommitted": 0,
            "type": "OTHER",
            "accessible": true,
            "maintenance_mode": "normal",
            "provisioned": 33_550_336,
        })
    );
}

#[test]
fn test_vm_summary() {
    let client = setup();
    let vm = client.get_vm_by_name("DC0_H0_VM0", true).unwrap().unwrap();
    let mut record = client.vm_summary(&vm).unwrap();
    for volatile in ["boot_time", "uuid", "bios_uuid"] {
        assert!(record.remove(volatile).is_some(), "missing {volatile}");
    }
    assert_eq!(
        Value::Object(record),
        json!({
            "name": "DC0_H0_VM0",
            "hostname": null,
            "is_template": false,
            "cpu": 1,
            "path": "[LocalDS_0] DC0_H0_VM0/DC0_H0_VM0.vmx",
            "ostype": "otherGuest",
            "state": "poweredOn",
            "annotation": "",
            "guestFamily": "linuxGuest",
            "toolsVersion": "0",
            "toolsStatus": "toolsNotInstalled",
            "toolsRunningStatus": "guestToolsNotRunning",
            "guestState": "",
            "guestOperationsReady": null,
            "interactiveGuestOperationsReady": null,
            "guestStateChangeSupported": null,
            "mem": 0.031_25,
            "diskGB": 0.0,
            "net": {},
            "fields": {},
        })
    );
}

#[test]
fn test_running_vm_reports_its_nic() {
    let client = setup();
    let vm = client.get_vm_by_name("DC0_C0_RP0_VM0", true).unwrap().unwrap();
    let infos = client.vm_infos(&vm).unwrap();
    assert_eq!(
        infos["vm"]["net"],
        json!({
            "00:50:56:00:00:00": {
                "netlabel": "VM Network",
                "ipAddress": ["10.0.0.10"],
                "prefixLength": 24,
                "connected": true,
                "origin": "dhcp",
                "state": "preferred",
            },
        })
    );
    assert_eq!(infos["vm"]["toolsVersionStatus"], json!("guestToolsCurrent"));
    assert_eq!(infos["properties"]["name"], json!("DC0_C0_RP0_VM0"));
}

#[test]
fn test_network_lists_vm_ids() {
    let client = setup();
    let network = named(&client, ManagedObjectKind::Network, "VM Network");
    let record = client.network_infos(&network).unwrap();
    assert_eq!(record["vms"].as_array().unwrap().len(), 4);
    assert!(
        record["vms"]
            .as_array()
            .unwrap()
            .iter()
            .all(|id| id.as_str().unwrap().starts_with("vm-"))
    );
}

#[test]
fn test_infos_dispatches_on_kind() {
    let client = setup();
    let dc = &client.get_all_datacenters().unwrap()[0];
    assert_eq!(Value::Object(client.infos(dc).unwrap()), json!({ "name": "DC0" }));

    let dvs = named(&client, ManagedObjectKind::DistributedVirtualSwitch, "DC0_DVS");
    let record = client.infos(&dvs).unwrap();
    assert_eq!(record["numHosts"], json!(4));
    assert_eq!(record["productVersion"], json!("6.5.0"));
}

// ── Identity ────────────────────────────────────────────────────────

#[test]
fn test_resource_id_of_first_datacenter() {
    let client = setup();
    let dc = &client.get_all_datacenters().unwrap()[0];
    assert_eq!(client.resource_id(dc).unwrap(), "group-d1/datacenter-2");
    assert_eq!(client.resource_id(dc).unwrap(), client.resource_id(dc).unwrap());
}

#[test]
fn test_resource_id_of_vm_walks_folders() {
    let client = setup();
    let vm = client.get_vm_by_name("DC0_H0_VM0", true).unwrap().unwrap();
    let id = client.resource_id(&vm).unwrap();
    assert!(id.starts_with("group-d1/datacenter-2/group-v"), "got {id}");
    assert!(id.ends_with(&format!("/{}", vm.id())));
}

#[test]
fn test_resource_id_rejects_parent_cycles() {
    let mut builder = InventoryBuilder::new();
    let root = builder.root();
    let folder = builder.add(ManagedObjectKind::Folder, &root, "loop", json!({}));
    let dc = builder.add(ManagedObjectKind::Datacenter, &folder, "DC", json!({}));
    builder.set_parent(&folder, Some(&dc));
    let sim = Simulator::builder(builder.build()).build();

    let client = connect(&sim);
    let err = client.resource_id(&dc).unwrap_err();
    assert!(matches!(err, Error::CycleDetected { .. }), "got {err:?}");
}

// ── Lookups ─────────────────────────────────────────────────────────

#[test]
fn test_vm_lookup_ignores_case_but_not_partial_names() {
    let client = setup();
    assert!(client.get_vm_by_name("dc0_h0_vm0", false).unwrap().is_some());
    assert!(client.get_vm_by_name("DC0_H0", false).unwrap().is_none());
}

#[test]
fn test_vm_lookup_treats_name_literally() {
    let client = setup();
    assert!(client.get_vm_by_name("DC0_H0_VM.*", false).unwrap().is_none());

    let matcher = NameMatch::pattern("DC0_H0_VM.*").unwrap();
    assert!(
        client
            .get_object_by_name(ManagedObjectKind::VirtualMachine, &matcher)
            .unwrap()
            .is_some()
    );
}

#[test]
fn test_vm_lookup_miss_with_raise() {
    let client = setup();
    let err = client.get_vm_by_name("ghost", true).unwrap_err();
    assert_eq!(
        err.to_string(),
        "vm [ghost] not found in vcenter [127.0.0.1:8989] for username [user1]"
    );
}

#[test]
fn test_object_by_id() {
    let client = setup();
    let dc = client
        .get_object_by_id(ManagedObjectKind::Datacenter, "datacenter-2", true)
        .unwrap();
    assert_eq!(dc.unwrap().id(), "datacenter-2");
    assert!(
        client
            .get_object_by_id(ManagedObjectKind::Datacenter, "datacenter-999", false)
            .unwrap()
            .is_none()
    );
    assert!(matches!(
        client.get_object_by_id(ManagedObjectKind::Datacenter, "datacenter-999", true),
        Err(Error::ResourceNotFound { .. })
    ));
}

#[test]
fn test_pattern_lookup_is_anchored_at_start() {
    let client = setup();
    let matcher = NameMatch::pattern("DC1_C0_RP0_VM").unwrap();
    let vm = client
        .get_object_by_name(ManagedObjectKind::VirtualMachine, &matcher)
        .unwrap()
        .unwrap();
    let record = client.vm_summary(&vm).unwrap();
    assert_eq!(record["name"], json!("DC1_C0_RP0_VM0"));

    let inner = NameMatch::pattern("C0_RP0").unwrap();
    assert!(
        client
            .get_object_by_name(ManagedObjectKind::VirtualMachine, &inner)
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_dump_to_dict_returns_raw_snapshot() {
    let client = setup();
    let host = &client.get_all_hosts().unwrap()[0];
    let raw = client.dump_to_dict(host).unwrap();
    assert_eq!(raw["config"]["product"]["build"], json!("5969303"));
}

// ── Guest readiness & roles ─────────────────────────────────────────

#[test]
fn test_idle_vm_is_not_ready() {
    let client = setup();
    assert!(!client.is_vm_ready(VmSelector::Name("DC0_H0_VM0"), false).unwrap());
    let err = client
        .is_vm_ready(VmSelector::Name("DC0_H0_VM0"), true)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "no valid vm_tools state for DC0_H0_VM0 - toolsStatus[toolsNotInstalled] - guestState[]"
    );
}

#[test]
fn test_running_vm_is_ready() {
    let client = setup();
    let vm = client.get_vm_by_name("DC0_C0_RP0_VM1", true).unwrap().unwrap();
    assert!(client.is_power_on(&vm).unwrap());
    assert!(client.is_valid_tools(&vm).unwrap());
    assert!(client.is_vm_ready(VmSelector::Ref(&vm), true).unwrap());
}

#[test]
fn test_missing_vm_is_not_ready_without_raise() {
    let client = setup();
    assert!(!client.is_vm_ready(VmSelector::Name("ghost"), false).unwrap());
    assert!(matches!(
        client.is_vm_ready(VmSelector::Name("ghost"), true),
        Err(Error::ResourceNotFound { .. })
    ));
}

#[test]
fn test_vm_roles() {
    let client = setup();
    let vm = &client.get_all_vms().unwrap()[0];
    let roles = client.vm_roles(vm).unwrap();
    assert_eq!(roles, vec![-1]);
    assert_eq!(role_name(roles[0]), Some("Administrator"));
}
