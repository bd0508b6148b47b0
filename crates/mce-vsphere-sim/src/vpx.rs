// ── Default VPX inventory ──
//
// Reproduces the model `vcsim -api-version 6.5` serves out of the box: two
// datacenters, each with one standalone host, one three-host cluster, a
// local datastore, the `VM Network` standard network, a distributed switch
// with one port group, and four VMs. Capacity figures and guest states are
// the ones vcsim reports so flattened records can be compared verbatim.

use mce_vsphere_api::{AboutInfo, ManagedObjectKind, ManagedObjectRef};
use serde_json::{Value, json};
use uuid::Uuid;

use crate::inventory::{FolderType, Inventory, InventoryBuilder};

pub const DATACENTERS: usize = 2;
pub const CLUSTER_HOSTS: u8 = 3;

const HOST_CPU_MHZ: i64 = 2294;
const HOST_CPU_CORES: i64 = 2;
const HOST_MEMORY: i64 = 4_294_430_720;

const DATASTORE_CAPACITY: i64 = 3_117_400_064;
const DATASTORE_FREE: i64 = 3_083_849_728;

pub fn about() -> AboutInfo {
    AboutInfo {
        version: "6.5.0".into(),
        build: "5973321".into(),
        os_type: "linux-amd64".into(),
        api_type: "VirtualCenter".into(),
        api_version: "6.5".into(),
        license_product_name: "VMware VirtualCenter Server".into(),
        license_product_version: "6.0".into(),
    }
}

/// Stable per-name UUID so repeated builds agree.
fn stable_uuid(scope: &str, name: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, format!("{scope}/{name}").as_bytes()).to_string()
}

fn host_properties() -> Value {
    json!({
        "overallStatus": "green",
        "summary": {
            "managementServerIp": null,
            "hardware": {
                "cpuMhz": HOST_CPU_MHZ,
                "numCpuCores": HOST_CPU_CORES,
                "numCpuThreads": HOST_CPU_CORES,
                "memorySize": HOST_MEMORY,
            },
        },
        "config": {
            "product": {
                "name": "VMware ESXi",
                "fullName": "VMware ESXi 6.5.0 build-5969303",
                "version": "6.5.0",
                "build": "5969303",
                "apiType": "HostAgent",
                "apiVersion": "6.5",
            },
        },
    })
}

fn cluster_properties(hosts: i64) -> Value {
    json!({
        "overallStatus": "green",
        "summary": {
            "totalCpu": HOST_CPU_MHZ * hosts,
            "numCpuCores": HOST_CPU_CORES * hosts,
            "totalMemory": HOST_MEMORY * hosts,
            "numCpuThreads": HOST_CPU_CORES * hosts,
            "effectiveCpu": HOST_CPU_MHZ * hosts,
            "effectiveMemory": HOST_MEMORY * hosts,
            "numHosts": hosts,
            "numEffectiveHosts": hosts,
        },
    })
}

fn datastore_properties(name: &str) -> Value {
    json!({
        "summary": {
            "name": name,
            "url": format!("ds:///vmfs/volumes/{name}/"),
            "capacity": DATASTORE_CAPACITY,
            "freeSpace": DATASTORE_FREE,
            "uncommitted": null,
            "type": "OTHER",
            "accessible": true,
            "maintenanceMode": "normal",
            "multipleHostAccess": false,
        },
    })
}

/// Guest block of a freshly deployed vcsim VM: powered on, no tools.
fn idle_guest() -> Value {
    json!({
        "hostName": null,
        "guestFamily": "linuxGuest",
        "toolsVersion": "0",
        "toolsStatus": "toolsNotInstalled",
        "toolsRunningStatus": "guestToolsNotRunning",
        "guestState": "",
        "guestOperationsReady": null,
        "interactiveGuestOperationsReady": null,
        "guestStateChangeSupported": null,
        "net": [],
    })
}

/// Guest block of a VM with running tools and one connected NIC.
fn running_guest(name: &str, mac: &str, ipv4: &str) -> Value {
    json!({
        "hostName": name.to_lowercase(),
        "guestFamily": "linuxGuest",
        "toolsVersion": "10346",
        "toolsStatus": "toolsOk",
        "toolsVersionStatus": "guestToolsCurrent",
        "toolsVersionStatus2": "guestToolsCurrent",
        "toolsRunningStatus": "guestToolsRunning",
        "guestState": "running",
        "guestOperationsReady": true,
        "interactiveGuestOperationsReady": false,
        "guestStateChangeSupported": true,
        "net": [{
            "network": "VM Network",
            "macAddress": mac,
            "connected": true,
            "ipConfig": {
                "ipAddress": [
                    { "ipAddress": ipv4, "prefixLength": 24, "origin": "dhcp", "state": "preferred" },
                    { "ipAddress": "fe80::250:56ff:fe00:1", "prefixLength": 64, "origin": "linklayer", "state": "unknown" },
                ],
            },
        }],
    })
}

fn vm_properties(
    name: &str,
    datastore: &str,
    host: &ManagedObjectRef,
    pool: &ManagedObjectRef,
    guest: Value,
) -> Value {
    let bios_uuid = stable_uuid("bios", name);
    let instance_uuid = stable_uuid("instance", name);
    let path = format!("[{datastore}] {name}/{name}.vmx");
    json!({
        "overallStatus": "green",
        "effectiveRole": [-1],
        "availableField": [],
        "customValue": [],
        "resourcePool": pool,
        "runtime": { "host": host, "powerState": "poweredOn" },
        "config": {
            "name": name,
            "template": false,
            "uuid": bios_uuid,
            "instanceUuid": instance_uuid,
            "guestId": "otherGuest",
            "guestFullName": "otherGuest",
            "annotation": null,
            "files": { "vmPathName": path },
        },
        "summary": {
            "config": {
                "name": name,
                "template": false,
                "vmPathName": path,
                "memorySizeMB": 32,
                "numCpu": 1,
                "guestFullName": "otherGuest",
                "annotation": null,
                "uuid": bios_uuid,
                "instanceUuid": instance_uuid,
            },
            "storage": { "committed": 0, "uncommitted": 0 },
            "runtime": {
                "powerState": "poweredOn",
                "bootTime": "2019-01-01T00:00:00Z",
            },
        },
        "guest": guest,
    })
}

/// Folders, compute and networking for one datacenter.
fn datacenter(builder: &mut InventoryBuilder, index: usize) {
    let root = builder.root();
    let prefix = format!("DC{index}");
    let dc = builder.add(
        ManagedObjectKind::Datacenter,
        &root,
        &prefix,
        json!({ "overallStatus": "green" }),
    );

    let vm_folder = builder.add_folder(&dc, "vm", FolderType::Vm);
    let host_folder = builder.add_folder(&dc, "host", FolderType::Host);
    let ds_folder = builder.add_folder(&dc, "datastore", FolderType::Datastore);
    let net_folder = builder.add_folder(&dc, "network", FolderType::Network);

    // Standalone host with its implicit compute resource and root pool.
    let standalone = format!("{prefix}_H0");
    let compute = builder.add(
        ManagedObjectKind::ComputeResource,
        &host_folder,
        &standalone,
        cluster_properties(1),
    );
    let host = builder.add(ManagedObjectKind::HostSystem, &compute, &standalone, host_properties());
    let pool = builder.add(ManagedObjectKind::ResourcePool, &compute, "Resources", json!({}));

    // Cluster of CLUSTER_HOSTS hosts.
    let cluster_name = format!("{prefix}_C0");
    let cluster = builder.add(
        ManagedObjectKind::ClusterComputeResource,
        &host_folder,
        &cluster_name,
        cluster_properties(i64::from(CLUSTER_HOSTS)),
    );
    let cluster_hosts: Vec<ManagedObjectRef> = (0..CLUSTER_HOSTS)
        .map(|i| {
            builder.add(
                ManagedObjectKind::HostSystem,
                &cluster,
                &format!("{cluster_name}_H{i}"),
                host_properties(),
            )
        })
        .collect();
    let cluster_pool = builder.add(ManagedObjectKind::ResourcePool, &cluster, "Resources", json!({}));
    let rp0 = builder.add(
        ManagedObjectKind::ResourcePool,
        &cluster_pool,
        &format!("{cluster_name}_RP0"),
        json!({}),
    );

    let datastore = "LocalDS_0";
    builder.add(ManagedObjectKind::Datastore, &ds_folder, datastore, datastore_properties(datastore));

    // Standalone-host VMs idle; cluster VMs run tools and carry a NIC.
    let mut vms = Vec::new();
    for i in 0..2 {
        let name = format!("{standalone}_VM{i}");
        vms.push(builder.add(
            ManagedObjectKind::VirtualMachine,
            &vm_folder,
            &name,
            vm_properties(&name, datastore, &host, &pool, idle_guest()),
        ));
    }
    for (i, cluster_host) in cluster_hosts.iter().take(2).enumerate() {
        let name = format!("{cluster_name}_RP0_VM{i}");
        let mac = format!("00:50:56:{index:02x}:00:{i:02x}");
        let ipv4 = format!("10.0.{index}.{}", 10 + i);
        vms.push(builder.add(
            ManagedObjectKind::VirtualMachine,
            &vm_folder,
            &name,
            vm_properties(&name, datastore, cluster_host, &rp0, running_guest(&name, &mac, &ipv4)),
        ));
    }

    let vm_refs = Value::from(
        vms.iter()
            .map(|vm| serde_json::to_value(vm).unwrap_or(Value::Null))
            .collect::<Vec<_>>(),
    );
    builder.add(
        ManagedObjectKind::Network,
        &net_folder,
        "VM Network",
        json!({ "summary": { "name": "VM Network", "accessible": true }, "vm": vm_refs }),
    );

    let dvs_name = format!("{prefix}_DVS");
    builder.add(
        ManagedObjectKind::DistributedVirtualSwitch,
        &net_folder,
        &dvs_name,
        json!({
            "uuid": stable_uuid("dvs", &dvs_name),
            "summary": {
                "name": dvs_name,
                "numPorts": 0,
                "numHosts": CLUSTER_HOSTS + 1,
                "productInfo": { "vendor": "VMware", "name": "DVS", "version": "6.5.0" },
            },
        }),
    );
    builder.add(
        ManagedObjectKind::DistributedVirtualPortgroup,
        &net_folder,
        &format!("{prefix}_DVPG0"),
        json!({
            "summary": { "accessible": true },
            "config": { "numPorts": 0, "type": "earlyBinding" },
            "vm": [],
        }),
    );
}

/// Build the default two-datacenter inventory.
pub fn inventory() -> Inventory {
    let mut builder = InventoryBuilder::new();
    for index in 0..DATACENTERS {
        datacenter(&mut builder, index);
    }
    builder.build()
}
