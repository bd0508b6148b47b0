// ── Simulated inventory tree ──
//
// Objects live in insertion order; ids follow the vCenter prefix scheme
// (`group-d1`, `datacenter-2`, `host-9`, ...) from a single counter so a
// freshly built tree always numbers the same way. Parent references are
// stored independently from child lists so tests can wire up malformed
// graphs (cycles, dangling parents) that a real server never returns.

use std::collections::{HashMap, HashSet};

use mce_vsphere_api::{Fault, ManagedObjectKind, ManagedObjectRef, PropertySet};
use serde_json::{Map, Value};

/// Id of the root `Datacenters` folder on every vCenter.
pub const ROOT_FOLDER_ID: &str = "group-d1";

/// Child type of a folder; picks the letter in its `group-<x>N` id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderType {
    Datacenter,
    Host,
    Vm,
    Datastore,
    Network,
}

impl FolderType {
    fn letter(self) -> char {
        match self {
            Self::Datacenter => 'd',
            Self::Host => 'h',
            Self::Vm => 'v',
            Self::Datastore => 's',
            Self::Network => 'n',
        }
    }
}

fn id_prefix(kind: ManagedObjectKind) -> &'static str {
    match kind {
        ManagedObjectKind::Datacenter => "datacenter-",
        ManagedObjectKind::ComputeResource => "domain-s",
        ManagedObjectKind::ClusterComputeResource => "domain-c",
        ManagedObjectKind::HostSystem => "host-",
        ManagedObjectKind::ResourcePool => "resgroup-",
        ManagedObjectKind::VirtualApp => "resgroup-v",
        ManagedObjectKind::VirtualMachine => "vm-",
        ManagedObjectKind::Datastore => "datastore-",
        ManagedObjectKind::StoragePod => "group-p",
        ManagedObjectKind::Network => "network-",
        ManagedObjectKind::OpaqueNetwork => "network-o",
        ManagedObjectKind::DistributedVirtualSwitch => "dvs-",
        ManagedObjectKind::DistributedVirtualPortgroup => "dvportgroup-",
        // Folders are numbered through `add_folder`; plain `add` falls back here.
        _ => "group-f",
    }
}

#[derive(Debug, Clone)]
struct Node {
    moref: ManagedObjectRef,
    parent: Option<ManagedObjectRef>,
    children: Vec<ManagedObjectRef>,
    properties: Map<String, Value>,
}

/// Immutable inventory served by a [`Simulator`](crate::Simulator).
#[derive(Debug, Clone)]
pub struct Inventory {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    root: ManagedObjectRef,
}

impl Inventory {
    pub fn root(&self) -> &ManagedObjectRef {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, moref: &ManagedObjectRef) -> Result<&Node, Fault> {
        self.index
            .get(moref.id())
            .and_then(|&i| self.nodes.get(i))
            .filter(|node| node.moref.kind() == moref.kind())
            .ok_or_else(|| Fault::ManagedObjectNotFound(moref.clone()))
    }

    pub fn parent(&self, moref: &ManagedObjectRef) -> Result<Option<ManagedObjectRef>, Fault> {
        Ok(self.node(moref)?.parent.clone())
    }

    pub fn properties(&self, moref: &ManagedObjectRef) -> Result<PropertySet, Fault> {
        Ok(PropertySet::new(self.node(moref)?.properties.clone()))
    }

    /// First object of `kind` named `name`.
    pub fn find(&self, kind: ManagedObjectKind, name: &str) -> Option<ManagedObjectRef> {
        self.nodes
            .iter()
            .find(|node| {
                node.moref.kind() == kind
                    && node.properties.get("name").and_then(Value::as_str) == Some(name)
            })
            .map(|node| node.moref.clone())
    }

    /// Pre-order walk of `container`'s descendants, filtered by kind.
    pub fn view(
        &self,
        container: &ManagedObjectRef,
        kinds: &[ManagedObjectKind],
        recursive: bool,
    ) -> Result<Vec<ManagedObjectRef>, Fault> {
        let start = self.node(container)?;
        let mut found = Vec::new();
        let mut seen = HashSet::from([start.moref.id().to_owned()]);
        let mut stack: Vec<&ManagedObjectRef> = start.children.iter().rev().collect();

        while let Some(moref) = stack.pop() {
            if !seen.insert(moref.id().to_owned()) {
                continue;
            }
            let node = self.node(moref)?;
            if kinds.iter().any(|&filter| moref.kind().is_a(filter)) {
                found.push(moref.clone());
            }
            if recursive {
                stack.extend(node.children.iter().rev());
            }
        }
        Ok(found)
    }
}

/// Incremental builder for an [`Inventory`].
#[derive(Debug)]
pub struct InventoryBuilder {
    inventory: Inventory,
    next_id: u32,
}

impl Default for InventoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InventoryBuilder {
    /// Start with the root `Datacenters` folder (`group-d1`).
    pub fn new() -> Self {
        let root = ManagedObjectRef::new(ManagedObjectKind::Folder, ROOT_FOLDER_ID);
        let mut properties = Map::new();
        properties.insert("name".into(), Value::from("Datacenters"));
        let node = Node {
            moref: root.clone(),
            parent: None,
            children: Vec::new(),
            properties,
        };
        Self {
            inventory: Inventory {
                index: HashMap::from([(ROOT_FOLDER_ID.to_owned(), 0)]),
                nodes: vec![node],
                root,
            },
            next_id: 2,
        }
    }

    pub fn root(&self) -> ManagedObjectRef {
        self.inventory.root.clone()
    }

    fn allocate(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}{}", self.next_id);
        self.next_id += 1;
        id
    }

    /// Add an object with a generated id. `properties` must be a JSON object;
    /// `name` is set from the argument.
    pub fn add(
        &mut self,
        kind: ManagedObjectKind,
        parent: &ManagedObjectRef,
        name: &str,
        properties: Value,
    ) -> ManagedObjectRef {
        let id = self.allocate(id_prefix(kind));
        self.add_with_id(kind, id, parent, name, properties)
    }

    /// Add a folder whose id encodes its child type (`group-v3`).
    pub fn add_folder(
        &mut self,
        parent: &ManagedObjectRef,
        name: &str,
        folder_type: FolderType,
    ) -> ManagedObjectRef {
        let id = self.allocate(&format!("group-{}", folder_type.letter()));
        self.add_with_id(
            ManagedObjectKind::Folder,
            id,
            parent,
            name,
            Value::Object(Map::new()),
        )
    }

    /// Add an object with an explicit id.
    pub fn add_with_id(
        &mut self,
        kind: ManagedObjectKind,
        id: impl Into<String>,
        parent: &ManagedObjectRef,
        name: &str,
        properties: Value,
    ) -> ManagedObjectRef {
        let moref = ManagedObjectRef::new(kind, id);
        let mut properties = match properties {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        properties.insert("name".into(), Value::from(name));

        let position = self.inventory.nodes.len();
        self.inventory.nodes.push(Node {
            moref: moref.clone(),
            parent: Some(parent.clone()),
            children: Vec::new(),
            properties,
        });
        self.inventory
            .index
            .insert(moref.id().to_owned(), position);
        self.attach(&moref, parent);
        moref
    }

    /// Re-point `child`'s parent reference. Accepts any target, including
    /// one that closes a cycle.
    pub fn set_parent(&mut self, child: &ManagedObjectRef, parent: Option<&ManagedObjectRef>) {
        let previous = self
            .node_mut(child)
            .and_then(|node| std::mem::replace(&mut node.parent, parent.cloned()));
        if let Some(previous) = previous {
            if let Some(old) = self.node_mut(&previous) {
                old.children.retain(|c| c != child);
            }
        }
        if let Some(parent) = parent {
            self.attach(child, parent);
        }
    }

    /// Merge `patch` into an object's properties (top-level keys replace).
    pub fn update(&mut self, moref: &ManagedObjectRef, patch: Value) {
        if let (Some(node), Value::Object(patch)) = (self.node_mut(moref), patch) {
            node.properties.extend(patch);
        }
    }

    fn attach(&mut self, child: &ManagedObjectRef, parent: &ManagedObjectRef) {
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child.clone());
        }
    }

    fn node_mut(&mut self, moref: &ManagedObjectRef) -> Option<&mut Node> {
        let position = *self.inventory.index.get(moref.id())?;
        self.inventory.nodes.get_mut(position)
    }

    pub fn build(self) -> Inventory {
        self.inventory
    }
}
