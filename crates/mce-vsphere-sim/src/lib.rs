// mce-vsphere-sim: in-process vCenter simulator for tests and offline work
//
// `Simulator::vpx()` serves the same inventory `vcsim` does by default;
// `InventoryBuilder` assembles custom (including malformed) trees.

pub mod inventory;
pub mod simulator;
pub mod vpx;

pub use inventory::{FolderType, Inventory, InventoryBuilder, ROOT_FOLDER_ID};
pub use simulator::{
    DEFAULT_HOST, DEFAULT_PASSWORD, DEFAULT_PATH, DEFAULT_PORT, DEFAULT_USERNAME, Simulator,
    SimulatorBuilder,
};
