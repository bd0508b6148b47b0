// ── Guest readiness ──
//
// A VM is ready for guest operations when it is powered on and VMware
// Tools report `toolsOk`/`toolsOld` with the guest in `running` state.

use mce_vsphere_api::{Connector, ManagedObjectKind, ManagedObjectRef, PropertySet};
use tracing::warn;

use crate::client::Client;
use crate::error::Error;

const POWERED_ON: &str = "poweredOn";
const USABLE_TOOLS: [&str; 2] = ["toolsOk", "toolsOld"];
const GUEST_RUNNING: &str = "running";

pub fn is_power_on(vm: &PropertySet) -> bool {
    vm.first_of(&["summary.runtime.powerState", "runtime.powerState"])
        .and_then(serde_json::Value::as_str)
        == Some(POWERED_ON)
}

pub fn is_valid_tools(vm: &PropertySet) -> bool {
    vm.str("guest.toolsStatus")
        .is_some_and(|status| USABLE_TOOLS.contains(&status))
        && vm.str("guest.guestState") == Some(GUEST_RUNNING)
}

/// `Ok` when the VM is powered on with usable tools, else the reason.
pub fn check_run_tools(vm: &PropertySet) -> Result<(), Error> {
    let name = vm.name().unwrap_or_default();
    if !is_power_on(vm) {
        return Err(Error::NotPowered { name: name.into() });
    }
    if !is_valid_tools(vm) {
        return Err(Error::ToolsNotReady {
            name: name.into(),
            tools_status: vm.str("guest.toolsStatus").unwrap_or("None").into(),
            guest_state: vm.str("guest.guestState").unwrap_or("None").into(),
        });
    }
    Ok(())
}

/// VM to check in [`Client::is_vm_ready`].
#[derive(Debug, Clone, Copy)]
pub enum VmSelector<'a> {
    Name(&'a str),
    Ref(&'a ManagedObjectRef),
}

impl<C: Connector> Client<C> {
    pub fn is_power_on(&self, vm: &ManagedObjectRef) -> Result<bool, Error> {
        Ok(is_power_on(&self.service()?.retrieve_properties(vm)?))
    }

    pub fn is_valid_tools(&self, vm: &ManagedObjectRef) -> Result<bool, Error> {
        Ok(is_valid_tools(&self.service()?.retrieve_properties(vm)?))
    }

    /// `Ok(true)` when ready; `NotPowered` or `ToolsNotReady` otherwise.
    pub fn is_valid_run_tools(&self, vm: &ManagedObjectRef) -> Result<bool, Error> {
        check_run_tools(&self.service()?.retrieve_properties(vm)?)?;
        Ok(true)
    }

    /// Whether the VM exists and is ready for guest operations.
    ///
    /// With `raise` unset every failure, including a missing VM, is logged
    /// and reported as `Ok(false)`.
    pub fn is_vm_ready(&self, vm: VmSelector<'_>, raise: bool) -> Result<bool, Error> {
        let outcome = match vm {
            VmSelector::Ref(object) => self.is_valid_run_tools(object),
            VmSelector::Name(name) => {
                self.get_vm_by_name(name, true)
                    .and_then(|found| match found {
                        Some(object) => self.is_valid_run_tools(&object),
                        None => Err(self.not_found(ManagedObjectKind::VirtualMachine, name)),
                    })
            }
        };
        match outcome {
            Ok(ready) => Ok(ready),
            Err(e) => {
                warn!(error = %e, "vm not ready");
                if raise { Err(e) } else { Ok(false) }
            }
        }
    }
}
