// Built-in vCenter roles. Custom roles have positive ids and are not named here.

use mce_vsphere_api::{Connector, ManagedObjectRef};
use serde_json::Value;
use strum::{Display, EnumIter, IntoEnumIterator, IntoStaticStr};

use crate::client::Client;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, EnumIter)]
pub enum Role {
    Administrator,
    #[strum(serialize = "Read-Only")]
    ReadOnly,
    View,
    Anonymous,
    #[strum(serialize = "No Access")]
    NoAccess,
}

impl Role {
    pub fn code(self) -> i64 {
        match self {
            Self::Administrator => -1,
            Self::ReadOnly => -2,
            Self::View => -3,
            Self::Anonymous => -4,
            Self::NoAccess => -5,
        }
    }

    pub fn from_code(code: i64) -> Option<Self> {
        Self::iter().find(|role| role.code() == code)
    }
}

/// Display name of a built-in role code.
pub fn role_name(code: i64) -> Option<&'static str> {
    Role::from_code(code).map(<&'static str>::from)
}

impl<C: Connector> Client<C> {
    /// Role ids the session user holds on `vm` (`effectiveRole`).
    pub fn vm_roles(&self, vm: &ManagedObjectRef) -> Result<Vec<i64>, Error> {
        let properties = self.service()?.retrieve_properties(vm)?;
        Ok(properties
            .array("effectiveRole")
            .iter()
            .filter_map(Value::as_i64)
            .collect())
    }
}
