// ── Core error types ──
//
// Everything a caller of mce-vsphere-core can see fail. Connect-time faults
// are classified once, in `Error::from_connect_fault`; faults raised by
// later enumeration and property calls surface as `Error::Api`.

use mce_vsphere_api::Fault;
use thiserror::Error;

use crate::config::ConnectionConfig;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum Error {
    // ── Configuration ────────────────────────────────────────────────
    #[error("invalid connection settings: {message}")]
    Configuration { message: String },

    // ── Session ──────────────────────────────────────────────────────
    #[error(
        "Connection could not be established for host [{host}:{port}] with timeout [{timeout_secs}]"
    )]
    Connection {
        host: String,
        port: u16,
        timeout_secs: u64,
        #[source]
        source: Fault,
    },

    #[error("invalid authentication for [{username}]")]
    Authentication { username: String },

    #[error("{message}")]
    Fatal {
        message: String,
        #[source]
        source: Option<Fault>,
    },

    #[error("not connected to vcenter [{host}:{port}]")]
    NotConnected { host: String, port: u16 },

    // ── Lookups ──────────────────────────────────────────────────────
    #[error("{kind} [{name}] not found in vcenter [{host}:{port}] for username [{username}]")]
    ResourceNotFound {
        kind: String,
        name: String,
        host: String,
        port: u16,
        username: String,
    },

    #[error("parent chain of [{object}] loops or exceeds {max_depth} levels")]
    CycleDetected { object: String, max_depth: usize },

    #[error("invalid name pattern [{pattern}]: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    // ── Guest readiness ──────────────────────────────────────────────
    #[error("vm {name} is not powered")]
    NotPowered { name: String },

    #[error(
        "no valid vm_tools state for {name} - toolsStatus[{tools_status}] - guestState[{guest_state}]"
    )]
    ToolsNotReady {
        name: String,
        tools_status: String,
        guest_state: String,
    },

    // ── API (post-connect) ───────────────────────────────────────────
    #[error("vSphere API call failed: {0}")]
    Api(#[from] Fault),
}

impl Error {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Classify a fault raised while opening a session.
    ///
    /// Transport failures become `Connection`, rejected credentials become
    /// `Authentication`, and every other category is `Fatal`.
    pub fn from_connect_fault(fault: Fault, config: &ConnectionConfig) -> Self {
        match fault {
            Fault::Transport { .. } => Self::Connection {
                host: config.host.clone(),
                port: config.port,
                timeout_secs: config.timeout_secs,
                source: fault,
            },
            Fault::InvalidLogin => Self::Authentication {
                username: config.username.clone().unwrap_or_default(),
            },
            Fault::Tls(_)
            | Fault::NotAuthenticated
            | Fault::ManagedObjectNotFound(_)
            | Fault::Method { .. }
            | Fault::Other(_) => Self::Fatal {
                message: fault.to_string(),
                source: Some(fault),
            },
        }
    }

    /// Whether the failure happened before any session existed.
    pub fn is_connect_failure(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::Authentication { .. } | Self::Fatal { .. }
        )
    }
}
