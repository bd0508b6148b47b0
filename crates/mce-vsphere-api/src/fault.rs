use thiserror::Error;

use crate::moref::ManagedObjectRef;

/// Failure categories reported by a vSphere API client.
///
/// Mirrors the fault families a management endpoint can raise: transport
/// failures before the request reaches the server, VMODL method faults
/// carried in a response, and local TLS setup problems.
/// `mce-vsphere-core` maps these into its session error taxonomy.
#[derive(Debug, Error)]
pub enum Fault {
    // ── Transport ───────────────────────────────────────────────────
    /// Network or I/O failure (connection refused, DNS failure, timeout).
    #[error("I/O error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// TLS context could not be built or the handshake was rejected.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Authentication ──────────────────────────────────────────────
    /// `vim.fault.InvalidLogin`: the server rejected the credentials.
    #[error("Cannot complete login due to an incorrect user name or password.")]
    InvalidLogin,

    /// `vim.fault.NotAuthenticated`: the session is gone or was never opened.
    #[error("The session is not authenticated.")]
    NotAuthenticated,

    // ── Method faults ───────────────────────────────────────────────
    /// `vmodl.fault.ManagedObjectNotFound`.
    #[error("The object '{0}' has already been deleted or has not been completely created")]
    ManagedObjectNotFound(ManagedObjectRef),

    /// Any other VMODL method fault, identified by its fault type name.
    #[error("{fault}: {message}")]
    Method { fault: String, message: String },

    // ── Other ───────────────────────────────────────────────────────
    /// Anything the client could not classify.
    #[error("{0}")]
    Other(String),
}

impl Fault {
    /// Shorthand for a transport fault without an underlying I/O error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Returns `true` if the server could not be reached at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Returns `true` if the credentials were rejected.
    pub fn is_invalid_login(&self) -> bool {
        matches!(self, Self::InvalidLogin)
    }
}

impl From<std::io::Error> for Fault {
    fn from(err: std::io::Error) -> Self {
        Self::Transport {
            message: err.to_string(),
            source: Some(err),
        }
    }
}
