//! Directory-service error types.

use thiserror::Error;

/// Errors returned by a [`DirectoryApi`](super::DirectoryApi) call.
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("LDAP error: {0}")]
    Ldap(#[from] ldap3::LdapError),

    #[error("LDAP bind failed for '{bind_dn}': {message}")]
    BindFailed { bind_dn: String, message: String },

    /// The server answered with a non-success result code.
    #[error("LDAP operation failed with code {rc}: {message}")]
    Rejected { rc: u32, message: String },
}

/// LDAP result code for "noSuchObject".
pub const RC_NO_SUCH_OBJECT: u32 = 32;

impl DirectoryError {
    /// Maps an `ldap3` error, lifting server result codes into
    /// [`DirectoryError::Rejected`].
    pub fn from_ldap(err: ldap3::LdapError) -> Self {
        match err {
            ldap3::LdapError::LdapResult { result } => DirectoryError::Rejected {
                rc: result.rc,
                message: result.text,
            },
            other => DirectoryError::Ldap(other),
        }
    }

    /// The LDAP result code, when the server answered with one.
    pub fn result_code(&self) -> Option<u32> {
        match self {
            DirectoryError::Rejected { rc, .. } => Some(*rc),
            _ => None,
        }
    }
}

/// Errors from converging or removing a single directory group.
#[derive(Error, Debug)]
pub enum GroupSyncError {
    #[error("Could not search for group '{group}': {source}")]
    Search {
        group: String,
        #[source]
        source: DirectoryError,
    },

    #[error("Search for group '{group}' returned {count} entries, expected at most one")]
    Ambiguous { group: String, count: usize },

    #[error("Could not create group '{dn}': {source}")]
    Create {
        dn: String,
        #[source]
        source: DirectoryError,
    },

    #[error("Could not modify group '{dn}': {source}")]
    Modify {
        dn: String,
        #[source]
        source: DirectoryError,
    },

    #[error("Could not delete group '{dn}': {source}")]
    Delete {
        dn: String,
        #[source]
        source: DirectoryError,
    },

    #[error("Group '{group}' was not found")]
    GroupNotFound { group: String },
}

impl GroupSyncError {
    /// True when the delete target does not exist in the directory.
    pub fn is_not_found(&self) -> bool {
        match self {
            GroupSyncError::GroupNotFound { .. } => true,
            GroupSyncError::Delete { source, .. } => {
                source.result_code() == Some(RC_NO_SUCH_OBJECT)
            }
            _ => false,
        }
    }
}

/// Result type for group sync operations.
pub type Result<T> = std::result::Result<T, GroupSyncError>;
