use thiserror::Error;

use crate::config::ConfigError;
use crate::gitlab::{GitLabError, ProjectSyncError};
use crate::ldap::GroupSyncError;
use crate::logging::LoggingError;
use crate::secrets::SecretError;
use crate::store::StoreError;
use crate::validation::ValidationError;

/// Failure of a single reconcile; the host retries the resource later.
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Project sync error: {0}")]
    Project(#[from] ProjectSyncError),

    #[error("Group sync error: {0}")]
    Group(#[from] GroupSyncError),

    #[error("Invalid declaration: {0}")]
    Invalid(#[from] ValidationError),
}

/// Failure to assemble the controller from its configuration.
#[derive(Error, Debug)]
pub enum StewardError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Secret error: {0}")]
    Secret(#[from] SecretError),

    #[error("GitLab client error: {0}")]
    GitLab(#[from] GitLabError),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
