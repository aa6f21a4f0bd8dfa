//! Project-hosting error types.

use thiserror::Error;

/// Errors returned by a [`ProjectApi`](super::ProjectApi) call.
#[derive(Error, Debug)]
pub enum GitLabError {
    #[error("GitLab request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitLab returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid GitLab URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl GitLabError {
    /// True when the remote answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GitLabError::Status { status: 404, .. })
    }
}

/// Errors from converging or removing a single project path.
#[derive(Error, Debug)]
pub enum ProjectSyncError {
    #[error("Could not list groups matching '{path}': {source}")]
    ListGroups {
        path: String,
        #[source]
        source: GitLabError,
    },

    #[error("Could not create group '{path}': {source}")]
    CreateGroup {
        path: String,
        #[source]
        source: GitLabError,
    },

    #[error("Could not list projects matching '{path}': {source}")]
    ListProjects {
        path: String,
        #[source]
        source: GitLabError,
    },

    #[error("Could not create project '{path}': {source}")]
    CreateProject {
        path: String,
        #[source]
        source: GitLabError,
    },

    #[error("Could not edit project '{path}': {source}")]
    EditProject {
        path: String,
        #[source]
        source: GitLabError,
    },

    #[error("Could not archive project '{path}': {source}")]
    ArchiveProject {
        path: String,
        #[source]
        source: GitLabError,
    },

    #[error("Could not delete project '{path}': {source}")]
    DeleteProject {
        path: String,
        #[source]
        source: GitLabError,
    },

    #[error("Could not find project '{path}'")]
    ProjectNotFound { path: String },
}

impl ProjectSyncError {
    /// True when the delete target does not exist remotely, including a
    /// project that vanished between search and archive or delete.
    pub fn is_not_found(&self) -> bool {
        match self {
            ProjectSyncError::ProjectNotFound { .. } => true,
            ProjectSyncError::ArchiveProject { source, .. }
            | ProjectSyncError::DeleteProject { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// The project or group path the failing operation acted on.
    pub fn path(&self) -> &str {
        match self {
            ProjectSyncError::ListGroups { path, .. }
            | ProjectSyncError::CreateGroup { path, .. }
            | ProjectSyncError::ListProjects { path, .. }
            | ProjectSyncError::CreateProject { path, .. }
            | ProjectSyncError::EditProject { path, .. }
            | ProjectSyncError::ArchiveProject { path, .. }
            | ProjectSyncError::DeleteProject { path, .. }
            | ProjectSyncError::ProjectNotFound { path } => path,
        }
    }
}

/// Result type for project sync operations.
pub type Result<T> = std::result::Result<T, ProjectSyncError>;
