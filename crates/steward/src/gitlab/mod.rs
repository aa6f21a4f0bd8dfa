//! Project-hosting integration (GitLab).
//!
//! - [`ProjectApi`]: the remote operations, implemented by [`GitLabClient`]
//! - [`HierarchyResolver`]: creates missing container groups top-down
//! - [`ProjectPathSync`]: converges or removes one leaf project

pub mod api;
pub mod client;
pub mod error;
pub mod hierarchy;
pub mod sync;
pub mod types;

pub use api::ProjectApi;
pub use client::GitLabClient;
pub use error::{GitLabError, ProjectSyncError};
pub use hierarchy::HierarchyResolver;
pub use sync::ProjectPathSync;
pub use types::{NewGroup, NewProject, ProjectEdit, RemoteGroup, RemoteProject, Visibility};
