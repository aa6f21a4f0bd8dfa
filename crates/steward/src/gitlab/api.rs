//! The project-hosting operations the controller relies on.

use async_trait::async_trait;

use super::error::GitLabError;
use super::types::{NewGroup, NewProject, ProjectEdit, RemoteGroup, RemoteProject};

/// Remote project tree: container groups holding leaf projects.
///
/// Searches are by name fragment; callers filter for exact full paths.
#[async_trait]
pub trait ProjectApi: Send + Sync {
    async fn search_groups(&self, fragment: &str) -> Result<Vec<RemoteGroup>, GitLabError>;

    async fn create_group(&self, group: &NewGroup) -> Result<RemoteGroup, GitLabError>;

    async fn search_projects(&self, fragment: &str) -> Result<Vec<RemoteProject>, GitLabError>;

    async fn create_project(&self, project: &NewProject) -> Result<RemoteProject, GitLabError>;

    async fn edit_project(&self, id: u64, edit: &ProjectEdit)
        -> Result<RemoteProject, GitLabError>;

    async fn archive_project(&self, id: u64) -> Result<(), GitLabError>;

    async fn delete_project(&self, id: u64) -> Result<(), GitLabError>;
}
