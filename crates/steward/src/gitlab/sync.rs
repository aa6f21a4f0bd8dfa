//! Create/update/archive-or-delete of a single declared project path.

use std::sync::Arc;
use tracing::{debug, info};

use super::api::ProjectApi;
use super::error::{ProjectSyncError, Result};
use super::hierarchy::HierarchyResolver;
use super::types::{NewProject, ProjectEdit, RemoteProject, Visibility};
use crate::resource::ProjectPathSpec;

/// Converges one leaf project at a time.
#[derive(Clone)]
pub struct ProjectPathSync {
    api: Arc<dyn ProjectApi>,
}

impl ProjectPathSync {
    pub fn new(api: Arc<dyn ProjectApi>) -> Self {
        Self { api }
    }

    /// Finds the project whose full path is exactly `spec.path`.
    pub async fn find(&self, spec: &ProjectPathSpec) -> Result<Option<RemoteProject>> {
        let projects = self
            .api
            .search_projects(spec.basename())
            .await
            .map_err(|source| ProjectSyncError::ListProjects {
                path: spec.path.clone(),
                source,
            })?;

        Ok(projects
            .into_iter()
            .find(|p| p.path_with_namespace == spec.path))
    }

    /// Creates or updates the project. Returns true if anything changed remotely.
    pub async fn reconcile_path(&self, spec: &ProjectPathSpec) -> Result<bool> {
        match self.find(spec).await? {
            Some(project) => {
                if project.name == spec.name && project.description() == spec.description {
                    debug!(path = %spec.path, "Project up to date");
                    return Ok(false);
                }

                let edit = ProjectEdit {
                    name: spec.name.clone(),
                    description: spec.description.clone(),
                };
                self.api
                    .edit_project(project.id, &edit)
                    .await
                    .map_err(|source| ProjectSyncError::EditProject {
                        path: spec.path.clone(),
                        source,
                    })?;

                info!(path = %spec.path, id = project.id, "Updated project");
                Ok(true)
            }
            None => {
                let namespace_id = match spec.parent() {
                    Some(parent) => Some(
                        HierarchyResolver::new(&*self.api)
                            .ensure_path(parent)
                            .await?,
                    ),
                    None => None,
                };

                let request = NewProject {
                    name: spec.name.clone(),
                    path: spec.basename().to_string(),
                    description: spec.description.clone(),
                    namespace_id,
                    visibility: Visibility::Private,
                };
                let project = self.api.create_project(&request).await.map_err(|source| {
                    ProjectSyncError::CreateProject {
                        path: spec.path.clone(),
                        source,
                    }
                })?;

                info!(path = %spec.path, id = project.id, ?namespace_id, "Created project");
                Ok(true)
            }
        }
    }

    /// Archives or deletes the project.
    ///
    /// A missing project is reported as [`ProjectSyncError::ProjectNotFound`].
    pub async fn delete_path(&self, spec: &ProjectPathSpec) -> Result<bool> {
        let project = self
            .find(spec)
            .await?
            .ok_or_else(|| ProjectSyncError::ProjectNotFound {
                path: spec.path.clone(),
            })?;

        if spec.archive_on_delete {
            if project.archived {
                debug!(path = %spec.path, "Project already archived");
                return Ok(false);
            }
            self.api
                .archive_project(project.id)
                .await
                .map_err(|source| ProjectSyncError::ArchiveProject {
                    path: spec.path.clone(),
                    source,
                })?;
            info!(path = %spec.path, id = project.id, "Archived project");
        } else {
            self.api
                .delete_project(project.id)
                .await
                .map_err(|source| ProjectSyncError::DeleteProject {
                    path: spec.path.clone(),
                    source,
                })?;
            info!(path = %spec.path, id = project.id, "Deleted project");
        }

        Ok(true)
    }
}
