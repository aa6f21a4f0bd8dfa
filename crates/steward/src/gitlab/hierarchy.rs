//! Ensures a slash-delimited chain of container groups exists.

use tracing::{debug, info};

use super::api::ProjectApi;
use super::error::{ProjectSyncError, Result};
use super::types::{NewGroup, RemoteGroup, Visibility};
use crate::resource::{basename, parent};

/// Resolves group paths to ids, creating whatever is missing.
///
/// Every level is search-before-create and nothing is remembered between
/// calls, so resolving the same path twice never creates duplicates.
pub struct HierarchyResolver<'a> {
    api: &'a dyn ProjectApi,
}

impl<'a> HierarchyResolver<'a> {
    pub fn new(api: &'a dyn ProjectApi) -> Self {
        Self { api }
    }

    /// Returns the id of the group at `path`, creating it and any missing
    /// ancestors top-down.
    ///
    /// The first failing call aborts the whole resolution.
    pub async fn ensure_path(&self, path: &str) -> Result<u64> {
        if let Some(group) = self.find(path).await? {
            debug!(path, id = group.id, "Group already exists");
            return Ok(group.id);
        }

        // Walk upward until an existing ancestor (or the root) is reached.
        let mut missing = Vec::new();
        let mut parent_id = None;
        let mut cursor = parent(path);
        while let Some(ancestor) = cursor {
            if let Some(group) = self.find(ancestor).await? {
                parent_id = Some(group.id);
                break;
            }
            missing.push(ancestor);
            cursor = parent(ancestor);
        }

        for ancestor in missing.into_iter().rev() {
            parent_id = Some(self.create(ancestor, parent_id).await?.id);
        }

        Ok(self.create(path, parent_id).await?.id)
    }

    /// Finds the group whose full path is exactly `path`.
    pub async fn find(&self, path: &str) -> Result<Option<RemoteGroup>> {
        let groups = self
            .api
            .search_groups(basename(path))
            .await
            .map_err(|source| ProjectSyncError::ListGroups {
                path: path.to_string(),
                source,
            })?;

        Ok(groups.into_iter().find(|g| g.full_path == path))
    }

    async fn create(&self, path: &str, parent_id: Option<u64>) -> Result<RemoteGroup> {
        let segment = basename(path);
        let request = NewGroup {
            name: segment.to_string(),
            path: segment.to_string(),
            parent_id,
            visibility: Visibility::Private,
        };

        let group = self
            .api
            .create_group(&request)
            .await
            .map_err(|source| ProjectSyncError::CreateGroup {
                path: path.to_string(),
                source,
            })?;

        info!(path, id = group.id, ?parent_id, "Created group");
        Ok(group)
    }
}
