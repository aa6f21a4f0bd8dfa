//! The host platform's resource store, as seen by the controller.

use async_trait::async_trait;
use thiserror::Error;

use crate::resource::ResourceId;

/// Errors surfaced by the host store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Resource {0} not found")]
    NotFound(ResourceId),

    #[error("Resource {id} was modified concurrently (resource version {resource_version:?})")]
    Conflict {
        id: ResourceId,
        resource_version: Option<String>,
    },

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Read and write access to declared resources of one kind.
///
/// Writes use optimistic concurrency: a write carrying a stale
/// `resourceVersion` fails with [`StoreError::Conflict`]. Successful writes
/// return the stored object with its new version.
#[async_trait]
pub trait ResourceStore<R>: Send + Sync {
    /// Fetches the resource, `None` if it no longer exists.
    async fn get(&self, id: &ResourceId) -> Result<Option<R>, StoreError>;

    /// Persists metadata and spec (finalizers live here).
    async fn update(&self, resource: &R) -> Result<R, StoreError>;

    /// Persists the status sub-resource.
    async fn update_status(&self, resource: &R) -> Result<R, StoreError>;
}
