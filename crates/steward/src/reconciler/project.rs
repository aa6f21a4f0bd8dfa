use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, info_span, Instrument};

use super::{mark_configured, register, release, Action, Reconciler};
use crate::drift::DriftDetector;
use crate::error::Result;
use crate::finalizer::{FinalizerGate, LifecycleState};
use crate::gitlab::ProjectPathSync;
use crate::resource::{ProjectPathSpec, ProjectResource, ProjectSpec, ResourceId, ResourceKind};
use crate::store::ResourceStore;
use crate::validation::validate_project;

/// Converges Project resources against the project-hosting platform.
pub struct ProjectReconciler {
    store: Arc<dyn ResourceStore<ProjectResource>>,
    sync: ProjectPathSync,
    gate: FinalizerGate,
    last_applied_annotation: String,
    resync: Option<Duration>,
}

impl ProjectReconciler {
    pub fn new(
        store: Arc<dyn ResourceStore<ProjectResource>>,
        sync: ProjectPathSync,
        gate: FinalizerGate,
        last_applied_annotation: impl Into<String>,
        resync: Option<Duration>,
    ) -> Self {
        Self {
            store,
            sync,
            gate,
            last_applied_annotation: last_applied_annotation.into(),
            resync,
        }
    }

    async fn reconcile_inner(&self, id: &ResourceId) -> Result<Action> {
        let Some(mut project) = self.store.get(id).await? else {
            debug!("Project no longer exists");
            return Ok(Action::Done);
        };

        match self.gate.state(&project.metadata) {
            LifecycleState::Removed => return Ok(Action::Done),
            LifecycleState::Deleting => {
                self.cleanup(&project.spec.paths).await?;
                release(&*self.store, &self.gate, project).await?;
                return Ok(Action::Done);
            }
            LifecycleState::Unregistered => {
                project = register(&*self.store, &self.gate, project).await?;
            }
            LifecycleState::Registered => {}
        }

        validate_project(&project)?;

        let mut changed = false;

        if let Some(previous) = DriftDetector::last_applied::<ProjectSpec>(
            &project.metadata.annotations,
            &self.last_applied_annotation,
        ) {
            for removed in
                DriftDetector::removed_managed_paths(&project.spec.paths, &previous.paths)
            {
                info!(path = %removed.path, "Path no longer declared");
                changed |= self.remove(removed).await?;
            }
        }

        for path in project.spec.paths.iter().filter(|p| !p.external) {
            changed |= self.sync.reconcile_path(path).await?;
        }

        if mark_configured(&mut project.status, changed) {
            self.store.update_status(&project).await?;
        }

        Ok(Action::after_success(self.resync))
    }

    /// Removes every managed path; the finalizer stays until all succeed.
    async fn cleanup(&self, paths: &[ProjectPathSpec]) -> Result<()> {
        for path in paths.iter().filter(|p| !p.external) {
            self.remove(path).await?;
        }
        Ok(())
    }

    /// Archives or deletes one path. An already-absent project is not an error.
    async fn remove(&self, path: &ProjectPathSpec) -> Result<bool> {
        match self.sync.delete_path(path).await {
            Ok(changed) => Ok(changed),
            Err(e) if e.is_not_found() => {
                info!(path = %path.path, "{}, nothing to remove", e);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Reconciler for ProjectReconciler {
    async fn reconcile(&self, id: &ResourceId) -> Result<Action> {
        let span = info_span!("reconcile", kind = %ResourceKind::Project, id = %id);
        self.reconcile_inner(id).instrument(span).await
    }
}
