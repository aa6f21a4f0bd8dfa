use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, info_span, Instrument};

use super::{mark_configured, register, release, Action, Reconciler};
use crate::error::Result;
use crate::finalizer::{FinalizerGate, LifecycleState};
use crate::ldap::{DirectoryGroupSync, GroupSyncError};
use crate::resource::{ResourceId, ResourceKind, TeamResource};
use crate::store::ResourceStore;
use crate::validation::validate_team;

/// Converges Team resources against the directory service.
///
/// The group is named after the resource, which cannot be renamed, so a
/// Team has no removal phase of its own: the group only goes away when the
/// resource does.
pub struct TeamReconciler {
    store: Arc<dyn ResourceStore<TeamResource>>,
    sync: DirectoryGroupSync,
    gate: FinalizerGate,
    resync: Option<Duration>,
}

impl TeamReconciler {
    pub fn new(
        store: Arc<dyn ResourceStore<TeamResource>>,
        sync: DirectoryGroupSync,
        gate: FinalizerGate,
        resync: Option<Duration>,
    ) -> Self {
        Self {
            store,
            sync,
            gate,
            resync,
        }
    }

    async fn reconcile_inner(&self, id: &ResourceId) -> Result<Action> {
        let Some(mut team) = self.store.get(id).await? else {
            debug!("Team no longer exists");
            return Ok(Action::Done);
        };

        match self.gate.state(&team.metadata) {
            LifecycleState::Removed => return Ok(Action::Done),
            LifecycleState::Deleting => {
                self.cleanup(team.name()).await?;
                release(&*self.store, &self.gate, team).await?;
                return Ok(Action::Done);
            }
            LifecycleState::Unregistered => {
                team = register(&*self.store, &self.gate, team).await?;
            }
            LifecycleState::Registered => {}
        }

        validate_team(&team)?;

        let outcome = self
            .sync
            .reconcile_group(team.name(), &team.spec.comment, &team.spec.subjects)
            .await?;

        let mut status_changed = mark_configured(&mut team.status, outcome.changed);
        if team.status.distinguished_name != outcome.distinguished_name {
            team.status.distinguished_name = outcome.distinguished_name;
            status_changed = true;
        }

        if status_changed {
            self.store.update_status(&team).await?;
        }

        Ok(Action::after_success(self.resync))
    }

    async fn cleanup(&self, name: &str) -> Result<()> {
        match self.sync.delete_group(name).await {
            Ok(()) => Ok(()),
            Err(e @ GroupSyncError::GroupNotFound { .. }) => {
                info!(group = name, "{}, nothing to remove", e);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                info!(group = name, "Group vanished during delete: {}", e);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Reconciler for TeamReconciler {
    async fn reconcile(&self, id: &ResourceId) -> Result<Action> {
        let span = info_span!("reconcile", kind = %ResourceKind::Team, id = %id);
        self.reconcile_inner(id).instrument(span).await
    }
}
