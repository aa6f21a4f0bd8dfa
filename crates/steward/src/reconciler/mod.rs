//! Per-kind reconciliation engines.
//!
//! The host calls [`Reconciler::reconcile`] at least once per change of a
//! resource and never concurrently for the same id. Each call re-reads the
//! resource and the remote state, runs the phases in order, and returns on
//! the first error; retry and backoff belong to the host.

pub mod project;
pub mod team;

pub use project::ProjectReconciler;
pub use team::TeamReconciler;

use async_trait::async_trait;
use std::time::Duration;

use crate::conditions::{ConditionRecorder, ConditionStatus, ConditionType};
use crate::error::Result;
use crate::finalizer::FinalizerGate;
use crate::resource::{HasConditions, Resource, ResourceId};
use crate::store::ResourceStore;

/// What the host should do after a successful reconcile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing to do until the next change.
    Done,
    /// Reconcile again after the delay.
    Requeue(Duration),
}

impl Action {
    pub(crate) fn after_success(resync: Option<Duration>) -> Self {
        resync.map_or(Action::Done, Action::Requeue)
    }
}

/// A convergence engine for one resource kind.
#[async_trait]
pub trait Reconciler: Send + Sync {
    async fn reconcile(&self, id: &ResourceId) -> Result<Action>;
}

/// Attaches the finalizer and initial conditions, then persists both.
///
/// Metadata and status are separate sub-resources, so this takes two writes.
/// The status write uses the version returned by the first.
pub(crate) async fn register<T, S>(
    store: &dyn ResourceStore<Resource<T, S>>,
    gate: &FinalizerGate,
    mut resource: Resource<T, S>,
) -> Result<Resource<T, S>>
where
    T: Send + Sync,
    S: HasConditions + Send + Sync,
{
    gate.register(&mut resource.metadata);
    let conditions = resource.status.conditions_mut();
    ConditionRecorder::upsert(conditions, ConditionType::Initialized, ConditionStatus::True);
    ConditionRecorder::upsert(conditions, ConditionType::Configured, ConditionStatus::False);

    let mut stored = store.update(&resource).await?;
    stored.status = resource.status;
    let stored = store.update_status(&stored).await?;

    tracing::info!(finalizer = gate.finalizer(), "Registered finalizer");
    Ok(stored)
}

/// Strips the finalizer after cleanup and persists the metadata.
pub(crate) async fn release<T, S>(
    store: &dyn ResourceStore<Resource<T, S>>,
    gate: &FinalizerGate,
    mut resource: Resource<T, S>,
) -> Result<()>
where
    T: Send + Sync,
    S: Send + Sync,
{
    if gate.release(&mut resource.metadata) {
        store.update(&resource).await?;
        tracing::info!(finalizer = gate.finalizer(), "Released finalizer");
    }
    Ok(())
}

/// Marks the spec as applied. Returns true if the conditions changed.
///
/// A reconcile that found the remote state already converged still
/// confirms a pending `Configured=False`.
pub(crate) fn mark_configured<S: HasConditions>(status: &mut S, changed: bool) -> bool {
    if !changed && ConditionRecorder::is_true(status.conditions(), ConditionType::Configured) {
        return false;
    }
    ConditionRecorder::upsert(
        status.conditions_mut(),
        ConditionType::Configured,
        ConditionStatus::True,
    )
}
