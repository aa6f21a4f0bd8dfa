//! Finalizer-gated lifecycle of a declared resource.
//!
//! A resource moves through four states:
//!
//! ```text
//! Unregistered --register--> Registered --user deletes--> Deleting --release--> Removed
//! ```
//!
//! The engines issue remote mutations only from `Registered` (convergence)
//! or `Deleting` (cleanup). An `Unregistered` resource is registered first,
//! so the finalizer is persisted before the first remote side effect.

use crate::resource::ObjectMeta;

/// Lifecycle state derived from the finalizer list and deletion timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Live resource that has not been tagged for cleanup yet.
    Unregistered,
    /// Live resource carrying the finalizer.
    Registered,
    /// Deletion requested; remote cleanup pending.
    Deleting,
    /// Deletion requested and finalizer released. Nothing left to do.
    Removed,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Unregistered => write!(f, "Unregistered"),
            LifecycleState::Registered => write!(f, "Registered"),
            LifecycleState::Deleting => write!(f, "Deleting"),
            LifecycleState::Removed => write!(f, "Removed"),
        }
    }
}

/// Reads and moves the lifecycle state for one finalizer name.
#[derive(Debug, Clone)]
pub struct FinalizerGate {
    finalizer: String,
}

impl FinalizerGate {
    pub fn new(finalizer: impl Into<String>) -> Self {
        Self {
            finalizer: finalizer.into(),
        }
    }

    pub fn finalizer(&self) -> &str {
        &self.finalizer
    }

    pub fn state(&self, meta: &ObjectMeta) -> LifecycleState {
        match (meta.is_marked_for_deletion(), meta.has_finalizer(&self.finalizer)) {
            (false, false) => LifecycleState::Unregistered,
            (false, true) => LifecycleState::Registered,
            (true, true) => LifecycleState::Deleting,
            (true, false) => LifecycleState::Removed,
        }
    }

    /// `Unregistered -> Registered`. Returns false if nothing changed.
    ///
    /// A resource already marked for deletion is never registered.
    pub fn register(&self, meta: &mut ObjectMeta) -> bool {
        if self.state(meta) != LifecycleState::Unregistered {
            return false;
        }
        meta.finalizers.push(self.finalizer.clone());
        true
    }

    /// `Deleting -> Removed`. Returns false if nothing changed.
    ///
    /// Callers must only release once every cleanup step has succeeded.
    pub fn release(&self, meta: &mut ObjectMeta) -> bool {
        if self.state(meta) != LifecycleState::Deleting {
            return false;
        }
        meta.finalizers.retain(|f| f != &self.finalizer);
        true
    }
}
