pub mod conditions;
pub mod config;
pub mod controller;
pub mod drift;
pub mod error;
pub mod finalizer;
pub mod gitlab;
pub mod ldap;
pub mod logging;
pub mod reconciler;
pub mod resource;
pub mod secrets;
pub mod store;
pub mod validation;

pub use conditions::{Condition, ConditionRecorder, ConditionStatus, ConditionType};
pub use config::{load_config, ConfigError, ControllerConfig};
pub use controller::Controller;
pub use drift::DriftDetector;
pub use error::{ReconcileError, Result, StewardError};
pub use finalizer::{FinalizerGate, LifecycleState};
pub use gitlab::{GitLabClient, HierarchyResolver, ProjectApi, ProjectPathSync, ProjectSyncError};
pub use ldap::{DirectoryApi, DirectoryGroupSync, GroupSyncError, LdapDirectory};
pub use reconciler::{Action, ProjectReconciler, Reconciler, TeamReconciler};
pub use resource::{
    ObjectMeta, ProjectPathSpec, ProjectResource, ProjectSpec, ResourceId, ResourceKind,
    TeamResource, TeamSpec,
};
pub use secrets::{resolve_secret, SecretError};
pub use store::{ResourceStore, StoreError};
pub use validation::{validate_project, validate_team, ValidationError};
