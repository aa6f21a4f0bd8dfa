//! K8s-style resource types for declared Project and Team state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::conditions::Condition;

/// The API version for all steward resources.
pub const API_VERSION: &str = "steward.io/v1";

/// Annotation holding the JSON of the last applied object.
pub const LAST_APPLIED_ANNOTATION: &str = "kubectl.kubernetes.io/last-applied-configuration";

/// The kind of resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Project,
    Team,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Project => write!(f, "Project"),
            ResourceKind::Team => write!(f, "Team"),
        }
    }
}

/// Identifies a declared resource within the host store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    pub namespace: Option<String>,
    pub name: String,
}

impl ResourceId {
    /// Creates a cluster-scoped id.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}", ns, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Metadata for a resource, following K8s conventions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    /// The unique name of the resource within its kind.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Key-value labels for organizing and selecting resources.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,

    /// Key-value annotations for storing additional metadata.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub annotations: HashMap<String, String>,

    /// Markers that block final removal until the controller releases them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub finalizers: Vec<String>,

    /// Set by the host store once the user has requested deletion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_timestamp: Option<DateTime<Utc>>,

    /// Opaque optimistic-concurrency token owned by the host store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
}

impl ObjectMeta {
    /// Creates a new ObjectMeta with just a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Returns the store id of the object.
    pub fn id(&self) -> ResourceId {
        ResourceId {
            namespace: self.namespace.clone(),
            name: self.name.clone(),
        }
    }

    pub fn has_finalizer(&self, finalizer: &str) -> bool {
        self.finalizers.iter().any(|f| f == finalizer)
    }

    pub fn is_marked_for_deletion(&self) -> bool {
        self.deletion_timestamp.is_some()
    }
}

/// A generic K8s-style resource wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource<T, S> {
    /// API version, should always be `steward.io/v1`.
    pub api_version: String,

    /// The kind of resource.
    pub kind: ResourceKind,

    /// Resource metadata.
    pub metadata: ObjectMeta,

    /// The declared state.
    pub spec: T,

    /// The observed state, written only by the controller.
    #[serde(default)]
    pub status: S,
}

impl<T, S: Default> Resource<T, S> {
    /// Creates a new resource with the given kind and spec.
    pub fn new(kind: ResourceKind, name: impl Into<String>, spec: T) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind,
            metadata: ObjectMeta::new(name),
            spec,
            status: S::default(),
        }
    }
}

impl<T, S> Resource<T, S> {
    /// Returns the name of the resource.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Returns the store id of the resource.
    pub fn id(&self) -> ResourceId {
        self.metadata.id()
    }
}

// ============================================================================
// Project Resource
// ============================================================================

/// One project path managed on the project-hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPathSpec {
    /// Display name of the project.
    pub name: String,

    /// Slash-delimited full path, e.g. `org/team/api`.
    pub path: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Bookkeeping only; never created, edited or removed remotely.
    #[serde(default)]
    pub external: bool,

    /// Archive instead of hard-deleting when the path goes away.
    #[serde(default = "default_true", rename = "archive-on-delete")]
    pub archive_on_delete: bool,
}

fn default_true() -> bool {
    true
}

impl ProjectPathSpec {
    /// Creates a managed path with no description that archives on delete.
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            description: String::new(),
            external: false,
            archive_on_delete: true,
        }
    }

    /// The last segment of the path.
    pub fn basename(&self) -> &str {
        basename(&self.path)
    }

    /// The path of the containing group, if any.
    pub fn parent(&self) -> Option<&str> {
        parent(&self.path)
    }
}

/// Returns the last `/`-separated segment of a path.
pub fn basename(path: &str) -> &str {
    path.rsplit_once('/').map(|(_, base)| base).unwrap_or(path)
}

/// Returns everything before the last `/`, or `None` for a single segment.
pub fn parent(path: &str) -> Option<&str> {
    path.rsplit_once('/').map(|(parent, _)| parent)
}

/// Project specification - the set of paths a Project declares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSpec {
    #[serde(default)]
    pub paths: Vec<ProjectPathSpec>,
}

/// Observed state of a Project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// Type alias for Project resource.
pub type ProjectResource = Resource<ProjectSpec, ProjectStatus>;

// ============================================================================
// Team Resource
// ============================================================================

/// Team specification - a directory group and its members.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSpec {
    /// Stored as the group's description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,

    /// Member identifiers, usually DNs.
    pub subjects: Vec<String>,
}

/// Observed state of a Team.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Distinguished name of the managed group.
    #[serde(default, rename = "dn", skip_serializing_if = "String::is_empty")]
    pub distinguished_name: String,
}

/// Type alias for Team resource.
pub type TeamResource = Resource<TeamSpec, TeamStatus>;

// ============================================================================
// Access to the conditions of any status
// ============================================================================

/// Statuses that carry a condition list.
pub trait HasConditions {
    fn conditions(&self) -> &[Condition];
    fn conditions_mut(&mut self) -> &mut Vec<Condition>;
}

impl HasConditions for ProjectStatus {
    fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.conditions
    }
}

impl HasConditions for TeamStatus {
    fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.conditions
    }
}

// ============================================================================
// Tests
// ============================================================================
