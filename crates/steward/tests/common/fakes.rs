//! In-memory stand-ins for the host store and both remote systems.
//!
//! Every fake records the calls it receives as short strings such as
//! `"create_group org"`, and can be told to fail a given operation.

#![allow(dead_code)]

use async_trait::async_trait;
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use steward::gitlab::{
    GitLabError, NewGroup, NewProject, ProjectApi, ProjectEdit, RemoteGroup, RemoteProject,
};
use steward::ldap::{Attribute, DirectoryApi, DirectoryEntry, DirectoryError, SearchRequest};
use steward::resource::{Resource, ResourceId};
use steward::store::{ResourceStore, StoreError};

fn injected(status: u16) -> GitLabError {
    GitLabError::Status {
        status,
        message: "injected failure".to_string(),
    }
}

// ============================================================================
// Project-hosting platform
// ============================================================================

#[derive(Default)]
struct GitLabState {
    groups: Vec<RemoteGroup>,
    projects: Vec<RemoteProject>,
    next_id: u64,
    calls: Vec<String>,
    failing: HashMap<String, u16>,
}

impl GitLabState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn check(&mut self, op: &str, call: String) -> Result<(), GitLabError> {
        self.calls.push(call);
        if let Some(status) = self.failing.get(op) {
            return Err(injected(*status));
        }
        Ok(())
    }

    fn project_path(&self, id: u64) -> String {
        self.projects
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.path_with_namespace.clone())
            .unwrap_or_default()
    }
}

/// A GitLab instance held in memory.
#[derive(Default)]
pub struct FakeGitLab {
    state: Mutex<GitLabState>,
}

impl FakeGitLab {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a group (and any missing ancestors) at `full_path`.
    pub fn with_group(self, full_path: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let mut parent_id = None;
            let mut prefix = String::new();
            for segment in full_path.split('/') {
                if !prefix.is_empty() {
                    prefix.push('/');
                }
                prefix.push_str(segment);

                let existing = state.groups.iter().find(|g| g.full_path == prefix).map(|g| g.id);
                let id = match existing {
                    Some(id) => id,
                    None => {
                        let id = state.next_id();
                        state.groups.push(RemoteGroup {
                            id,
                            name: segment.to_string(),
                            path: segment.to_string(),
                            full_path: prefix.clone(),
                            parent_id,
                        });
                        id
                    }
                };
                parent_id = Some(id);
            }
        }
        self
    }

    /// Seeds a project at `full_path`; its namespace must already exist.
    pub fn with_project(self, full_path: &str, name: &str, description: &str) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = state.next_id();
            let path = full_path.rsplit('/').next().unwrap_or(full_path).to_string();
            state.projects.push(RemoteProject {
                id,
                name: name.to_string(),
                path,
                path_with_namespace: full_path.to_string(),
                description: Some(description.to_string()),
                archived: false,
            });
        }
        self
    }

    /// Makes every call of `op` (e.g. `"archive_project"`) fail with a 500.
    pub fn fail_on(&self, op: &str) {
        self.fail_with(op, 500);
    }

    /// Makes every call of `op` fail with `status`.
    pub fn fail_with(&self, op: &str, status: u16) {
        self.state
            .lock()
            .unwrap()
            .failing
            .insert(op.to_string(), status);
    }

    pub fn recover(&self, op: &str) {
        self.state.lock().unwrap().failing.remove(op);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Recorded calls that changed remote state.
    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("search_"))
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn group_paths(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.groups.iter().map(|g| g.full_path.clone()).collect()
    }

    pub fn project(&self, full_path: &str) -> Option<RemoteProject> {
        let state = self.state.lock().unwrap();
        state
            .projects
            .iter()
            .find(|p| p.path_with_namespace == full_path)
            .cloned()
    }
}

#[async_trait]
impl ProjectApi for FakeGitLab {
    async fn search_groups(&self, fragment: &str) -> Result<Vec<RemoteGroup>, GitLabError> {
        let mut state = self.state.lock().unwrap();
        state.check("search_groups", format!("search_groups {}", fragment))?;
        Ok(state
            .groups
            .iter()
            .filter(|g| g.path.contains(fragment) || g.name.contains(fragment))
            .cloned()
            .collect())
    }

    async fn create_group(&self, group: &NewGroup) -> Result<RemoteGroup, GitLabError> {
        let mut state = self.state.lock().unwrap();
        let full_path = match group.parent_id {
            Some(parent_id) => {
                let parent = state
                    .groups
                    .iter()
                    .find(|g| g.id == parent_id)
                    .map(|g| g.full_path.clone())
                    .ok_or(GitLabError::Status {
                        status: 404,
                        message: format!("parent group {} not found", parent_id),
                    })?;
                format!("{}/{}", parent, group.path)
            }
            None => group.path.clone(),
        };
        state.check("create_group", format!("create_group {}", full_path))?;

        if state.groups.iter().any(|g| g.full_path == full_path) {
            return Err(GitLabError::Status {
                status: 400,
                message: format!("group {} has already been taken", full_path),
            });
        }

        let id = state.next_id();
        let created = RemoteGroup {
            id,
            name: group.name.clone(),
            path: group.path.clone(),
            full_path,
            parent_id: group.parent_id,
        };
        state.groups.push(created.clone());
        Ok(created)
    }

    async fn search_projects(&self, fragment: &str) -> Result<Vec<RemoteProject>, GitLabError> {
        let mut state = self.state.lock().unwrap();
        state.check("search_projects", format!("search_projects {}", fragment))?;
        Ok(state
            .projects
            .iter()
            .filter(|p| p.path.contains(fragment) || p.name.contains(fragment))
            .cloned()
            .collect())
    }

    async fn create_project(&self, project: &NewProject) -> Result<RemoteProject, GitLabError> {
        let mut state = self.state.lock().unwrap();
        let full_path = match project.namespace_id {
            Some(namespace_id) => {
                let namespace = state
                    .groups
                    .iter()
                    .find(|g| g.id == namespace_id)
                    .map(|g| g.full_path.clone())
                    .unwrap_or_default();
                format!("{}/{}", namespace, project.path)
            }
            None => project.path.clone(),
        };
        state.check("create_project", format!("create_project {}", full_path))?;

        let id = state.next_id();
        let created = RemoteProject {
            id,
            name: project.name.clone(),
            path: project.path.clone(),
            path_with_namespace: full_path,
            description: Some(project.description.clone()),
            archived: false,
        };
        state.projects.push(created.clone());
        Ok(created)
    }

    async fn edit_project(
        &self,
        id: u64,
        edit: &ProjectEdit,
    ) -> Result<RemoteProject, GitLabError> {
        let mut state = self.state.lock().unwrap();
        let path = state.project_path(id);
        state.check("edit_project", format!("edit_project {}", path))?;

        let project = state
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(GitLabError::Status {
                status: 404,
                message: "404 Project Not Found".to_string(),
            })?;
        project.name = edit.name.clone();
        project.description = Some(edit.description.clone());
        Ok(project.clone())
    }

    async fn archive_project(&self, id: u64) -> Result<(), GitLabError> {
        let mut state = self.state.lock().unwrap();
        let path = state.project_path(id);
        state.check("archive_project", format!("archive_project {}", path))?;

        if let Some(project) = state.projects.iter_mut().find(|p| p.id == id) {
            project.archived = true;
        }
        Ok(())
    }

    async fn delete_project(&self, id: u64) -> Result<(), GitLabError> {
        let mut state = self.state.lock().unwrap();
        let path = state.project_path(id);
        state.check("delete_project", format!("delete_project {}", path))?;

        state.projects.retain(|p| p.id != id);
        Ok(())
    }
}

// ============================================================================
// Directory service
// ============================================================================

#[derive(Default)]
struct DirectoryState {
    entries: BTreeMap<String, DirectoryEntry>,
    calls: Vec<String>,
    failing: HashSet<String>,
}

impl DirectoryState {
    fn check(&mut self, op: &str, call: String) -> Result<(), DirectoryError> {
        self.calls.push(call);
        if self.failing.contains(op) {
            return Err(DirectoryError::Rejected {
                rc: 52,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

// Directory strings reject zero-length values, as a real server does.
fn check_values(attributes: &[Attribute]) -> Result<(), DirectoryError> {
    match attributes.iter().find(|(_, values)| values.iter().any(String::is_empty)) {
        Some((name, _)) => Err(DirectoryError::Rejected {
            rc: 21,
            message: format!("invalidAttributeSyntax: {}: value #0 empty", name),
        }),
        None => Ok(()),
    }
}

/// A directory server held in memory.
///
/// Searches understand only the `(<nameProperty>=<value>)` part of a filter.
pub struct FakeDirectory {
    name_property: String,
    state: Mutex<DirectoryState>,
}

impl FakeDirectory {
    pub fn new(name_property: &str) -> Self {
        Self {
            name_property: name_property.to_string(),
            state: Mutex::new(DirectoryState::default()),
        }
    }

    /// Seeds a group entry.
    pub fn with_group(self, dn: &str, description: &str, members: &[&str]) -> Self {
        let entry = DirectoryEntry::new(dn)
            .with_attribute("objectClass", vec!["groupOfUniqueNames".to_string()])
            .with_attribute("description", vec![description.to_string()])
            .with_attribute(
                "uniqueMember",
                members.iter().map(|m| m.to_string()).collect(),
            );
        self.state
            .lock()
            .unwrap()
            .entries
            .insert(dn.to_lowercase(), entry);
        self
    }

    pub fn fail_on(&self, op: &str) {
        self.state.lock().unwrap().failing.insert(op.to_string());
    }

    pub fn recover(&self, op: &str) {
        self.state.lock().unwrap().failing.remove(op);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("search"))
            .collect()
    }

    pub fn entry(&self, dn: &str) -> Option<DirectoryEntry> {
        self.state
            .lock()
            .unwrap()
            .entries
            .get(&dn.to_lowercase())
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }

    fn searched_name(&self, filter: &str) -> Option<String> {
        let pattern = format!(r"\({}=([^)]*)\)", regex::escape(&self.name_property));
        let re = Regex::new(&pattern).ok()?;
        re.captures(filter).map(|c| c[1].to_lowercase())
    }
}

#[async_trait]
impl DirectoryApi for FakeDirectory {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        let name = self.searched_name(&request.filter);
        let mut state = self.state.lock().unwrap();
        state.check("search", format!("search {}", request.filter))?;

        let Some(name) = name else {
            return Ok(Vec::new());
        };
        let rdn = format!("{}={},", self.name_property.to_lowercase(), name);
        let base = request.base.to_lowercase();
        Ok(state
            .entries
            .iter()
            .filter(|(dn, _)| dn.starts_with(&rdn) && dn.ends_with(&base))
            .map(|(_, entry)| entry.clone())
            .collect())
    }

    async fn add(&self, dn: &str, attributes: &[Attribute]) -> Result<(), DirectoryError> {
        let mut state = self.state.lock().unwrap();
        state.check("add", format!("add {}", dn))?;
        check_values(attributes)?;

        let key = dn.to_lowercase();
        if state.entries.contains_key(&key) {
            return Err(DirectoryError::Rejected {
                rc: 68,
                message: "entryAlreadyExists".to_string(),
            });
        }
        let entry = DirectoryEntry {
            dn: dn.to_string(),
            attributes: attributes.iter().cloned().collect(),
        };
        state.entries.insert(key, entry);
        Ok(())
    }

    async fn modify(&self, dn: &str, replacements: &[Attribute]) -> Result<(), DirectoryError> {
        let mut state = self.state.lock().unwrap();
        state.check("modify", format!("modify {}", dn))?;
        check_values(replacements)?;

        let entry = state
            .entries
            .get_mut(&dn.to_lowercase())
            .ok_or(DirectoryError::Rejected {
                rc: 32,
                message: "noSuchObject".to_string(),
            })?;
        // An empty value set removes the attribute.
        for (name, values) in replacements {
            entry.attributes.retain(|key, _| !key.eq_ignore_ascii_case(name));
            if !values.is_empty() {
                entry.attributes.insert(name.clone(), values.clone());
            }
        }
        Ok(())
    }

    async fn delete(&self, dn: &str) -> Result<(), DirectoryError> {
        let mut state = self.state.lock().unwrap();
        state.check("delete", format!("delete {}", dn))?;

        state
            .entries
            .remove(&dn.to_lowercase())
            .map(|_| ())
            .ok_or(DirectoryError::Rejected {
                rc: 32,
                message: "noSuchObject".to_string(),
            })
    }
}

// ============================================================================
// Host store
// ============================================================================

struct StoreState<T, S> {
    objects: HashMap<ResourceId, Resource<T, S>>,
    version: u64,
    writes: Vec<String>,
    fail_writes: bool,
}

/// A host store with optimistic concurrency.
///
/// Like a real API server, it drops an object once it is marked for
/// deletion and carries no finalizers.
pub struct MemoryStore<T, S> {
    state: Mutex<StoreState<T, S>>,
}

impl<T: Clone, S: Clone> MemoryStore<T, S> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(StoreState {
                objects: HashMap::new(),
                version: 0,
                writes: Vec::new(),
                fail_writes: false,
            }),
        }
    }

    /// Stores `resource` as if the user had applied it.
    pub fn apply(&self, mut resource: Resource<T, S>) -> ResourceId {
        let mut state = self.state.lock().unwrap();
        state.version += 1;
        resource.metadata.resource_version = Some(state.version.to_string());
        let id = resource.id();
        state.objects.insert(id.clone(), resource);
        id
    }

    pub fn get_now(&self, id: &ResourceId) -> Option<Resource<T, S>> {
        self.state.lock().unwrap().objects.get(id).cloned()
    }

    /// Edits the stored object in place, bumping its version.
    pub fn edit(&self, id: &ResourceId, f: impl FnOnce(&mut Resource<T, S>)) {
        let mut state = self.state.lock().unwrap();
        state.version += 1;
        let version = state.version.to_string();
        if let Some(object) = state.objects.get_mut(id) {
            f(object);
            object.metadata.resource_version = Some(version);
        }
    }

    pub fn writes(&self) -> Vec<String> {
        self.state.lock().unwrap().writes.clone()
    }

    pub fn clear_writes(&self) {
        self.state.lock().unwrap().writes.clear();
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap().fail_writes = fail;
    }

    fn write(
        &self,
        kind: &str,
        resource: &Resource<T, S>,
        apply: impl FnOnce(&mut Resource<T, S>),
    ) -> Result<Resource<T, S>, StoreError> {
        let mut state = self.state.lock().unwrap();
        let id = resource.id();
        state.writes.push(format!("{} {}", kind, id));
        if state.fail_writes {
            return Err(StoreError::Backend("injected failure".to_string()));
        }

        state.version += 1;
        let version = state.version.to_string();
        let stored = state
            .objects
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        if stored.metadata.resource_version != resource.metadata.resource_version {
            return Err(StoreError::Conflict {
                id,
                resource_version: resource.metadata.resource_version.clone(),
            });
        }

        apply(stored);
        stored.metadata.resource_version = Some(version);
        let result = stored.clone();

        if result.metadata.is_marked_for_deletion() && result.metadata.finalizers.is_empty() {
            state.objects.remove(&id);
        }
        Ok(result)
    }
}

#[async_trait]
impl<T, S> ResourceStore<Resource<T, S>> for MemoryStore<T, S>
where
    T: Clone + Send + Sync,
    S: Clone + Send + Sync,
{
    async fn get(&self, id: &ResourceId) -> Result<Option<Resource<T, S>>, StoreError> {
        Ok(self.state.lock().unwrap().objects.get(id).cloned())
    }

    async fn update(&self, resource: &Resource<T, S>) -> Result<Resource<T, S>, StoreError> {
        self.write("update", resource, |stored| {
            stored.metadata = resource.metadata.clone();
            stored.spec = resource.spec.clone();
        })
    }

    async fn update_status(
        &self,
        resource: &Resource<T, S>,
    ) -> Result<Resource<T, S>, StoreError> {
        self.write("update_status", resource, |stored| {
            stored.status = resource.status.clone();
        })
    }
}
