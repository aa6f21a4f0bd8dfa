//! A controller wired to in-memory remotes and stores.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use steward::config::{load_config_from_str, ControllerConfig};
use steward::reconciler::{Action, Reconciler};
use steward::resource::{
    ProjectResource, ProjectSpec, ProjectStatus, ResourceId, TeamResource, TeamSpec, TeamStatus,
};
use steward::{Controller, ReconcileError};

use super::fakes::{FakeDirectory, FakeGitLab, MemoryStore};

pub const PROJECT_FINALIZER: &str = "steward.io/project-finalizer";
pub const TEAM_FINALIZER: &str = "steward.io/team-finalizer";
pub const GROUP_BASE: &str = "ou=groups,dc=example,dc=com";
pub const RESYNC: Duration = Duration::from_secs(300);

const CONFIG: &str = r#"
gitlab:
  url: https://gitlab.example.com
  tokenInsecure: test-token
ldap:
  url: ldap://ldap.example.com:389
  bindDn: cn=admin,dc=example,dc=com
  bindPasswordInsecure: test-password
  groupSearchBase: ou=groups,dc=example,dc=com
"#;

pub fn test_config() -> ControllerConfig {
    load_config_from_str(CONFIG).unwrap()
}

/// Engines over fakes, with handles on every fake for assertions.
pub struct TestHarness {
    pub gitlab: Arc<FakeGitLab>,
    pub directory: Arc<FakeDirectory>,
    pub projects: Arc<MemoryStore<ProjectSpec, ProjectStatus>>,
    pub teams: Arc<MemoryStore<TeamSpec, TeamStatus>>,
    pub controller: Controller,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_remotes(FakeGitLab::new(), FakeDirectory::new("cn"))
    }

    pub fn with_gitlab(gitlab: FakeGitLab) -> Self {
        Self::with_remotes(gitlab, FakeDirectory::new("cn"))
    }

    pub fn with_directory(directory: FakeDirectory) -> Self {
        Self::with_remotes(FakeGitLab::new(), directory)
    }

    pub fn with_remotes(gitlab: FakeGitLab, directory: FakeDirectory) -> Self {
        let gitlab = Arc::new(gitlab);
        let directory = Arc::new(directory);
        let projects = Arc::new(MemoryStore::<ProjectSpec, ProjectStatus>::new());
        let teams = Arc::new(MemoryStore::<TeamSpec, TeamStatus>::new());

        let controller = Controller::new(
            &test_config(),
            projects.clone(),
            teams.clone(),
            gitlab.clone(),
            directory.clone(),
        );

        Self {
            gitlab,
            directory,
            projects,
            teams,
            controller,
        }
    }

    pub fn apply_project(&self, project: ProjectResource) -> ResourceId {
        self.projects.apply(project)
    }

    pub fn apply_team(&self, team: TeamResource) -> ResourceId {
        self.teams.apply(team)
    }

    pub async fn reconcile_project(&self, id: &ResourceId) -> Result<Action, ReconcileError> {
        self.controller.projects.reconcile(id).await
    }

    pub async fn reconcile_team(&self, id: &ResourceId) -> Result<Action, ReconcileError> {
        self.controller.teams.reconcile(id).await
    }

    /// Requests deletion the way a user would: sets the timestamp only.
    pub fn delete_project(&self, id: &ResourceId) {
        self.projects
            .edit(id, |p| p.metadata.deletion_timestamp = Some(chrono::Utc::now()));
    }

    pub fn delete_team(&self, id: &ResourceId) {
        self.teams
            .edit(id, |t| t.metadata.deletion_timestamp = Some(chrono::Utc::now()));
    }
}
