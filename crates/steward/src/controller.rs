//! Wiring of remote clients and engines from a [`ControllerConfig`].

use std::sync::Arc;

use crate::config::ControllerConfig;
use crate::error::StewardError;
use crate::finalizer::FinalizerGate;
use crate::gitlab::{GitLabClient, ProjectApi, ProjectPathSync};
use crate::ldap::{DirectoryApi, DirectoryGroupSync, LdapDirectory};
use crate::reconciler::{ProjectReconciler, TeamReconciler};
use crate::resource::{ProjectResource, TeamResource};
use crate::secrets::resolve_secret;
use crate::store::ResourceStore;

/// Both engines, ready to be driven by the host.
pub struct Controller {
    pub projects: ProjectReconciler,
    pub teams: TeamReconciler,
}

impl Controller {
    /// Builds the GitLab and LDAP clients from `config` and the engines on top.
    ///
    /// Credentials are resolved here, so a missing token fails at startup
    /// rather than on the first reconcile.
    pub fn from_config(
        config: &ControllerConfig,
        project_store: Arc<dyn ResourceStore<ProjectResource>>,
        team_store: Arc<dyn ResourceStore<TeamResource>>,
    ) -> Result<Self, StewardError> {
        let gitlab = &config.gitlab;
        let token = resolve_secret(
            gitlab.token_insecure.as_deref(),
            gitlab.token_file.as_deref(),
            gitlab.token_env_var.as_deref(),
        )?;
        let projects_api: Arc<dyn ProjectApi> =
            Arc::new(GitLabClient::new(&gitlab.url, token, gitlab.timeout())?);

        let ldap = &config.ldap;
        let bind_password = resolve_secret(
            ldap.bind_password_insecure.as_deref(),
            ldap.bind_password_file.as_deref(),
            ldap.bind_password_env_var.as_deref(),
        )?;
        let directory_api: Arc<dyn DirectoryApi> = Arc::new(LdapDirectory::new(
            &ldap.url,
            &ldap.bind_dn,
            bind_password,
            ldap.connect_timeout(),
        ));

        log::info!(
            "Managing projects on {} and groups under {} on {}",
            gitlab.url,
            ldap.group_search_base,
            ldap.url
        );

        Ok(Self::new(config, project_store, team_store, projects_api, directory_api))
    }

    /// Builds the engines over already constructed remote clients.
    pub fn new(
        config: &ControllerConfig,
        project_store: Arc<dyn ResourceStore<ProjectResource>>,
        team_store: Arc<dyn ResourceStore<TeamResource>>,
        projects_api: Arc<dyn ProjectApi>,
        directory_api: Arc<dyn DirectoryApi>,
    ) -> Self {
        let settings = &config.controller;
        let resync = settings.resync_interval();

        let projects = ProjectReconciler::new(
            project_store,
            ProjectPathSync::new(projects_api),
            FinalizerGate::new(&settings.project_finalizer),
            &settings.last_applied_annotation,
            resync,
        );

        let teams = TeamReconciler::new(
            team_store,
            DirectoryGroupSync::new(
                directory_api,
                config.ldap.group_search(),
                config.ldap.schema.clone(),
            ),
            FinalizerGate::new(&settings.team_finalizer),
            resync,
        );

        Self { projects, teams }
    }
}
