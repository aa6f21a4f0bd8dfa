use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ldap::{DirectorySchema, GroupSearch, SearchScope};
use crate::resource::LAST_APPLIED_ANNOTATION;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerConfig {
    pub gitlab: GitLabSettings,
    pub ldap: LdapSettings,
    #[serde(default)]
    pub controller: ControllerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GitLabSettings {
    /// Instance root, e.g. `https://gitlab.example.com`.
    pub url: String,
    #[serde(default)]
    pub token_insecure: Option<String>,
    #[serde(default)]
    pub token_file: Option<String>,
    #[serde(default)]
    pub token_env_var: Option<String>,
    #[serde(default = "default_gitlab_timeout")]
    pub timeout_secs: u64,
}

fn default_gitlab_timeout() -> u64 {
    30
}

impl GitLabSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LdapSettings {
    pub url: String,
    pub bind_dn: String,
    #[serde(default)]
    pub bind_password_insecure: Option<String>,
    #[serde(default)]
    pub bind_password_file: Option<String>,
    #[serde(default)]
    pub bind_password_env_var: Option<String>,
    pub group_search_base: String,
    #[serde(default)]
    pub group_search_scope: SearchScope,
    #[serde(default = "default_group_search_filter")]
    pub group_search_filter: String,
    #[serde(default = "default_group_name_property")]
    pub group_name_property: String,
    #[serde(default)]
    pub group_search_attributes: Vec<String>,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default)]
    pub schema: DirectorySchema,
}

fn default_group_search_filter() -> String {
    "(&(objectClass=groupOfUniqueNames)(cn={name}))".to_string()
}

fn default_group_name_property() -> String {
    "cn".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

impl LdapSettings {
    /// Search settings for managed groups.
    pub fn group_search(&self) -> GroupSearch {
        GroupSearch {
            base: self.group_search_base.clone(),
            scope: self.group_search_scope,
            filter: self.group_search_filter.clone(),
            name_property: self.group_name_property.clone(),
            attributes: self.group_search_attributes.clone(),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerSettings {
    /// Requeue delay after a successful reconcile; 0 disables requeueing.
    #[serde(default = "default_resync_interval")]
    pub resync_interval_secs: u64,
    #[serde(default = "default_project_finalizer")]
    pub project_finalizer: String,
    #[serde(default = "default_team_finalizer")]
    pub team_finalizer: String,
    #[serde(default = "default_last_applied_annotation")]
    pub last_applied_annotation: String,
}

fn default_resync_interval() -> u64 {
    300
}

fn default_project_finalizer() -> String {
    "steward.io/project-finalizer".to_string()
}

fn default_team_finalizer() -> String {
    "steward.io/team-finalizer".to_string()
}

fn default_last_applied_annotation() -> String {
    LAST_APPLIED_ANNOTATION.to_string()
}

impl ControllerSettings {
    pub fn resync_interval(&self) -> Option<Duration> {
        match self.resync_interval_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            resync_interval_secs: default_resync_interval(),
            project_finalizer: default_project_finalizer(),
            team_finalizer: default_team_finalizer(),
            last_applied_annotation: default_last_applied_annotation(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is unset, e.g. `info,steward=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}
