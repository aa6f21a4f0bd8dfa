use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::schema::ControllerConfig;
use crate::ldap::NAME_PLACEHOLDER;
use crate::secrets::has_secret_source;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config YAML: {0}")]
    ParseYaml(#[from] serde_yaml::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ControllerConfig, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<ControllerConfig, ConfigError> {
    let config: ControllerConfig = serde_yaml::from_str(content)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_config(config: &ControllerConfig) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    let gitlab = &config.gitlab;
    if gitlab.url.trim().is_empty() {
        errors.push("gitlab.url is required".to_string());
    }
    if !has_secret_source(
        gitlab.token_insecure.as_deref(),
        gitlab.token_file.as_deref(),
        gitlab.token_env_var.as_deref(),
    ) {
        errors.push("gitlab needs one of tokenInsecure, tokenFile or tokenEnvVar".to_string());
    }

    let ldap = &config.ldap;
    if ldap.url.trim().is_empty() {
        errors.push("ldap.url is required".to_string());
    } else if !ldap.url.starts_with("ldap://") && !ldap.url.starts_with("ldaps://") {
        errors.push(format!(
            "ldap.url '{}' must start with ldap:// or ldaps://",
            ldap.url
        ));
    }
    if ldap.bind_dn.trim().is_empty() {
        errors.push("ldap.bindDn is required".to_string());
    }
    if !has_secret_source(
        ldap.bind_password_insecure.as_deref(),
        ldap.bind_password_file.as_deref(),
        ldap.bind_password_env_var.as_deref(),
    ) {
        errors.push(
            "ldap needs one of bindPasswordInsecure, bindPasswordFile or bindPasswordEnvVar"
                .to_string(),
        );
    }
    if ldap.group_search_base.trim().is_empty() {
        errors.push("ldap.groupSearchBase is required".to_string());
    }
    if !ldap.group_search_filter.contains(NAME_PLACEHOLDER) {
        errors.push(format!(
            "ldap.groupSearchFilter must contain the {} placeholder",
            NAME_PLACEHOLDER
        ));
    }
    if ldap.group_name_property.trim().is_empty() {
        errors.push("ldap.groupNameProperty is required".to_string());
    }

    let controller = &config.controller;
    if controller.project_finalizer.trim().is_empty() {
        errors.push("controller.projectFinalizer must not be empty".to_string());
    }
    if controller.team_finalizer.trim().is_empty() {
        errors.push("controller.teamFinalizer must not be empty".to_string());
    }
    if controller.last_applied_annotation.trim().is_empty() {
        errors.push("controller.lastAppliedAnnotation must not be empty".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation {
            message: errors.join("; "),
        })
    }
}
