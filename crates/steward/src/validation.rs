//! Validation of declared Project and Team resources.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use thiserror::Error;

use crate::resource::{ProjectResource, TeamResource};

// One path segment as accepted by the project-hosting platform.
static RE_PATH_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.\-]*$").unwrap());

/// A declaration that cannot be applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {kind} '{name}': {}", .errors.join("; "))]
pub struct ValidationError {
    pub kind: &'static str,
    pub name: String,
    pub errors: Vec<String>,
}

/// Validates a Project declaration, reporting every problem at once.
///
/// An empty path list is valid: it is how a user drops every managed path.
pub fn validate_project(project: &ProjectResource) -> Result<(), ValidationError> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for (i, path) in project.spec.paths.iter().enumerate() {
        if path.name.trim().is_empty() {
            errors.push(format!("paths[{}].name is required", i));
        }

        if let Some(reason) = check_path(&path.path) {
            errors.push(format!("paths[{}].path '{}' {}", i, path.path, reason));
        }

        if !seen.insert(path.path.as_str()) {
            errors.push(format!("paths[{}].path '{}' is declared twice", i, path.path));
        }
    }

    finish("Project", project.name(), errors)
}

/// Validates a Team declaration.
pub fn validate_team(team: &TeamResource) -> Result<(), ValidationError> {
    let mut errors = Vec::new();

    if team.name().trim().is_empty() {
        errors.push("metadata.name is required".to_string());
    }

    if team.spec.subjects.is_empty() {
        errors.push("spec.subjects must contain at least one member".to_string());
    }

    for (i, subject) in team.spec.subjects.iter().enumerate() {
        if subject.trim().is_empty() {
            errors.push(format!("subjects[{}] is empty", i));
        }
    }

    finish("Team", team.name(), errors)
}

fn finish(kind: &'static str, name: &str, errors: Vec<String>) -> Result<(), ValidationError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidationError {
            kind,
            name: name.to_string(),
            errors,
        })
    }
}

/// Returns why `path` is unusable, if it is.
fn check_path(path: &str) -> Option<String> {
    if path.is_empty() {
        return Some("is empty".to_string());
    }
    if path.starts_with('/') || path.ends_with('/') {
        return Some("must not start or end with '/'".to_string());
    }
    if !path.contains('/') {
        return Some("must name a parent group ('group/project')".to_string());
    }
    for segment in path.split('/') {
        if segment.is_empty() {
            return Some("contains an empty segment".to_string());
        }
        if segment == "." || segment == ".." {
            return Some(format!("contains relative segment '{}'", segment));
        }
        if !RE_PATH_SEGMENT.is_match(segment) {
            return Some(format!("contains invalid segment '{}'", segment));
        }
    }
    None
}
