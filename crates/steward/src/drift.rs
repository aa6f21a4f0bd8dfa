//! Removal detection between the last applied and the current declaration.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::resource::ProjectPathSpec;

/// Only the `spec` of the last applied object matters.
#[derive(Debug, Deserialize)]
struct LastApplied<T> {
    spec: T,
}

/// Computes what a previous declaration had that the current one dropped.
pub struct DriftDetector;

impl DriftDetector {
    /// Decodes the last applied spec stored under `annotation`.
    ///
    /// Returns `None` when the annotation is missing or cannot be decoded;
    /// callers must then skip removal detection rather than guess.
    pub fn last_applied<T: DeserializeOwned>(
        annotations: &HashMap<String, String>,
        annotation: &str,
    ) -> Option<T> {
        let Some(raw) = annotations.get(annotation) else {
            debug!(annotation, "No last-applied snapshot, skipping removal detection");
            return None;
        };

        match serde_json::from_str::<LastApplied<T>>(raw) {
            Ok(snapshot) => Some(snapshot.spec),
            Err(e) => {
                warn!(
                    annotation,
                    error = %e,
                    "Could not decode last-applied snapshot, skipping removal detection"
                );
                None
            }
        }
    }

    /// Paths present in `previous` but absent from `current`, keyed by path.
    ///
    /// Order follows `previous`. Entries marked external are kept so callers
    /// can decide; use [`DriftDetector::removed_managed_paths`] to drop them.
    pub fn removed_paths<'a>(
        current: &[ProjectPathSpec],
        previous: &'a [ProjectPathSpec],
    ) -> Vec<&'a ProjectPathSpec> {
        let declared: HashSet<&str> = current.iter().map(|p| p.path.as_str()).collect();
        previous
            .iter()
            .filter(|p| !declared.contains(p.path.as_str()))
            .collect()
    }

    /// Removed paths that the controller manages remotely.
    pub fn removed_managed_paths<'a>(
        current: &[ProjectPathSpec],
        previous: &'a [ProjectPathSpec],
    ) -> Vec<&'a ProjectPathSpec> {
        Self::removed_paths(current, previous)
            .into_iter()
            .filter(|p| !p.external)
            .collect()
    }
}
