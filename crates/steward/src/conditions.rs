//! Status conditions surfaced to the declaring user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Tri-state status of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

impl std::fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConditionStatus::True => write!(f, "True"),
            ConditionStatus::False => write!(f, "False"),
            ConditionStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// The condition types the controller maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionType {
    /// The resource carries its finalizer and has been picked up.
    Initialized,
    /// The declared spec has been applied to the remote system.
    Configured,
}

impl ConditionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionType::Initialized => "Initialized",
            ConditionType::Configured => "Configured",
        }
    }

    fn reason(&self, status: ConditionStatus) -> &'static str {
        match (self, status) {
            (ConditionType::Initialized, ConditionStatus::True) => "FinalizerRegistered",
            (ConditionType::Initialized, _) => "Pending",
            (ConditionType::Configured, ConditionStatus::True) => "SpecApplied",
            (ConditionType::Configured, ConditionStatus::False) => "AwaitingReconcile",
            (ConditionType::Configured, ConditionStatus::Unknown) => "Unknown",
        }
    }
}

impl std::fmt::Display for ConditionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, timestamped status flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: ConditionStatus,
    pub last_transition_time: DateTime<Utc>,
    #[serde(default)]
    pub reason: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

/// Replace-by-type bookkeeping for condition lists.
pub struct ConditionRecorder;

impl ConditionRecorder {
    /// Sets `type_` to `status`, keeping one entry per type.
    ///
    /// The transition time only moves when the status actually changes.
    /// Returns true if the list was modified.
    pub fn upsert(
        conditions: &mut Vec<Condition>,
        type_: ConditionType,
        status: ConditionStatus,
    ) -> bool {
        Self::upsert_at(conditions, type_, status, Utc::now())
    }

    pub(crate) fn upsert_at(
        conditions: &mut Vec<Condition>,
        type_: ConditionType,
        status: ConditionStatus,
        now: DateTime<Utc>,
    ) -> bool {
        info!(condition = %type_, status = %status, "Setting condition");

        let reason = type_.reason(status).to_string();
        match conditions.iter_mut().find(|c| c.type_ == type_.as_str()) {
            Some(existing) => {
                if existing.status == status && existing.reason == reason {
                    return false;
                }
                if existing.status != status {
                    existing.last_transition_time = now;
                }
                existing.status = status;
                existing.reason = reason;
                true
            }
            None => {
                conditions.push(Condition {
                    type_: type_.as_str().to_string(),
                    status,
                    last_transition_time: now,
                    reason,
                    message: String::new(),
                });
                true
            }
        }
    }

    /// Looks up a condition by type.
    pub fn find(conditions: &[Condition], type_: ConditionType) -> Option<&Condition> {
        conditions.iter().find(|c| c.type_ == type_.as_str())
    }

    /// True when the condition exists with status `True`.
    pub fn is_true(conditions: &[Condition], type_: ConditionType) -> bool {
        Self::find(conditions, type_).is_some_and(|c| c.status == ConditionStatus::True)
    }
}
