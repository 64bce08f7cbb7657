//! Kubernetes-style status conditions shared by every resource.

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Condition type reported by resolvers and builders once they are usable.
pub const CONDITION_READY: &str = "Ready";

/// Condition type reported by a build once it has finished.
pub const CONDITION_SUCCEEDED: &str = "Succeeded";

/// Tri-state status of a condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

impl ConditionStatus {
    pub fn is_true(self) -> bool {
        matches!(self, ConditionStatus::True)
    }
}

/// A single status condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub type_: String,
    #[serde(default)]
    pub status: ConditionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,
}

impl Condition {
    pub fn new(type_: impl Into<String>, status: ConditionStatus) -> Self {
        Self {
            type_: type_.into(),
            status,
            reason: None,
            message: None,
            last_transition_time: None,
        }
    }
}

/// Status of the condition with the given type. Missing conditions are `Unknown`.
pub fn condition_status(conditions: &[Condition], type_: &str) -> ConditionStatus {
    conditions
        .iter()
        .find(|c| c.type_ == type_)
        .map(|c| c.status)
        .unwrap_or_default()
}

/// Whether a status has caught up with the latest spec generation.
///
/// Snapshots that do not carry generations are treated as current.
pub fn generation_observed(generation: Option<i64>, observed: Option<i64>) -> bool {
    match (generation, observed) {
        (Some(generation), Some(observed)) => generation == observed,
        _ => true,
    }
}
