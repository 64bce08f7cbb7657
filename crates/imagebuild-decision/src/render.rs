//! Rendering decisions for the reconciler: build annotations and the image condition.

use imagebuild_core::build::{BUILD_CHANGES_ANNOTATION, REASON_ANNOTATION};
use imagebuild_core::{Condition, ConditionStatus};
use std::collections::BTreeMap;

use crate::engine::BuildDecision;

/// Condition type the reconciler records a decision under on the image.
pub const CONDITION_BUILD_NEEDED: &str = "BuildNeeded";

impl BuildDecision {
    /// Comma-separated reason kinds (`"CONFIG,COMMIT"`), or `None` when no build is needed.
    pub fn reason_annotation(&self) -> Option<String> {
        if !self.is_needed() {
            return None;
        }
        let kinds: Vec<String> = self.kinds().map(|k| k.to_string()).collect();
        Some(kinds.join(","))
    }

    /// JSON document of every reason and its payload.
    pub fn changes(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.reasons)
    }

    /// Annotations to put on the build this decision requests. Empty when no build is needed.
    pub fn annotations(&self) -> serde_json::Result<BTreeMap<String, String>> {
        let mut annotations = BTreeMap::new();
        if let Some(reasons) = self.reason_annotation() {
            annotations.insert(REASON_ANNOTATION.to_string(), reasons);
            annotations.insert(BUILD_CHANGES_ANNOTATION.to_string(), self.changes()?);
        }
        Ok(annotations)
    }

    /// The condition the reconciler records on the image.
    pub fn condition(&self) -> Condition {
        let mut condition = Condition::new(CONDITION_BUILD_NEEDED, self.status);
        match self.status {
            ConditionStatus::True => {
                condition.reason = Some("BuildRequired".to_string());
                condition.message = self
                    .reason_annotation()
                    .map(|reasons| format!("A new build is required: {}", reasons));
            }
            ConditionStatus::False => {
                condition.reason = Some("UpToDate".to_string());
            }
            ConditionStatus::Unknown => {
                condition.reason = Some("DependenciesNotReady".to_string());
                condition.message =
                    Some("Waiting for the source resolver and builder to be ready".to_string());
            }
        }
        condition
    }
}
