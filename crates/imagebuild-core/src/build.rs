//! The Build resource: one build attempt, its inputs and its outcome.

use k8s_openapi::api::core::v1::{EnvVar, ResourceRequirements};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};

use crate::image::Binding;
use crate::meta::{CONDITION_SUCCEEDED, Condition, ConditionStatus, condition_status};
use crate::source::SourceConfig;

/// Annotation an operator sets on a build to request another one.
pub const ADDITIONAL_BUILD_NEEDED_ANNOTATION: &str = "image.kpack.io/additionalBuildNeeded";

/// Annotation carrying the comma-separated reasons a build was created for.
pub const REASON_ANNOTATION: &str = "image.kpack.io/reason";

/// Annotation carrying the JSON-encoded changes a build was created for.
pub const BUILD_CHANGES_ANNOTATION: &str = "image.kpack.io/buildChanges";

/// A record of one build attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    #[serde(default)]
    pub metadata: ObjectMeta,
    pub spec: BuildSpec,
    #[serde(default)]
    pub status: BuildStatus,
}

/// Snapshot of the inputs a build was started with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSpec {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub builder: BuildBuilderSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<Vec<EnvVar>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bindings: Option<Vec<Binding>>,
}

/// Builder image a build ran on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildBuilderSpec {
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    /// Buildpacks that took part in the build.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub build_metadata: Vec<BuildpackInfo>,
    #[serde(default)]
    pub stack: Stack,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_name: Option<String>,
}

/// Identity of a buildpack that took part in a build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildpackInfo {
    pub id: String,
    pub version: String,
}

impl BuildpackInfo {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
        }
    }
}

/// Stack (base run image) a build was composed on, or a builder currently offers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stack {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Build {
    pub fn name(&self) -> &str {
        self.metadata.name.as_deref().unwrap_or_default()
    }

    /// The tag the build was pushed to. The first entry of `spec.tags` is the
    /// image's destination; the rest are additional tags.
    pub fn tag(&self) -> &str {
        self.spec.tags.first().map(String::as_str).unwrap_or_default()
    }

    pub fn outcome(&self) -> ConditionStatus {
        condition_status(&self.status.conditions, CONDITION_SUCCEEDED)
    }

    pub fn is_success(&self) -> bool {
        self.outcome().is_true()
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(key))
            .map(String::as_str)
    }

    pub fn env(&self) -> &[EnvVar] {
        self.spec.env.as_deref().unwrap_or_default()
    }

    pub fn resources(&self) -> Option<&ResourceRequirements> {
        self.spec.resources.as_ref()
    }

    pub fn bindings(&self) -> &[Binding] {
        self.spec.bindings.as_deref().unwrap_or_default()
    }

    /// The run image recorded by the build, if any.
    pub fn run_image(&self) -> Option<&str> {
        self.status
            .stack
            .run_image
            .as_deref()
            .filter(|r| !r.is_empty())
    }
}
