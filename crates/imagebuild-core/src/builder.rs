//! Builder resources: the buildpacks and run image available to builds.
//!
//! Builders come in two scopes, [`Builder`] (namespaced) and
//! [`ClusterBuilder`]. Both are consumed through the [`BuilderResource`] trait.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};

use crate::build::{BuildpackInfo, Stack};
use crate::meta::{CONDITION_READY, Condition, condition_status, generation_observed};

/// A buildpack offered by a builder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildpackMetadata {
    pub id: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
}

/// The buildpacks a builder currently provides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildpackMetadataList(pub Vec<BuildpackMetadata>);

impl BuildpackMetadataList {
    /// Whether the builder provides exactly this id and version.
    pub fn include(&self, info: &BuildpackInfo) -> bool {
        self.iter()
            .any(|bp| bp.id == info.id && bp.version == info.version)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BuildpackMetadata> {
        self.0.iter()
    }
}

impl From<Vec<BuildpackMetadata>> for BuildpackMetadataList {
    fn from(buildpacks: Vec<BuildpackMetadata>) -> Self {
        Self(buildpacks)
    }
}

/// What the decision engine needs to know about a builder.
pub trait BuilderResource: Send + Sync {
    /// Kind of the resource (e.g., "ClusterBuilder").
    fn kind(&self) -> &'static str;

    /// Whether the builder has resolved its current generation.
    fn ready(&self) -> bool;

    /// Buildpacks the builder provides.
    fn buildpack_metadata(&self) -> &BuildpackMetadataList;

    /// Run image reference new builds are composed on. Empty if unknown.
    fn run_image(&self) -> &str;
}

/// Observed state shared by both builder scopes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub builder_metadata: BuildpackMetadataList,
    #[serde(default)]
    pub stack: Stack,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_image: Option<String>,
}

impl BuilderStatus {
    fn ready(&self, generation: Option<i64>) -> bool {
        condition_status(&self.conditions, CONDITION_READY).is_true()
            && generation_observed(generation, self.observed_generation)
    }

    fn run_image(&self) -> &str {
        self.stack.run_image.as_deref().unwrap_or_default()
    }
}

/// A namespace-scoped builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Builder {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: BuilderSpec,
    #[serde(default)]
    pub status: BuilderStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuilderSpec {
    #[serde(default)]
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
}

/// A cluster-scoped builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterBuilder {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: ClusterBuilderSpec,
    #[serde(default)]
    pub status: BuilderStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterBuilderSpec {
    #[serde(default)]
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_ref: Option<ServiceAccountRef>,
}

/// Service account in an explicit namespace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAccountRef {
    pub namespace: String,
    pub name: String,
}

impl BuilderResource for Builder {
    fn kind(&self) -> &'static str {
        "Builder"
    }

    fn ready(&self) -> bool {
        self.status.ready(self.metadata.generation)
    }

    fn buildpack_metadata(&self) -> &BuildpackMetadataList {
        &self.status.builder_metadata
    }

    fn run_image(&self) -> &str {
        self.status.run_image()
    }
}

impl BuilderResource for ClusterBuilder {
    fn kind(&self) -> &'static str {
        "ClusterBuilder"
    }

    fn ready(&self) -> bool {
        self.status.ready(self.metadata.generation)
    }

    fn buildpack_metadata(&self) -> &BuildpackMetadataList {
        &self.status.builder_metadata
    }

    fn run_image(&self) -> &str {
        self.status.run_image()
    }
}

/// Either builder scope, tagged by `kind` when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum AnyBuilder {
    Builder(Builder),
    ClusterBuilder(ClusterBuilder),
}

impl AnyBuilder {
    fn inner(&self) -> &dyn BuilderResource {
        match self {
            AnyBuilder::Builder(b) => b,
            AnyBuilder::ClusterBuilder(b) => b,
        }
    }
}

impl BuilderResource for AnyBuilder {
    fn kind(&self) -> &'static str {
        self.inner().kind()
    }

    fn ready(&self) -> bool {
        self.inner().ready()
    }

    fn buildpack_metadata(&self) -> &BuildpackMetadataList {
        self.inner().buildpack_metadata()
    }

    fn run_image(&self) -> &str {
        self.inner().run_image()
    }
}
