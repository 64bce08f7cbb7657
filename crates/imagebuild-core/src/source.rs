//! Source configuration and the SourceResolver resource.
//!
//! A source is located in one of three ways (git, blob, registry image). The
//! location is configuration; the resolved commit or digest is the revision.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Deserialize, Serialize};

use crate::build::Build;
use crate::meta::{CONDITION_READY, Condition, condition_status, generation_observed};

/// Where the source of an image lives.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    #[serde(flatten)]
    pub location: SourceLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceLocation {
    Git(GitSource),
    Blob(BlobSource),
    Registry(RegistrySource),
}

impl Default for SourceLocation {
    fn default() -> Self {
        SourceLocation::Git(GitSource::default())
    }
}

impl SourceLocation {
    pub fn kind(&self) -> &'static str {
        match self {
            SourceLocation::Git(_) => "git",
            SourceLocation::Blob(_) => "blob",
            SourceLocation::Registry(_) => "registry",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitSource {
    pub url: String,
    /// Branch, tag or commit when declared; always a commit once resolved.
    #[serde(default)]
    pub revision: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobSource {
    pub url: String,
    /// Content digest of the downloaded archive, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySource {
    pub image: String,
    /// Digest the image reference resolved to, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

impl SourceConfig {
    pub fn git(url: impl Into<String>, revision: impl Into<String>) -> Self {
        Self {
            location: SourceLocation::Git(GitSource {
                url: url.into(),
                revision: revision.into(),
            }),
            sub_path: None,
        }
    }

    fn sub_path(&self) -> &str {
        self.sub_path.as_deref().unwrap_or_default()
    }

    /// Whether `other` points somewhere else, ignoring revisions.
    pub fn location_differs(&self, other: &SourceConfig) -> bool {
        let location_differs = match (&self.location, &other.location) {
            (SourceLocation::Git(a), SourceLocation::Git(b)) => a.url != b.url,
            (SourceLocation::Blob(a), SourceLocation::Blob(b)) => a.url != b.url,
            (SourceLocation::Registry(a), SourceLocation::Registry(b)) => a.image != b.image,
            _ => true,
        };
        location_differs || self.sub_path() != other.sub_path()
    }
}

/// How the revision of a source moved between a recorded build and now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RevisionChange {
    Git { old: String, new: String },
    Blob { old: String, new: String },
    Registry { old: String, new: String },
    /// Revisions cannot be compared (different source kinds or unknown digests).
    NotApplicable,
}

impl RevisionChange {
    /// Revision change from the source a build recorded to a resolved source.
    pub fn between(recorded: &SourceConfig, resolved: &SourceConfig) -> Self {
        match (&recorded.location, &resolved.location) {
            (SourceLocation::Git(old), SourceLocation::Git(new)) => RevisionChange::Git {
                old: old.revision.clone(),
                new: new.revision.clone(),
            },
            (SourceLocation::Blob(old), SourceLocation::Blob(new)) => {
                match (&old.digest, &new.digest) {
                    (Some(old), Some(new)) => RevisionChange::Blob {
                        old: old.clone(),
                        new: new.clone(),
                    },
                    _ => RevisionChange::NotApplicable,
                }
            }
            (SourceLocation::Registry(old), SourceLocation::Registry(new)) => {
                match (&old.digest, &new.digest) {
                    (Some(old), Some(new)) => RevisionChange::Registry {
                        old: old.clone(),
                        new: new.clone(),
                    },
                    _ => RevisionChange::NotApplicable,
                }
            }
            _ => RevisionChange::NotApplicable,
        }
    }

    pub fn has_changed(&self) -> bool {
        match self {
            RevisionChange::Git { old, new }
            | RevisionChange::Blob { old, new }
            | RevisionChange::Registry { old, new } => old != new,
            RevisionChange::NotApplicable => false,
        }
    }
}

/// Resolves an image's declared source to a concrete revision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceResolver {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: SourceResolverSpec,
    #[serde(default)]
    pub status: SourceResolverStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceResolverSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account: Option<String>,
    #[serde(default)]
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceResolverStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    /// The declared source with its revision resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceConfig>,
}

impl SourceResolver {
    /// Ready once the current generation has resolved to a concrete source.
    pub fn ready(&self) -> bool {
        condition_status(&self.status.conditions, CONDITION_READY).is_true()
            && generation_observed(self.metadata.generation, self.status.observed_generation)
            && self.status.source.is_some()
    }

    pub fn resolved(&self) -> Option<&SourceConfig> {
        self.status.source.as_ref()
    }

    /// Whether the resolved source location differs from what `last_build` used.
    pub fn config_changed(&self, last_build: &Build) -> bool {
        self.resolved()
            .is_some_and(|resolved| resolved.location_differs(&last_build.spec.source))
    }

    /// Revision movement since `last_build`.
    pub fn revision_change(&self, last_build: &Build) -> RevisionChange {
        self.resolved()
            .map(|resolved| RevisionChange::between(&last_build.spec.source, resolved))
            .unwrap_or(RevisionChange::NotApplicable)
    }
}
