//! Why a build is needed.

use derive_more::Display;
use imagebuild_core::{BuildpackInfo, RevisionChange};
use serde::{Deserialize, Serialize};

/// Category of a build reason, as recorded on the resulting build.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReasonKind {
    #[display("CONFIG")]
    Config,
    #[display("COMMIT")]
    Commit,
    #[display("BUILDPACK")]
    Buildpack,
    #[display("STACK")]
    Stack,
}

/// Which check produced a reason.
///
/// Finer grained than [`ReasonKind`]: a manual rebuild request is reported as
/// a buildpack reason but logged as its own trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    #[display("tag")]
    Tag,
    #[display("config")]
    Config,
    #[display("commit")]
    Commit,
    #[display("buildpack")]
    Buildpack,
    #[display("stack")]
    Stack,
    #[display("annotation")]
    Annotation,
}

impl Trigger {
    pub fn kind(self) -> ReasonKind {
        match self {
            Trigger::Tag | Trigger::Config => ReasonKind::Config,
            Trigger::Commit => ReasonKind::Commit,
            Trigger::Buildpack | Trigger::Annotation => ReasonKind::Buildpack,
            Trigger::Stack => ReasonKind::Stack,
        }
    }
}

/// Run image identifiers of the last build and of the builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackChange {
    pub last_build_run_image: String,
    pub builder_run_image: String,
}

impl StackChange {
    pub fn has_changed(&self) -> bool {
        self.last_build_run_image != self.builder_run_image
    }
}

/// Details attached to a reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ReasonPayload {
    Empty,
    Revision(RevisionChange),
    Buildpacks(Vec<BuildpackInfo>),
    Stack(StackChange),
}

/// A single reason emitted by one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reason {
    pub trigger: Trigger,
    pub payload: ReasonPayload,
}

impl Reason {
    pub fn new(trigger: Trigger, payload: ReasonPayload) -> Self {
        Self { trigger, payload }
    }

    pub fn kind(&self) -> ReasonKind {
        self.trigger.kind()
    }
}
