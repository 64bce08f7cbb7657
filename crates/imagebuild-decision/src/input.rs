//! Snapshot bundle consumed by the command line tool.

use imagebuild_core::{AnyBuilder, Build, Image, SourceResolver};
use serde::{Deserialize, Serialize};

/// Everything one decision looks at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionInput {
    pub image: Image,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_build: Option<Build>,
    pub source_resolver: SourceResolver,
    pub builder: AnyBuilder,
}
