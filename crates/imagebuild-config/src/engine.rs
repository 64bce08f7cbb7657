//! Decision engine configuration.
//!
//! ```kdl
//! decision {
//!     trigger-annotation "image.kpack.io/additionalBuildNeeded"
//! }
//! reference {
//!     default-registry "index.docker.io"
//!     default-tag "latest"
//! }
//! ```

use crate::{ConfigError, ConfigResult};
use imagebuild_core::build::ADDITIONAL_BUILD_NEEDED_ANNOTATION;
use imagebuild_core::reference::{DOCKER_HUB, DefaultReferenceParser, ReferenceParser};
use kdl::{KdlDocument, KdlNode};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings of the build decision engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Build annotation that requests another build when present.
    pub trigger_annotation: String,
    /// Registry assumed for references without a registry host.
    pub default_registry: String,
    /// Tag assumed for references with neither tag nor digest.
    pub default_tag: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            trigger_annotation: ADDITIONAL_BUILD_NEEDED_ANNOTATION.to_string(),
            default_registry: DOCKER_HUB.to_string(),
            default_tag: "latest".to_string(),
        }
    }
}

impl EngineConfig {
    /// Reference parser using the configured defaults.
    pub fn reference_parser(&self) -> DefaultReferenceParser {
        DefaultReferenceParser::with_defaults(&self.default_registry, &self.default_tag)
    }
}

/// Load engine configuration from a KDL file.
pub fn load_engine_config(path: impl AsRef<Path>) -> ConfigResult<EngineConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_engine_config(&content)
}

/// Parse engine configuration from KDL text. Omitted settings keep their defaults.
pub fn parse_engine_config(kdl: &str) -> ConfigResult<EngineConfig> {
    let doc: KdlDocument = kdl.parse()?;
    let mut config = EngineConfig::default();
    let mut seen_decision = false;
    let mut seen_reference = false;

    for node in doc.nodes() {
        match node.name().value() {
            "decision" => {
                if std::mem::replace(&mut seen_decision, true) {
                    return Err(ConfigError::Duplicate("decision".to_string()));
                }
                for child in child_nodes(node) {
                    if child.name().value() == "trigger-annotation" {
                        config.trigger_annotation = required_string(child, "trigger-annotation")?;
                    }
                }
            }
            "reference" => {
                if std::mem::replace(&mut seen_reference, true) {
                    return Err(ConfigError::Duplicate("reference".to_string()));
                }
                for child in child_nodes(node) {
                    match child.name().value() {
                        "default-registry" => {
                            config.default_registry = required_string(child, "default-registry")?;
                        }
                        "default-tag" => {
                            config.default_tag = required_string(child, "default-tag")?;
                        }
                        _ => {}
                    }
                }
            }
            _ => {} // Ignore unknown nodes
        }
    }

    config
        .reference_parser()
        .validate()
        .map_err(|e| ConfigError::InvalidValue {
            field: "reference".to_string(),
            message: e.to_string(),
        })?;

    Ok(config)
}

fn child_nodes(node: &KdlNode) -> impl Iterator<Item = &KdlNode> {
    node.children().into_iter().flat_map(|c| c.nodes())
}

fn required_string(node: &KdlNode, field: &str) -> ConfigResult<String> {
    let value = get_first_string_arg(node).ok_or_else(|| ConfigError::MissingField(field.to_string()))?;
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(value)
}

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}
