//! CLI command implementations.

pub mod decide;
pub mod validate;

use anyhow::{Context, Result};
use imagebuild_config::{EngineConfig, load_engine_config};
use std::path::Path;
use tracing::debug;

/// Load the engine configuration, falling back to defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading engine configuration");
            load_engine_config(path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))
        }
        None => Ok(EngineConfig::default()),
    }
}
