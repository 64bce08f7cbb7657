//! KDL configuration parsing for the imagebuild decision engine.
//!
//! This crate handles parsing of:
//! - The manual rebuild annotation key
//! - Registry and tag defaults for image reference parsing

pub mod engine;
pub mod error;

pub use engine::{EngineConfig, load_engine_config, parse_engine_config};
pub use error::{ConfigError, ConfigResult};
