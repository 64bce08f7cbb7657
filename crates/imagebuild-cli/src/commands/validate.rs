//! Configuration validation command.

use anyhow::Result;
use imagebuild_config::load_engine_config;
use std::path::Path;

pub fn run(path: &Path) -> Result<()> {
    match load_engine_config(path) {
        Ok(config) => {
            println!("Configuration is valid");
            println!("  trigger annotation: {}", config.trigger_annotation);
            println!("  default registry:   {}", config.default_registry);
            println!("  default tag:        {}", config.default_tag);
            Ok(())
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            std::process::exit(1);
        }
    }
}
