//! imagebuild CLI tool.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "imagebuild")]
#[command(about = "Decide whether images need new builds", long_about = None)]
struct Cli {
    /// Engine configuration file (KDL)
    #[arg(long, global = true, env = "IMAGEBUILD_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a snapshot bundle and print the decision as JSON
    Decide {
        /// Path to the JSON snapshot bundle ("-" reads stdin)
        #[arg(default_value = "-")]
        input: String,
        /// Print only status and reasons
        #[arg(long)]
        compact: bool,
    },
    /// Validate an engine configuration file
    Validate {
        /// Path to the configuration file
        #[arg(default_value = "imagebuild.kdl")]
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Decide { input, compact } => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::decide::run(&config, &input, compact)?;
        }
        Commands::Validate { path } => {
            commands::validate::run(&path)?;
        }
    }

    Ok(())
}
