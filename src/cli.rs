//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Gitolite Config - Inspect and rewrite multi-file gitolite configurations
#[derive(Parser, Debug)]
#[command(name = "gitolite-config")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Set log level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a configuration and report whether it composes cleanly
    Validate(commands::validate::ValidateArgs),

    /// Display the include/subconf tree of a configuration
    Tree(commands::tree::TreeArgs),

    /// Write a loaded configuration back out as a file layout
    Export(commands::export::ExportArgs),

    /// Print the repositories and groups of a configuration
    Show(commands::show::ShowArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        init_logging(&self.log_level)?;

        match self.command {
            Commands::Validate(args) => commands::validate::execute(args),
            Commands::Tree(args) => commands::tree::execute(args),
            Commands::Export(args) => commands::export::execute(args),
            Commands::Show(args) => commands::show::execute(args),
        }
    }
}

/// Install `env_logger` at `level`; `RUST_LOG` refines it when set
fn init_logging(level: &str) -> Result<()> {
    let filter: log::LevelFilter = level
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid log level '{}'", level))?;

    env_logger::Builder::new()
        .filter_level(filter)
        .parse_default_env()
        .format_timestamp(None)
        .try_init()
        .ok();
    Ok(())
}
