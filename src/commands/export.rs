//! # Export Command Implementation
//!
//! This module implements the `export` subcommand: load a configuration and
//! write it back out under another directory. The written layout mirrors the
//! relative-path keys of the loaded tree, so the exported root file can be
//! loaded again on its own.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use gitolite_config::SaveOptions;

/// Re-serialize a configuration into a directory
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Root configuration file.
    #[arg(value_name = "FILE")]
    pub config: PathBuf,

    /// Directory to write the configuration into.
    #[arg(value_name = "OUT_DIR")]
    pub output: PathBuf,

    /// File name for the exported root file (defaults to the source name).
    #[arg(long, value_name = "NAME")]
    pub filename: Option<String>,

    /// Create the output directory and its subdirectories if they do not exist.
    #[arg(long)]
    pub create_dirs: bool,
}

/// Execute the `export` command.
pub fn execute(args: ExportArgs) -> Result<()> {
    let tree = super::load(&args.config)?;

    let options = SaveOptions {
        filename: args.filename,
        create_dirs: args.create_dirs,
    };
    let saved = tree.save(&args.output, &options).map_err(|e| {
        anyhow::anyhow!("Failed to export to {}: {}", args.output.display(), e)
    })?;

    for path in saved.paths() {
        println!("{}", path.display());
    }
    log::info!("Exported {} file(s) to {}", saved.len(), args.output.display());
    Ok(())
}
