//! # Gitolite Configuration CLI
//!
//! This is the binary entry point for the `gitolite-config` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Installing the logger at the requested level.
//! - Executing the selected command and turning library errors into
//!   user-facing output.
//!
//! All configuration handling lives in the `gitolite_config` library; the
//! binary is a thin wrapper around it.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.execute()
}
