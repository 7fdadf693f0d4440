//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `gitolite-config` command-line tool, one file per subcommand.
//!
//! ## Structure
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args`, calls into the
//!   `gitolite_config` library and prints the result.

pub mod export;
pub mod show;
pub mod tree;
pub mod validate;

use anyhow::Result;
use std::path::Path;

use gitolite_config::ConfigTree;

/// Load the configuration rooted at `path`, with the file named in the error
pub(crate) fn load(path: &Path) -> Result<ConfigTree> {
    ConfigTree::load(path).map_err(|e| {
        anyhow::anyhow!("Failed to load configuration from {}: {}", path.display(), e)
    })
}
