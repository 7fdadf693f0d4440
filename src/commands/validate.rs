//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand, which loads a
//! configuration without changing anything on disk.
//!
//! ## Functionality
//!
//! - **Composition**: Loading runs every statement through the parser and
//!   every include/subconf edge through the cycle guard.
//! - **Group Ordering**: Each unit's groups must be writable in
//!   definition-before-use order.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use gitolite_config::depgraph;
use gitolite_config::ConfigTree;

/// Validate a gitolite configuration
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Root configuration file.
    ///
    /// Can also be set with the `GITOLITE_CONFIG` environment variable.
    #[arg(value_name = "FILE", env = "GITOLITE_CONFIG")]
    pub config: PathBuf,
}

/// Totals gathered over every unit of a tree
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct Summary {
    pub files: usize,
    pub containers: usize,
    pub repos: usize,
    pub groups: usize,
}

/// Check group ordering in every unit and count what the tree holds
pub(crate) fn summarize(tree: &ConfigTree) -> Result<Summary> {
    let mut summary = Summary::default();
    let root = tree.root();

    for id in std::iter::once(root).chain(tree.descendants(root)) {
        let unit = tree.unit(id);
        if unit.is_container() {
            summary.containers += 1;
            continue;
        }
        depgraph::group_order(unit)
            .map_err(|e| anyhow::anyhow!("{}: {}", unit.path(), e))?;
        summary.files += 1;
        summary.repos += unit.repos().len();
        summary.groups += unit.groups().len();
    }
    Ok(summary)
}

/// Execute the `validate` command.
pub fn execute(args: ValidateArgs) -> Result<()> {
    println!("Validating configuration: {}", args.config.display());

    let tree = super::load(&args.config)?;
    let summary = summarize(&tree)
        .map_err(|e| anyhow::anyhow!("Configuration validation failed: {}", e))?;

    println!("Configuration is valid");
    println!("   Files: {}", summary.files);
    println!("   Wildcard containers: {}", summary.containers);
    println!("   Repositories: {}", summary.repos);
    println!("   Groups: {}", summary.groups);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_summarize_counts_units() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("wild")).unwrap();
        fs::write(temp.path().join("wild/a.conf"), "repo a\n  R = @all\n").unwrap();
        fs::write(temp.path().join("wild/b.conf"), "@devs = bob\n").unwrap();
        let root = temp.path().join("gitolite.conf");
        fs::write(&root, "@staff = @devs\ninclude \"wild/*.conf\"\n").unwrap();

        let tree = ConfigTree::load(&root).unwrap();
        let summary = summarize(&tree).unwrap();
        assert_eq!(
            summary,
            Summary {
                files: 3,
                containers: 1,
                repos: 1,
                groups: 2,
            }
        );
    }

    #[test]
    fn test_execute_rejects_group_cycle() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("gitolite.conf");
        fs::write(&root, "@a = @b\n@b = @a\n").unwrap();

        let result = execute(ValidateArgs { config: root });
        let message = result.unwrap_err().to_string();
        assert!(message.contains("Configuration validation failed"), "{}", message);
    }

    #[test]
    fn test_execute_missing_config() {
        let result = execute(ValidateArgs {
            config: PathBuf::from("/nonexistent/gitolite.conf"),
        });
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to load configuration"));
    }
}
