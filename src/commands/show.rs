//! # Show Command Implementation
//!
//! This module implements the `show` subcommand, which lists what each unit
//! of a configuration declares. Output is a plain listing, or JSON with
//! `--json` for use by scripts.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use gitolite_config::group::Group;
use gitolite_config::repo::Repo;
use gitolite_config::ConfigTree;

/// Print the repositories and groups of a configuration
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Root configuration file.
    ///
    /// Can also be set with the `GITOLITE_CONFIG` environment variable.
    #[arg(value_name = "FILE", env = "GITOLITE_CONFIG")]
    pub config: PathBuf,

    /// Print JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// What one unit declares
#[derive(Debug, Serialize)]
struct UnitReport<'a> {
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    container: bool,
    repos: &'a [Repo],
    groups: &'a [Group],
}

fn collect(tree: &ConfigTree) -> Vec<UnitReport<'_>> {
    let root = tree.root();
    std::iter::once(root)
        .chain(tree.descendants(root))
        .map(|id| {
            let unit = tree.unit(id);
            UnitReport {
                path: unit.path(),
                name: unit.name(),
                container: unit.is_container(),
                repos: unit.repos(),
                groups: unit.groups(),
            }
        })
        .collect()
}

/// Execute the `show` command.
pub fn execute(args: ShowArgs) -> Result<()> {
    let tree = super::load(&args.config)?;
    let reports = collect(&tree);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for report in &reports {
        match report.name {
            Some(name) => println!("{} ({})", report.path, name),
            None => println!("{}", report.path),
        }
        if report.container {
            println!("   wildcard container");
            continue;
        }
        println!("   Repositories: {}", report.repos.len());
        for repo in report.repos {
            println!("      {}", repo.name());
        }
        println!("   Groups: {}", report.groups.len());
        for group in report.groups {
            println!("      @{}", group.name());
        }
    }
    Ok(())
}
