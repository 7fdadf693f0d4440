//! # Tree Command Implementation
//!
//! This module implements the `tree` subcommand, which displays how a
//! configuration is composed from its files.
//!
//! ## Functionality
//!
//! - **Composition Visualization**: Every include and subconf is shown under
//!   the unit that declares it, labelled with its relative-path key.
//! - **Containers**: Wildcard containers are marked and list the files their
//!   pattern matched.
//! - **Depth Control**: Supports `--depth` flag to limit tree depth
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use clap::Args;
use ptree::{print_tree, TreeItem};
use std::path::PathBuf;

use gitolite_config::{ConfigTree, Relation, UnitId};

/// Display the include/subconf tree of a configuration
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Root configuration file.
    ///
    /// Can also be set with the `GITOLITE_CONFIG` environment variable.
    #[arg(value_name = "FILE", env = "GITOLITE_CONFIG")]
    pub config: PathBuf,

    /// Maximum depth to display in the tree.
    ///
    /// If not specified, displays the full tree.
    /// Use 0 to show only the root file, 1 to show its direct children, etc.
    #[arg(long, value_name = "NUM")]
    pub depth: Option<usize>,
}

/// Execute the `tree` command.
pub fn execute(args: TreeArgs) -> Result<()> {
    let tree = super::load(&args.config)?;

    let root = tree.root();
    let label = tree.unit(root).path().to_string();
    let node = build_tree_node(&tree, root, label, args.depth.unwrap_or(usize::MAX), 0);
    print_tree(&node).map_err(|e| anyhow::anyhow!("Failed to display tree: {}", e))?;

    Ok(())
}

/// Build a display node for `unit` and, depth permitting, its children
fn build_tree_node(
    tree: &ConfigTree,
    unit: UnitId,
    label: String,
    max_depth: usize,
    current_depth: usize,
) -> TreeNode {
    let config = tree.unit(unit);
    if current_depth >= max_depth {
        return TreeNode {
            label,
            children: vec![],
        };
    }

    let mut children = Vec::new();
    for relation in [Relation::Subconf, Relation::Include] {
        for (key, child) in config.children(relation) {
            let child_unit = tree.unit(*child);
            let mut label = format!("{} {}", relation.keyword(), key);
            if let Some(name) = child_unit.name() {
                label.push_str(&format!(" ({})", name));
            }
            if child_unit.is_container() {
                label.push_str(" [wildcard]");
            }
            children.push(build_tree_node(
                tree,
                *child,
                label,
                max_depth,
                current_depth + 1,
            ));
        }
    }
    TreeNode { label, children }
}

/// Tree node structure for ptree visualization
#[derive(Clone)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(
        &self,
        f: &mut W,
        _style: &ptree::Style,
    ) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> std::borrow::Cow<'_, [Self::Child]> {
        std::borrow::Cow::Borrowed(&self.children)
    }
}
