//! # Composition Guard
//!
//! Every include/subconf edge between two units is checked here before it is
//! created, so the unit tree can never become cyclic.
//!
//! Two families of checks exist:
//!
//! - **Adoption checks** run whenever a unit is (re)parented. The candidate
//!   child must not be the parent itself, must not appear on the parent's
//!   ancestor chain, and must not already have the parent somewhere below it
//!   through either relation.
//! - **Load checks** run while files are being read, before a declared target
//!   is loaded. They stop a file from (transitively) including itself, and two
//!   configurations from claiming each other as subconfs.
//!
//! All checks are read-only: a failing check leaves the tree untouched.

use std::path::Path;

use crate::error::{Error, Result};
use crate::path;
use crate::unit::{ConfigTree, UnitId, UnitRef, MAX_DEPTH};

/// Verify that `child` may become a child of `parent`
pub fn check_adoption(tree: &ConfigTree, parent: UnitId, child: UnitId) -> Result<()> {
    let describe = |id: UnitId| tree.unit(id).path().to_string();

    if parent == child {
        return Err(Error::config_dependency(format!(
            "'{}' cannot be its own parent",
            describe(child)
        )));
    }

    if tree.ancestors(parent).contains(&child) {
        return Err(Error::config_dependency(format!(
            "'{}' is an ancestor of '{}'",
            describe(child),
            describe(parent)
        )));
    }

    if tree.has_subconf(child, parent, MAX_DEPTH) || tree.has_inc(child, parent, MAX_DEPTH) {
        return Err(Error::config_dependency(format!(
            "'{}' is already nested under '{}'",
            describe(parent),
            describe(child)
        )));
    }

    Ok(())
}

/// Reject loading `file` below `unit` when `unit` or one of its ancestors is
/// that same file
pub fn check_not_ancestor(tree: &ConfigTree, unit: UnitId, file: &str, line: &str) -> Result<()> {
    let target = path::normalize(Path::new(file));
    let mut chain = vec![unit];
    chain.extend(tree.ancestors(unit));

    for id in chain {
        if path::normalize(Path::new(tree.unit(id).path())) == target {
            return Err(Error::config_dependency(format!(
                "'{}' recursive reference: '{}' is already being loaded",
                line, file
            )));
        }
    }
    Ok(())
}

/// Reject an `include` whose target is already included anywhere in the tree
pub fn check_include(tree: &ConfigTree, unit: UnitId, file: &str, line: &str) -> Result<()> {
    let root = tree.root_of(unit);
    if tree.has_inc(root, file, MAX_DEPTH) {
        return Err(Error::config_dependency(format!(
            "'{}' recursive reference!",
            line
        )));
    }
    Ok(())
}

/// Reject a `subconf` when the named configuration already has `unit` as
/// one of its own subconfs
pub fn check_subconf(tree: &ConfigTree, unit: UnitId, lookup: &str, line: &str) -> Result<()> {
    let root = tree.root_of(unit);
    if let Some(existing) = tree.get_subconf(root, lookup, MAX_DEPTH) {
        if tree.has_subconf(existing, UnitRef::Unit(unit), MAX_DEPTH) {
            return Err(Error::config_dependency(format!(
                "'{}' recursive reference!",
                line
            )));
        }
    }
    Ok(())
}
