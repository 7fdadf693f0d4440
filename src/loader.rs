//! # Loading Configuration Trees
//!
//! Loading is an eager, depth-first descent: the root file is read and its
//! statements are applied in order. An `include` or `subconf` statement
//! creates a child unit, checks the new edge with the composition guard, and
//! immediately loads the child's file before the next statement of the
//! parent is processed.
//!
//! ## Wildcard containers
//!
//! A target whose file name contains `*` or `?` becomes a *container* unit. The pattern is
//! expanded against the filesystem relative to the declaring file's
//! directory, and every matched file is loaded as a child of the container
//! under the same relation the container was declared with.
//!
//! ## Failure
//!
//! Any error aborts the whole load. Nesting is bounded by [`MAX_DEPTH`] so a
//! degenerate tree is reported instead of exhausting the stack.

use std::fs;
use std::path::Path;

use log::{debug, warn};

use crate::error::{Error, Result};
use crate::guard;
use crate::path;
use crate::statement::{Statement, StatementParser};
use crate::unit::{ConfigTree, Relation, UnitId, MAX_DEPTH};

/// Load a configuration tree from its root file.
///
/// The root path is made absolute first, so every relative-path key in the
/// tree is computed against a real directory.
pub fn load_from<P: AsRef<Path>>(file: P) -> Result<ConfigTree> {
    let file = std::path::absolute(file.as_ref())?;
    let mut tree = ConfigTree::new(file.to_string_lossy());
    let root = tree.root();
    Loader::new()?.load_unit(&mut tree, root, 0)?;
    Ok(tree)
}

/// Create an include child of `parent` for `file` and load it
pub fn load_inc(tree: &mut ConfigTree, file: &str, parent: UnitId) -> Result<UnitId> {
    load_child(tree, file, parent, Relation::Include)
}

/// Create a subconf child of `parent` for `file` and load it
pub fn load_subconf(tree: &mut ConfigTree, file: &str, parent: UnitId) -> Result<UnitId> {
    load_child(tree, file, parent, Relation::Subconf)
}

/// On failure the half-loaded child is detached again, so `parent` keeps the
/// children it had before the call
fn load_child(
    tree: &mut ConfigTree,
    file: &str,
    parent: UnitId,
    relation: Relation,
) -> Result<UnitId> {
    let loader = Loader::new()?;
    let child = tree.new_child(file, parent, relation)?;
    if let Err(e) = loader.load_unit(tree, child, 0) {
        tree.remove_child(parent, relation, child);
        return Err(e);
    }
    Ok(child)
}

impl ConfigTree {
    /// Load a tree from its root file; see [`load_from`]
    pub fn load<P: AsRef<Path>>(file: P) -> Result<Self> {
        load_from(file)
    }
}

/// Applies classified statements to units, recursing into nested files
pub struct Loader {
    parser: StatementParser,
}

impl Loader {
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: StatementParser::new()?,
        })
    }

    /// Read the file behind `unit` and apply its statements to it
    pub fn load_unit(&self, tree: &mut ConfigTree, unit: UnitId, depth: usize) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(Error::config_dependency(format!(
                "'{}' is nested more than {} levels deep",
                tree.unit(unit).path(),
                MAX_DEPTH
            )));
        }

        let file = tree.unit(unit).path().to_string();
        debug!("Loading configuration {}", file);

        let content = fs::read_to_string(&file)?;
        let statements = self.parser.parse(&content).map_err(|e| match e {
            Error::Parse { message, hint } => Error::Parse {
                message: format!("{}: {}", file, message),
                hint,
            },
            other => other,
        })?;

        // repositories named by the most recent `repo` statement
        let mut context: Vec<String> = Vec::new();

        for statement in statements {
            match statement {
                Statement::Repo { names } => {
                    let target = tree.unit_mut(unit);
                    for name in &names {
                        target.repo_entry(name)?;
                    }
                    context = names;
                }
                Statement::Permission { perm, refex, users } => {
                    let target = tree.unit_mut(unit);
                    for name in require_context(&context, &file, &perm)? {
                        target
                            .repo_entry(name)?
                            .add_permission(&perm, &refex, users.iter().cloned());
                    }
                }
                Statement::Config { key, value } => {
                    let target = tree.unit_mut(unit);
                    for name in require_context(&context, &file, "config")? {
                        target.repo_entry(name)?.set_git_config(&key, &value);
                    }
                }
                Statement::Group { name, members } => {
                    tree.unit_mut(unit).group_entry(&name)?.add_users(members);
                }
                Statement::Gitweb {
                    repo,
                    owner,
                    description,
                } => {
                    let record = tree.unit_mut(unit).repo_entry(&repo)?;
                    record.set_owner(owner);
                    record.set_description(Some(description));
                }
                Statement::Include { file: target } => {
                    let line = format!("include \"{}\"", target);
                    self.load_include(tree, unit, &target, &line, depth)?;
                }
                Statement::Subconf { name, file: target } => {
                    let line = match &name {
                        Some(name) => format!("subconf {} \"{}\"", name, target),
                        None => format!("subconf \"{}\"", target),
                    };
                    self.load_subconf(tree, unit, name, &target, &line, depth)?;
                }
            }
        }
        Ok(())
    }

    fn load_include(
        &self,
        tree: &mut ConfigTree,
        unit: UnitId,
        declared: &str,
        line: &str,
        depth: usize,
    ) -> Result<()> {
        let file = target_path(tree.unit(unit).path(), declared);

        if path::is_wildcard(&file) {
            let container = tree.new_inc(file.as_str(), unit)?;
            return self.expand_container(tree, container, Relation::Include, depth + 1);
        }

        ensure_file(&file, line)?;
        guard::check_not_ancestor(tree, unit, &file, line)?;
        guard::check_include(tree, unit, &file, line)?;

        let child = tree.new_inc(file.as_str(), unit)?;
        self.load_unit(tree, child, depth + 1)
    }

    fn load_subconf(
        &self,
        tree: &mut ConfigTree,
        unit: UnitId,
        name: Option<String>,
        declared: &str,
        line: &str,
        depth: usize,
    ) -> Result<()> {
        let file = target_path(tree.unit(unit).path(), declared);

        if path::is_wildcard(&file) {
            let container = tree.new_subconf(file.as_str(), unit)?;
            tree.unit_mut(container).set_name(name);
            return self.expand_container(tree, container, Relation::Subconf, depth + 1);
        }

        ensure_file(&file, line)?;
        guard::check_not_ancestor(tree, unit, &file, line)?;
        guard::check_subconf(tree, unit, name.as_deref().unwrap_or(&file), line)?;

        let child = tree.new_subconf(file.as_str(), unit)?;
        tree.unit_mut(child).set_name(name);
        self.load_unit(tree, child, depth + 1)
    }

    /// Populate a container with one loaded unit per file its pattern matches
    fn expand_container(
        &self,
        tree: &mut ConfigTree,
        container: UnitId,
        relation: Relation,
        depth: usize,
    ) -> Result<()> {
        if depth > MAX_DEPTH {
            return Err(Error::config_dependency(format!(
                "'{}' is nested more than {} levels deep",
                tree.unit(container).path(),
                MAX_DEPTH
            )));
        }

        let pattern = tree.unit(container).path().to_string();
        let mut matched = 0usize;

        for entry in glob::glob(&path::glob_pattern(&pattern))? {
            let found = entry?;
            let file = found.to_string_lossy().into_owned();

            if path::is_wildcard(&file) {
                // a matched name that is itself a pattern nests another container
                if file == pattern {
                    continue;
                }
                let nested = tree.new_child(file.as_str(), container, relation)?;
                self.expand_container(tree, nested, relation, depth + 1)?;
                matched += 1;
                continue;
            }
            if !found.is_file() {
                continue;
            }

            let line = format!("{} \"{}\"", relation.keyword(), pattern);
            guard::check_not_ancestor(tree, container, &file, &line)?;

            let child = tree.new_child(file.as_str(), container, relation)?;
            self.load_unit(tree, child, depth + 1)?;
            matched += 1;
        }

        if matched == 0 {
            warn!("Pattern '{}' did not match any configuration file", pattern);
        } else {
            debug!("Pattern '{}' matched {} file(s)", pattern, matched);
        }
        Ok(())
    }
}

/// File a declared target refers to: relative targets live next to the
/// declaring file
fn target_path(owner: &str, declared: &str) -> String {
    if Path::new(declared).is_absolute() {
        return declared.to_string();
    }
    path::base_dir(Path::new(owner))
        .join(declared)
        .to_string_lossy()
        .into_owned()
}

fn ensure_file(file: &str, line: &str) -> Result<()> {
    if Path::new(file).is_file() {
        return Ok(());
    }
    Err(Error::Parse {
        message: format!("'{}' '{}' does not exist", line, file),
        hint: Some(
            "Targets of include/subconf are resolved relative to the declaring file".to_string(),
        ),
    })
}

fn require_context<'a>(
    context: &'a [String],
    file: &str,
    statement: &str,
) -> Result<&'a [String]> {
    if context.is_empty() {
        return Err(Error::Parse {
            message: format!("{}: '{}' rule outside of a repo block", file, statement),
            hint: Some("Start the block with 'repo <name>'".to_string()),
        });
    }
    Ok(context)
}
