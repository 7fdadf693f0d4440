//! # Writing Configuration Trees
//!
//! Serialization is the inverse of loading: every unit of a tree is written
//! back as plain gitolite text, laid out so that loading the written root
//! file reproduces the same tree.
//!
//! ## Process
//!
//! 1.  **Target Directory**: The directory handed to [`to_file`] must exist
//!     unless [`SaveOptions::create_dirs`] is set. The same holds for every
//!     subdirectory implied by a child key (`sub/foo.conf`, `wild/*.conf`):
//!     it is created only when `create_dirs` is set, otherwise a missing one
//!     is an [`Error::Path`].
//!
//! 2.  **Leaf Units**: One file per unit. Content is, in order:
//!     - groups, in dependency order (see [`crate::depgraph::group_order`]);
//!     - repositories in declaration order, each followed by its gitweb line;
//!     - one `subconf` declaration per subconf child;
//!     - one `include` declaration per include child.
//!
//! 3.  **Children**: Each child is written next to the parent's file at the
//!     path given by its relative-path key.
//!
//! 4.  **Containers**: No file is written for the container itself. Its
//!     matched children are written into the directory portion of its pattern.

use std::fs;
use std::path::{Component, Path, PathBuf};

use log::debug;

use crate::depgraph;
use crate::error::{Error, Result};
use crate::unit::{ConfigTree, Relation, UnitId, MAX_DEPTH};

/// Width of the keyword column in `include`/`subconf` declarations
const KEYWORD_WIDTH: usize = 11;

/// Options for [`to_file`]
#[derive(Debug, Clone, Default)]
pub struct SaveOptions {
    /// File name for the unit being saved; its own file name when `None`
    pub filename: Option<String>,
    /// Create the target directory, and any subdirectory a child key names,
    /// when it does not exist
    pub create_dirs: bool,
}

/// Files produced by one save call, in write order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavedFiles {
    Single(PathBuf),
    Multiple(Vec<PathBuf>),
}

impl SavedFiles {
    fn from_paths(mut paths: Vec<PathBuf>) -> Self {
        if paths.len() == 1 {
            if let Some(path) = paths.pop() {
                return SavedFiles::Single(path);
            }
        }
        SavedFiles::Multiple(paths)
    }

    pub fn paths(&self) -> Vec<&Path> {
        match self {
            SavedFiles::Single(path) => vec![path.as_path()],
            SavedFiles::Multiple(paths) => paths.iter().map(PathBuf::as_path).collect(),
        }
    }

    /// The first file written; `None` for an empty container
    pub fn primary(&self) -> Option<&Path> {
        self.paths().first().copied()
    }

    pub fn len(&self) -> usize {
        match self {
            SavedFiles::Single(_) => 1,
            SavedFiles::Multiple(paths) => paths.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Write `unit` and everything below it into `dir`
pub fn to_file<P: AsRef<Path>>(
    tree: &ConfigTree,
    unit: UnitId,
    dir: P,
    options: &SaveOptions,
) -> Result<SavedFiles> {
    let dir = dir.as_ref();
    ensure_dir(dir, options.create_dirs)?;

    let filename = options
        .filename
        .clone()
        .unwrap_or_else(|| tree.unit(unit).file_name());

    let mut written = Vec::new();
    write_unit(tree, unit, dir, &filename, 0, options.create_dirs, &mut written)?;
    Ok(SavedFiles::from_paths(written))
}

/// Text of one leaf unit, newline-terminated; empty for an empty unit
pub fn render_unit(tree: &ConfigTree, unit: UnitId) -> Result<String> {
    let config = tree.unit(unit);
    let mut lines = Vec::new();

    for group in depgraph::group_order(config)? {
        lines.push(group.to_string());
    }

    for repo in config.repos() {
        lines.push(repo.to_string());
        if let Some(gitweb) = repo.gitweb_description() {
            lines.push(gitweb);
        }
    }

    for (key, child) in config.subconfs() {
        lines.push(declaration(
            Relation::Subconf,
            tree.unit(*child).name(),
            key,
        ));
    }
    for (key, _) in config.includes() {
        lines.push(declaration(Relation::Include, None, key));
    }

    let mut content = lines.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    Ok(content)
}

fn declaration(relation: Relation, name: Option<&str>, key: &str) -> String {
    match name {
        Some(name) => format!(
            "{:<width$}{} \"{}\"",
            relation.keyword(),
            name,
            key,
            width = KEYWORD_WIDTH
        ),
        None => format!(
            "{:<width$}\"{}\"",
            relation.keyword(),
            key,
            width = KEYWORD_WIDTH
        ),
    }
}

fn write_unit(
    tree: &ConfigTree,
    unit: UnitId,
    dir: &Path,
    filename: &str,
    depth: usize,
    create_dirs: bool,
    written: &mut Vec<PathBuf>,
) -> Result<()> {
    if depth > MAX_DEPTH {
        return Err(Error::config_dependency(format!(
            "'{}' is nested more than {} levels deep",
            tree.unit(unit).path(),
            MAX_DEPTH
        )));
    }

    let config = tree.unit(unit);

    if config.is_container() {
        debug!("Writing container {} into {}", config.path(), dir.display());
        for (key, child) in config.subconfs().iter().chain(config.includes()) {
            write_child(tree, *child, dir, key, depth, create_dirs, written)?;
        }
        return Ok(());
    }

    // render first so a group cycle leaves nothing half-written
    let content = render_unit(tree, unit)?;
    let target = dir.join(filename);
    fs::write(&target, content)?;
    debug!("Wrote {}", target.display());
    written.push(target);

    for (key, child) in config.subconfs().iter().chain(config.includes()) {
        write_child(tree, *child, dir, key, depth, create_dirs, written)?;
    }
    Ok(())
}

/// Write a child at the location its key names, relative to `dir`
fn write_child(
    tree: &ConfigTree,
    child: UnitId,
    dir: &Path,
    key: &str,
    depth: usize,
    create_dirs: bool,
    written: &mut Vec<PathBuf>,
) -> Result<()> {
    let relative = output_relative(key);
    if relative.components().any(|c| c == Component::ParentDir) {
        debug!("Key {} points outside {}", key, dir.display());
    }
    let child_dir = match relative.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => dir.join(parent),
        _ => dir.to_path_buf(),
    };
    ensure_dir(&child_dir, create_dirs)?;

    let filename = relative
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| tree.unit(child).file_name());
    write_unit(
        tree,
        child,
        &child_dir,
        &filename,
        depth + 1,
        create_dirs,
        written,
    )
}

/// A key as a path below the output directory.
///
/// A key that could not be made relative is still absolute; its root is
/// dropped so the file lands inside the output directory. `..` components
/// are kept, so a key like `../shared.conf` is written beside the output
/// directory rather than inside it.
fn output_relative(key: &str) -> PathBuf {
    Path::new(key)
        .components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect()
}

fn ensure_dir(dir: &Path, create: bool) -> Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    if create && !dir.exists() {
        fs::create_dir_all(dir)?;
        return Ok(());
    }
    Err(Error::Path {
        message: format!(
            "Path contains a filename or does not exist: {}",
            dir.display()
        ),
    })
}

impl ConfigTree {
    /// Write the whole tree into `dir`; see [`to_file`]
    pub fn save<P: AsRef<Path>>(&self, dir: P, options: &SaveOptions) -> Result<SavedFiles> {
        to_file(self, self.root(), dir, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::Group;
    use tempfile::TempDir;

    fn group(name: &str, members: &[&str]) -> Group {
        let mut g = Group::new(name);
        g.add_users(members.iter().copied());
        g
    }

    #[test]
    fn test_declaration_padding() {
        assert_eq!(
            declaration(Relation::Include, None, "foo.conf"),
            "include    \"foo.conf\""
        );
        assert_eq!(
            declaration(Relation::Subconf, Some("fe"), "fe.conf"),
            "subconf    fe \"fe.conf\""
        );
    }

    #[test]
    fn test_write_single_unit() {
        let temp = TempDir::new().unwrap();
        let mut tree = ConfigTree::new("inc1.conf");
        let root = tree.root();
        tree.unit_mut(root)
            .add_group(group("groupa", &["bob", "@all"]))
            .unwrap();

        let saved = to_file(&tree, root, temp.path(), &SaveOptions::default()).unwrap();
        let expected = temp.path().join("inc1.conf");
        assert_eq!(saved, SavedFiles::Single(expected.clone()));
        assert_eq!(
            fs::read_to_string(expected).unwrap(),
            "@groupa             = @all bob\n"
        );
    }

    #[test]
    fn test_groups_written_in_dependency_order() {
        let mut tree = ConfigTree::new("gitolite.conf");
        let root = tree.root();
        let unit = tree.unit_mut(root);
        unit.add_group(group("A", &["@B", "x"])).unwrap();
        unit.add_group(group("B", &["y"])).unwrap();

        let content = render_unit(&tree, root).unwrap();
        let b = content.find("@B ").unwrap();
        let a = content.find("@A ").unwrap();
        assert!(b < a);
    }

    #[test]
    fn test_group_cycle_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let mut tree = ConfigTree::new("gitolite.conf");
        let root = tree.root();
        let unit = tree.unit_mut(root);
        unit.add_group(group("A", &["@B"])).unwrap();
        unit.add_group(group("B", &["@A"])).unwrap();

        let result = to_file(&tree, root, temp.path(), &SaveOptions::default());
        assert!(matches!(result, Err(Error::GroupDependency { .. })));
        assert!(!temp.path().join("gitolite.conf").exists());
    }

    #[test]
    fn test_repo_block_with_gitweb() {
        let mut tree = ConfigTree::new("gitolite.conf");
        let root = tree.root();
        let repo = tree.unit_mut(root).repo_entry("foo").unwrap();
        repo.add_permission("RW+", "", ["bob"]);
        repo.set_owner(Some("Mike".to_string()));
        repo.set_description(Some("cool".to_string()));

        let content = render_unit(&tree, root).unwrap();
        assert!(content.starts_with("repo    foo\n  RW+"));
        assert!(content.ends_with("foo \"Mike\" = \"cool\"\n"));
    }

    #[test]
    fn test_missing_directory() {
        let temp = TempDir::new().unwrap();
        let tree = ConfigTree::new("gitolite.conf");
        let missing = temp.path().join("out");

        let result = tree.save(&missing, &SaveOptions::default());
        assert!(matches!(result, Err(Error::Path { .. })));
        assert!(!missing.exists());

        let options = SaveOptions {
            create_dirs: true,
            ..Default::default()
        };
        tree.save(&missing, &options).unwrap();
        assert!(missing.join("gitolite.conf").is_file());
    }

    #[test]
    fn test_target_is_a_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("taken");
        fs::write(&file, "").unwrap();
        let tree = ConfigTree::new("gitolite.conf");
        let options = SaveOptions {
            create_dirs: true,
            ..Default::default()
        };
        assert!(matches!(
            tree.save(&file, &options),
            Err(Error::Path { .. })
        ));
    }

    #[test]
    fn test_filename_override() {
        let temp = TempDir::new().unwrap();
        let tree = ConfigTree::new("gitolite.conf");
        let options = SaveOptions {
            filename: Some("renamed.conf".to_string()),
            ..Default::default()
        };
        let saved = tree.save(temp.path(), &options).unwrap();
        assert_eq!(saved.primary(), Some(temp.path().join("renamed.conf").as_path()));
    }

    #[test]
    fn test_write_tree_layout() {
        let temp = TempDir::new().unwrap();
        let mut tree = ConfigTree::new("/srv/conf/gitolite.conf");
        let root = tree.root();
        let team = tree.new_subconf("/srv/conf/teams/team.conf", root).unwrap();
        tree.unit_mut(team).set_name(Some("team".to_string()));
        let wild = tree.new_inc("/srv/conf/wild/*.conf", root).unwrap();
        let w1 = tree.new_inc("/srv/conf/wild/wild1.conf", wild).unwrap();
        tree.unit_mut(w1).group_entry("w1").unwrap().add_user("bob");
        tree.new_inc("/srv/conf/wild/hiwild.conf", wild).unwrap();

        let options = SaveOptions {
            create_dirs: true,
            ..Default::default()
        };
        let saved = tree.save(temp.path(), &options).unwrap();
        let out = temp.path();
        assert_eq!(
            saved,
            SavedFiles::Multiple(vec![
                out.join("gitolite.conf"),
                out.join("teams/team.conf"),
                out.join("wild/wild1.conf"),
                out.join("wild/hiwild.conf"),
            ])
        );
        assert!(!out.join("wild/*.conf").exists());
        assert_eq!(
            fs::read_to_string(out.join("gitolite.conf")).unwrap(),
            "subconf    team \"teams/team.conf\"\ninclude    \"wild/*.conf\"\n"
        );
        assert_eq!(
            fs::read_to_string(out.join("wild/wild1.conf")).unwrap(),
            "@w1                 = bob\n"
        );
    }

    #[test]
    fn test_output_relative_keeps_parent_components() {
        assert_eq!(output_relative("sub/x.conf"), PathBuf::from("sub/x.conf"));
        assert_eq!(output_relative("/srv/x.conf"), PathBuf::from("srv/x.conf"));
        assert_eq!(
            output_relative("../shared.conf"),
            PathBuf::from("../shared.conf")
        );
    }

    #[test]
    fn test_child_directory_needs_create_dirs() {
        let temp = TempDir::new().unwrap();
        let mut tree = ConfigTree::new("/srv/conf/gitolite.conf");
        let root = tree.root();
        let team = tree.new_inc("/srv/conf/sub/team.conf", root).unwrap();
        tree.unit_mut(team).group_entry("team").unwrap().add_user("bob");

        let result = tree.save(temp.path(), &SaveOptions::default());
        assert!(matches!(result, Err(Error::Path { .. })));
        assert!(!temp.path().join("sub").exists());

        let options = SaveOptions {
            create_dirs: true,
            ..Default::default()
        };
        let saved = tree.save(temp.path(), &options).unwrap();
        assert_eq!(saved.len(), 2);
        assert_eq!(
            fs::read_to_string(temp.path().join("sub/team.conf")).unwrap(),
            "@team               = bob\n"
        );
    }

    #[test]
    fn test_empty_container_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let mut tree = ConfigTree::new("/srv/conf/gitolite.conf");
        let root = tree.root();
        let wild = tree.new_inc("/srv/conf/wild/*.conf", root).unwrap();

        let saved = to_file(&tree, wild, temp.path(), &SaveOptions::default()).unwrap();
        assert!(saved.is_empty());
        assert_eq!(saved.primary(), None);
    }
}
