//! # Configuration Units
//!
//! A gitolite configuration is physically split over many files. Each file,
//! and each wildcard pattern that expands to a set of files, is one
//! [`ConfigUnit`]. Units are linked by two relations that are deliberately
//! kept apart:
//!
//! - **include**: textual inclusion into the parent's logical configuration.
//! - **subconf**: a named, independently addressable nested configuration.
//!
//! ## Ownership
//!
//! All units live in one arena, the [`ConfigTree`], and refer to each other by
//! [`UnitId`]. A unit's `parent` is a plain id used for root discovery and
//! cycle checks only; it never governs lifetime. Removing a child from its
//! parent detaches it (its `parent` is cleared) but the unit and its own
//! subtree stay in the arena, reachable through the returned id.
//!
//! ## Identity
//!
//! Children are stored under their *relative-path key* (see
//! [`crate::path::relative_key`]), and every lookup normalizes its argument
//! the same way. Callers may name a child by id, by relative or absolute
//! path, or by the short name declared with `subconf <name> "<file>"`.

use std::path::Path;

use log::debug;

use crate::error::{Error, Result};
use crate::group::{Group, PREPEND_CHAR};
use crate::guard;
use crate::path;
use crate::repo::Repo;

/// Default bound for deep searches and nested loading.
///
/// `1` means "this unit only"; this value reaches any realistic nesting.
pub const MAX_DEPTH: usize = 99;

/// Index of a unit inside its [`ConfigTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(usize);

impl UnitId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// The two composition relations between units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Include,
    Subconf,
}

impl Relation {
    /// Statement keyword for this relation
    pub fn keyword(self) -> &'static str {
        match self {
            Relation::Include => "include",
            Relation::Subconf => "subconf",
        }
    }

    fn other(self) -> Relation {
        match self {
            Relation::Include => Relation::Subconf,
            Relation::Subconf => Relation::Include,
        }
    }
}

/// Anything a caller may use to name a configuration unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitRef<'a> {
    /// A unit of the same tree
    Unit(UnitId),
    /// A relative or absolute file reference, or a declared subconf name
    Path(&'a str),
}

impl From<UnitId> for UnitRef<'_> {
    fn from(id: UnitId) -> Self {
        UnitRef::Unit(id)
    }
}

impl<'a> From<&'a str> for UnitRef<'a> {
    fn from(path: &'a str) -> Self {
        UnitRef::Path(path)
    }
}

impl<'a> From<&'a String> for UnitRef<'a> {
    fn from(path: &'a String) -> Self {
        UnitRef::Path(path.as_str())
    }
}

/// A repository given by record or by name
#[derive(Debug, Clone, Copy)]
pub enum RepoRef<'a> {
    Repo(&'a Repo),
    Name(&'a str),
}

impl<'a> From<&'a Repo> for RepoRef<'a> {
    fn from(repo: &'a Repo) -> Self {
        RepoRef::Repo(repo)
    }
}

impl<'a> From<&'a str> for RepoRef<'a> {
    fn from(name: &'a str) -> Self {
        RepoRef::Name(name)
    }
}

impl<'a> From<&'a String> for RepoRef<'a> {
    fn from(name: &'a String) -> Self {
        RepoRef::Name(name.as_str())
    }
}

/// A group given by record, by name, or by `@name` reference
#[derive(Debug, Clone, Copy)]
pub enum GroupRef<'a> {
    Group(&'a Group),
    Name(&'a str),
}

impl<'a> From<&'a Group> for GroupRef<'a> {
    fn from(group: &'a Group) -> Self {
        GroupRef::Group(group)
    }
}

impl<'a> From<&'a str> for GroupRef<'a> {
    fn from(name: &'a str) -> Self {
        GroupRef::Name(name)
    }
}

impl<'a> From<&'a String> for GroupRef<'a> {
    fn from(name: &'a String) -> Self {
        GroupRef::Name(name.as_str())
    }
}

/// Canonical key of a repository reference
pub fn normalize_repo_name<'a>(repo: impl Into<RepoRef<'a>>) -> String {
    match repo.into() {
        RepoRef::Repo(repo) => repo.name().to_string(),
        RepoRef::Name(name) => name.to_string(),
    }
}

/// Canonical key of a group reference; a leading `@` is dropped
pub fn normalize_group_name<'a>(group: impl Into<GroupRef<'a>>) -> String {
    match group.into() {
        GroupRef::Group(group) => group.name().to_string(),
        GroupRef::Name(name) => name.trim_start_matches(PREPEND_CHAR).to_string(),
    }
}

/// One configuration file, or one wildcard container of files
#[derive(Debug, Clone)]
pub struct ConfigUnit {
    path: String,
    name: Option<String>,
    repos: Vec<Repo>,
    groups: Vec<Group>,
    subconfs: Vec<(String, UnitId)>,
    includes: Vec<(String, UnitId)>,
    parent: Option<UnitId>,
}

impl ConfigUnit {
    fn new(path: String) -> Self {
        Self {
            path,
            name: None,
            repos: Vec::new(),
            groups: Vec::new(),
            subconfs: Vec::new(),
            includes: Vec::new(),
            parent: None,
        }
    }

    /// The file reference this unit was constructed from
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Last component of the path, used as the default output file name
    pub fn file_name(&self) -> String {
        Path::new(&self.path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.clone())
    }

    /// Short name given by `subconf <name> "<file>"`, if any
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// A container's file name is a wildcard pattern; it only holds matched
    /// units
    pub fn is_container(&self) -> bool {
        path::is_wildcard(&self.path)
    }

    pub fn parent(&self) -> Option<UnitId> {
        self.parent
    }

    /// Children of one relation, keyed by relative path, in declaration order
    pub fn children(&self, relation: Relation) -> &[(String, UnitId)] {
        match relation {
            Relation::Include => &self.includes,
            Relation::Subconf => &self.subconfs,
        }
    }

    fn children_mut(&mut self, relation: Relation) -> &mut Vec<(String, UnitId)> {
        match relation {
            Relation::Include => &mut self.includes,
            Relation::Subconf => &mut self.subconfs,
        }
    }

    pub fn includes(&self) -> &[(String, UnitId)] {
        &self.includes
    }

    pub fn subconfs(&self) -> &[(String, UnitId)] {
        &self.subconfs
    }

    fn ensure_content_allowed(&self) -> Result<()> {
        if self.is_container() {
            return Err(Error::ContainerContent {
                path: self.path.clone(),
            });
        }
        Ok(())
    }

    ////// REPOSITORIES //////

    /// Repositories in declaration order
    pub fn repos(&self) -> &[Repo] {
        &self.repos
    }

    /// Add a repository, replacing any record with the same name in place
    pub fn add_repo(&mut self, repo: Repo) -> Result<()> {
        self.ensure_content_allowed()?;
        match self.repos.iter_mut().find(|r| r.name() == repo.name()) {
            Some(existing) => *existing = repo,
            None => self.repos.push(repo),
        }
        Ok(())
    }

    /// The record for `name`, created empty if it does not exist yet
    pub fn repo_entry(&mut self, name: &str) -> Result<&mut Repo> {
        self.ensure_content_allowed()?;
        let index = match self.repos.iter().position(|r| r.name() == name) {
            Some(index) => index,
            None => {
                self.repos.push(Repo::new(name));
                self.repos.len() - 1
            }
        };
        Ok(&mut self.repos[index])
    }

    pub fn has_repo<'a>(&self, repo: impl Into<RepoRef<'a>>) -> bool {
        self.get_repo(repo).is_some()
    }

    pub fn get_repo<'a>(&self, repo: impl Into<RepoRef<'a>>) -> Option<&Repo> {
        let name = normalize_repo_name(repo);
        self.repos.iter().find(|r| r.name() == name)
    }

    pub fn get_repo_mut<'a>(&mut self, repo: impl Into<RepoRef<'a>>) -> Option<&mut Repo> {
        let name = normalize_repo_name(repo);
        self.repos.iter_mut().find(|r| r.name() == name)
    }

    pub fn rm_repo<'a>(&mut self, repo: impl Into<RepoRef<'a>>) -> Option<Repo> {
        let name = normalize_repo_name(repo);
        let index = self.repos.iter().position(|r| r.name() == name)?;
        Some(self.repos.remove(index))
    }

    ////// GROUPS //////

    /// Groups in declaration order
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Add a group, replacing any group with the same name in place
    pub fn add_group(&mut self, group: Group) -> Result<()> {
        self.ensure_content_allowed()?;
        match self.groups.iter_mut().find(|g| g.name() == group.name()) {
            Some(existing) => *existing = group,
            None => self.groups.push(group),
        }
        Ok(())
    }

    /// The group called `name`, created empty if it does not exist yet
    pub fn group_entry(&mut self, name: &str) -> Result<&mut Group> {
        self.ensure_content_allowed()?;
        let name = normalize_group_name(name);
        let index = match self.groups.iter().position(|g| g.name() == name) {
            Some(index) => index,
            None => {
                self.groups.push(Group::new(&name));
                self.groups.len() - 1
            }
        };
        Ok(&mut self.groups[index])
    }

    pub fn has_group<'a>(&self, group: impl Into<GroupRef<'a>>) -> bool {
        self.get_group(group).is_some()
    }

    pub fn get_group<'a>(&self, group: impl Into<GroupRef<'a>>) -> Option<&Group> {
        let name = normalize_group_name(group);
        self.groups.iter().find(|g| g.name() == name)
    }

    pub fn get_group_mut<'a>(&mut self, group: impl Into<GroupRef<'a>>) -> Option<&mut Group> {
        let name = normalize_group_name(group);
        self.groups.iter_mut().find(|g| g.name() == name)
    }

    pub fn rm_group<'a>(&mut self, group: impl Into<GroupRef<'a>>) -> Option<Group> {
        let name = normalize_group_name(group);
        let index = self.groups.iter().position(|g| g.name() == name)?;
        Some(self.groups.remove(index))
    }
}

/// What a lookup is searching for, computed once per call
struct Target {
    id: Option<UnitId>,
    /// Reference resolved against the unit the search started from
    reference: String,
    /// Raw string, matched against declared subconf names
    name: Option<String>,
}

/// Arena that owns every unit of one configuration
#[derive(Debug, Clone)]
pub struct ConfigTree {
    units: Vec<ConfigUnit>,
    root: UnitId,
}

impl ConfigTree {
    /// Create a tree holding a single, empty root unit
    pub fn new(path: impl Into<String>) -> Self {
        let mut tree = Self {
            units: Vec::new(),
            root: UnitId(0),
        };
        tree.root = tree.new_unit(path);
        tree
    }

    pub fn root(&self) -> UnitId {
        self.root
    }

    /// Number of units in the arena, detached ones included
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    pub fn unit(&self, id: UnitId) -> &ConfigUnit {
        &self.units[id.0]
    }

    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    pub fn unit_mut(&mut self, id: UnitId) -> &mut ConfigUnit {
        &mut self.units[id.0]
    }

    /// Create a detached unit; attach it with [`ConfigTree::add_child`]
    pub fn new_unit(&mut self, path: impl Into<String>) -> UnitId {
        let id = UnitId(self.units.len());
        self.units.push(ConfigUnit::new(path.into()));
        id
    }

    /// Ancestors of `id`, nearest first
    pub fn ancestors(&self, id: UnitId) -> Vec<UnitId> {
        let mut chain = Vec::new();
        let mut current = self.units[id.0].parent;
        while let Some(parent) = current {
            // a well-formed tree never revisits a unit
            if chain.len() >= self.units.len() || parent == id {
                break;
            }
            chain.push(parent);
            current = self.units[parent.0].parent;
        }
        chain
    }

    /// Topmost ancestor of `id` (itself when detached)
    pub fn root_of(&self, id: UnitId) -> UnitId {
        self.ancestors(id).last().copied().unwrap_or(id)
    }

    /// Every unit attached below `id`, depth-first, subconfs before includes
    pub fn descendants(&self, id: UnitId) -> Vec<UnitId> {
        let mut found = Vec::new();
        let mut stack: Vec<UnitId> = Vec::new();
        let push_children = |stack: &mut Vec<UnitId>, unit: &ConfigUnit| {
            for (_, child) in unit.includes.iter().rev() {
                stack.push(*child);
            }
            for (_, child) in unit.subconfs.iter().rev() {
                stack.push(*child);
            }
        };
        push_children(&mut stack, &self.units[id.0]);
        while let Some(next) = stack.pop() {
            if found.contains(&next) || found.len() >= self.units.len() {
                continue;
            }
            found.push(next);
            push_children(&mut stack, &self.units[next.0]);
        }
        found
    }

    /// Path string a unit reference stands for
    pub fn normalize_config_name(&self, target: UnitRef<'_>) -> String {
        match target {
            UnitRef::Unit(id) => self.units[id.0].path.clone(),
            UnitRef::Path(path) => path.to_string(),
        }
    }

    /// Relative-path key of `reference` as seen from `unit`
    pub fn relative_key(&self, unit: UnitId, reference: &str) -> String {
        path::relative_key(Path::new(&self.units[unit.0].path), reference)
    }

    /// Reference `unit` would use to describe `reference` relative to its
    /// own directory
    pub fn get_file_path(&self, unit: UnitId, reference: &str) -> String {
        path::file_path(Path::new(&self.units[unit.0].path), reference)
    }

    ////// COMPOSITION //////

    /// Make `parent` the parent of `child`, reached through `relation`.
    ///
    /// The parent pointer and the edge that reaches the child always change
    /// together: `child` leaves its former parent's mappings and is stored
    /// under `relation` in the new parent's. Re-parenting to the current
    /// parent under the current relation is a no-op. Fails with
    /// [`Error::ConfigDependency`] if `parent` is `child` itself or one of its
    /// descendants, leaving the tree unchanged.
    pub fn set_parent(&mut self, child: UnitId, parent: UnitId, relation: Relation) -> Result<()> {
        self.add_child(parent, child, relation)
    }

    /// Point `child` at `parent` after the cycle check, detaching it from its
    /// former parent. Callers insert the matching edge.
    fn reparent(&mut self, child: UnitId, parent: UnitId) -> Result<()> {
        if self.units[child.0].parent == Some(parent) {
            return Ok(());
        }
        guard::check_adoption(self, parent, child)?;

        if let Some(former) = self.units[child.0].parent {
            let unit = &mut self.units[former.0];
            unit.subconfs.retain(|(_, id)| *id != child);
            unit.includes.retain(|(_, id)| *id != child);
        }
        self.units[child.0].parent = Some(parent);
        Ok(())
    }

    /// Adopt `child` as a `relation` child of `parent`.
    ///
    /// The child is stored under its relative-path key; an existing child
    /// under the same key is replaced and detached. Fails with
    /// [`Error::ConfigDependency`] if the edge would create a cycle, in which
    /// case the tree is left unchanged.
    pub fn add_child(&mut self, parent: UnitId, child: UnitId, relation: Relation) -> Result<()> {
        self.reparent(child, parent)?;

        let key = self.relative_key(parent, &self.units[child.0].path);
        let unit = &mut self.units[parent.0];
        unit.children_mut(relation.other())
            .retain(|(_, id)| *id != child);

        let children = unit.children_mut(relation);
        let mut replaced = None;
        match children.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => {
                if entry.1 != child {
                    replaced = Some(entry.1);
                }
                entry.1 = child;
            }
            None => children.push((key, child)),
        }

        if let Some(old) = replaced {
            self.units[old.0].parent = None;
        }
        debug!(
            "Attached {} as {} of {}",
            self.units[child.0].path,
            relation.keyword(),
            self.units[parent.0].path
        );
        Ok(())
    }

    /// Create a unit for `path` and adopt it under `parent`
    pub fn new_child(
        &mut self,
        path: impl Into<String>,
        parent: UnitId,
        relation: Relation,
    ) -> Result<UnitId> {
        let child = self.new_unit(path);
        if let Err(e) = self.add_child(parent, child, relation) {
            // nothing refers to the fresh unit yet
            self.units.pop();
            return Err(e);
        }
        Ok(child)
    }

    /// Whether `target` is a `relation` child of `unit`, searching `depth`
    /// levels (1 = direct children only)
    pub fn has_child<'a>(
        &self,
        unit: UnitId,
        relation: Relation,
        target: impl Into<UnitRef<'a>>,
        depth: usize,
    ) -> bool {
        self.get_child(unit, relation, target, depth).is_some()
    }

    /// Find `target` among the `relation` children of `unit`, searching
    /// `depth` levels through the same relation
    pub fn get_child<'a>(
        &self,
        unit: UnitId,
        relation: Relation,
        target: impl Into<UnitRef<'a>>,
        depth: usize,
    ) -> Option<UnitId> {
        let target = target.into();
        let raw = self.normalize_config_name(target);
        let target = Target {
            id: match target {
                UnitRef::Unit(id) => Some(id),
                UnitRef::Path(_) => None,
            },
            reference: path::resolve(Path::new(&self.units[unit.0].path), &raw),
            name: match target {
                UnitRef::Unit(_) => None,
                UnitRef::Path(_) => Some(raw),
            },
        };
        self.find_child(unit, relation, &target, depth)
    }

    fn find_child(
        &self,
        unit: UnitId,
        relation: Relation,
        target: &Target,
        depth: usize,
    ) -> Option<UnitId> {
        if depth == 0 {
            return None;
        }

        let owner = &self.units[unit.0];
        let key = self.relative_key(unit, &target.reference);
        let children = owner.children(relation);

        let direct = children.iter().find(|(k, id)| {
            Some(*id) == target.id
                || *k == key
                || (target.name.is_some() && self.units[id.0].name == target.name)
        });
        if let Some((_, id)) = direct {
            return Some(*id);
        }

        if depth > 1 {
            for (_, child) in children {
                if let Some(found) = self.find_child(*child, relation, target, depth - 1) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Detach `target` from the `relation` children of `unit`.
    ///
    /// Returns the detached unit. Its own subtree is left as it is.
    pub fn remove_child<'a>(
        &mut self,
        unit: UnitId,
        relation: Relation,
        target: impl Into<UnitRef<'a>>,
    ) -> Option<UnitId> {
        let found = self.get_child(unit, relation, target, 1)?;
        self.units[unit.0]
            .children_mut(relation)
            .retain(|(_, id)| *id != found);
        self.units[found.0].parent = None;
        Some(found)
    }

    ////// INCLUDE SHORTHANDS //////

    pub fn add_inc(&mut self, parent: UnitId, child: UnitId) -> Result<()> {
        self.add_child(parent, child, Relation::Include)
    }

    pub fn new_inc(&mut self, path: impl Into<String>, parent: UnitId) -> Result<UnitId> {
        self.new_child(path, parent, Relation::Include)
    }

    pub fn has_inc<'a>(&self, unit: UnitId, target: impl Into<UnitRef<'a>>, depth: usize) -> bool {
        self.has_child(unit, Relation::Include, target, depth)
    }

    pub fn get_inc<'a>(
        &self,
        unit: UnitId,
        target: impl Into<UnitRef<'a>>,
        depth: usize,
    ) -> Option<UnitId> {
        self.get_child(unit, Relation::Include, target, depth)
    }

    pub fn rm_inc<'a>(&mut self, unit: UnitId, target: impl Into<UnitRef<'a>>) -> Option<UnitId> {
        self.remove_child(unit, Relation::Include, target)
    }

    ////// SUBCONF SHORTHANDS //////

    pub fn add_subconf(&mut self, parent: UnitId, child: UnitId) -> Result<()> {
        self.add_child(parent, child, Relation::Subconf)
    }

    pub fn new_subconf(&mut self, path: impl Into<String>, parent: UnitId) -> Result<UnitId> {
        self.new_child(path, parent, Relation::Subconf)
    }

    pub fn has_subconf<'a>(
        &self,
        unit: UnitId,
        target: impl Into<UnitRef<'a>>,
        depth: usize,
    ) -> bool {
        self.has_child(unit, Relation::Subconf, target, depth)
    }

    pub fn get_subconf<'a>(
        &self,
        unit: UnitId,
        target: impl Into<UnitRef<'a>>,
        depth: usize,
    ) -> Option<UnitId> {
        self.get_child(unit, Relation::Subconf, target, depth)
    }

    pub fn rm_subconf<'a>(
        &mut self,
        unit: UnitId,
        target: impl Into<UnitRef<'a>>,
    ) -> Option<UnitId> {
        self.remove_child(unit, Relation::Subconf, target)
    }
}
