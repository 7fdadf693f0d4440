//! # Gitolite Configuration Library
//!
//! This library loads a gitolite access-control configuration that is split
//! over many files, keeps it in memory as a tree of configuration units, and
//! writes it back out as a file layout that loads into the same tree. It is
//! used by the `gitolite-config` command-line tool but works on its own.
//!
//! ## Quick Example
//!
//! ```
//! use gitolite_config::group::Group;
//! use gitolite_config::unit::ConfigTree;
//!
//! let mut tree = ConfigTree::new("gitolite.conf");
//! let root = tree.root();
//!
//! let mut staff = Group::new("staff");
//! staff.add_users(["bob", "alice"]);
//! tree.unit_mut(root).add_group(staff).unwrap();
//!
//! let team = tree.new_subconf("teams/backend.conf", root).unwrap();
//! assert!(tree.has_subconf(root, "teams/backend.conf", 1));
//! assert_eq!(tree.unit(team).parent(), Some(root));
//!
//! // a unit cannot be nested below itself
//! assert!(tree.add_inc(team, root).is_err());
//! ```
//!
//! ## Core Concepts
//!
//! - **Units (`unit`)**: One [`unit::ConfigUnit`] per file or wildcard
//!   container, owned by a [`unit::ConfigTree`] arena and linked by the
//!   `include` and `subconf` relations.
//! - **Path identity (`path`)**: Children are keyed by their path relative to
//!   the parent's directory, so the same file is found whether it is named
//!   relatively or absolutely.
//! - **Composition guard (`guard`)**: Every new edge is checked so the tree
//!   never becomes cyclic.
//! - **Loading (`loader`)**: Reads a root file and eagerly loads everything it
//!   includes, expanding wildcard targets into containers.
//! - **Group ordering (`depgraph`)**: Orders a unit's groups so each one is
//!   declared before it is referenced.
//! - **Serialization (`serialize`)**: Writes a tree back to disk.
//!
//! ## Execution Flow
//!
//! 1.  **Load**: [`loader::load_from`] reads the root file and classifies each
//!     line with [`statement::StatementParser`].
//! 2.  **Compose**: `include`/`subconf` statements create child units after
//!     the guard has approved the edge; wildcard targets are globbed.
//! 3.  **Edit**: Callers query and modify units through the tree.
//! 4.  **Write**: [`serialize::to_file`] re-emits every unit, groups first.

pub mod depgraph;
pub mod error;
pub mod group;
pub mod guard;
pub mod loader;
pub mod path;
pub mod repo;
pub mod serialize;
pub mod statement;
pub mod unit;

#[cfg(test)]
mod path_proptest;

pub use error::{Error, Result};
pub use loader::load_from;
pub use serialize::{to_file, SaveOptions, SavedFiles};
pub use unit::{ConfigTree, ConfigUnit, Relation, UnitId, UnitRef, MAX_DEPTH};
