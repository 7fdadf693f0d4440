//! # Error Handling
//!
//! This module defines the centralized error type for the `gitolite-config`
//! library. It uses the `thiserror` library to build one `Error` enum that
//! covers every failure the composition engine can report.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. The three domain failures are:
//!   - `Parse`: a statement could not be classified, a gitweb statement is
//!     malformed, or an `include`/`subconf` target does not exist.
//!   - `ConfigDependency`: establishing a parent/child edge between units
//!     would make the composition tree cyclic.
//!   - `GroupDependency`: a unit's groups reference each other in a cycle and
//!     cannot be written out in definition-before-use order.
//!
//!   The remaining variants wrap I/O, glob and regex failures from the
//!   filesystem boundary.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Every error aborts the current load or serialize call; nothing is retried
//! or partially recovered inside the library.

use thiserror::Error;

/// Main error type for gitolite-config operations
#[derive(Error, Debug)]
pub enum Error {
    /// A configuration statement could not be processed.
    ///
    /// This error includes the specific parsing issue and optionally a hint
    /// about how to fix it.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    Parse {
        message: String,
        /// Optional hint for how to fix the statement
        hint: Option<String>,
    },

    /// An include or subconf edge would make the configuration tree cyclic.
    #[error("Configuration dependency error: {message}")]
    ConfigDependency { message: String },

    /// The groups of one configuration reference each other in a cycle.
    #[error("Group dependency error: cannot order groups {}", groups.join(", "))]
    GroupDependency {
        /// Groups that are part of (or blocked by) the reference cycle
        groups: Vec<String>,
    },

    /// Repositories and groups cannot be attached to a wildcard container.
    #[error("Wildcard container '{path}' cannot hold repositories or groups")]
    ContainerContent { path: String },

    /// An error occurred with a path-related operation.
    #[error("Path operation error: {message}")]
    Path { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    /// A directory entry could not be read while expanding a glob.
    #[error("Glob expansion error: {0}")]
    GlobIteration(#[from] glob::GlobError),
}

impl Error {
    /// Shorthand for a [`Error::Parse`] without a hint.
    pub fn parse(message: impl Into<String>) -> Self {
        Error::Parse {
            message: message.into(),
            hint: None,
        }
    }

    /// Shorthand for a [`Error::ConfigDependency`].
    pub fn config_dependency(message: impl Into<String>) -> Self {
        Error::ConfigDependency {
            message: message.into(),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
