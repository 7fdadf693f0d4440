//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = ConfigFixture::new().with_file("gitolite.conf", "@staff = bob\n");
//!     let tree = ConfigTree::load(fixture.root()).unwrap();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    pub use super::ConfigFixture;
}

/// Configuration snippets shared by several tests.
#[allow(dead_code)]
pub mod configs {
    /// Root of the classic layout: one plain include and one wildcard include.
    pub const INCS_ROOT: &str = r#"
@admins = alice
repo gitolite-admin
    RW+ = @admins
include "foo.conf"
include "wild/*.conf"
"#;

    pub const FOO: &str = "@foo = bob carol\nrepo foo\n    RW = @foo\n";

    pub const WILD1: &str = "@wild1 = dave\n";

    pub const HIWILD: &str = "@hiwild = erin\nrepo hiwild\n    R = @all\n";
}

/// A temporary directory holding a configuration tree.
pub struct ConfigFixture {
    pub temp: assert_fs::TempDir,
    root: Option<PathBuf>,
}

#[allow(dead_code)]
impl ConfigFixture {
    pub fn new() -> Self {
        Self {
            temp: assert_fs::TempDir::new().expect("Failed to create temp directory"),
            root: None,
        }
    }

    /// Write `content` to `name`; the first file written is the root.
    pub fn with_file(mut self, name: &str, content: &str) -> Self {
        let child = self.temp.child(name);
        child.write_str(content).expect("Failed to write fixture file");
        if self.root.is_none() {
            self.root = Some(child.path().to_path_buf());
        }
        self
    }

    /// The classic `incs.conf` layout with a plain and a wildcard include.
    pub fn with_incs(self) -> Self {
        self.with_file("incs.conf", configs::INCS_ROOT)
            .with_file("foo.conf", configs::FOO)
            .with_file("wild/wild1.conf", configs::WILD1)
            .with_file("wild/hiwild.conf", configs::HIWILD)
    }

    pub fn root(&self) -> &Path {
        self.root.as_deref().expect("Fixture has no files")
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// A fresh, empty directory below the fixture
    pub fn out_dir(&self, name: &str) -> PathBuf {
        let dir = self.temp.child(name);
        dir.create_dir_all().expect("Failed to create output directory");
        dir.path().to_path_buf()
    }
}

impl Default for ConfigFixture {
    fn default() -> Self {
        Self::new()
    }
}
