//! Group records
//!
//! A group is a named set of members. A member token that starts with
//! [`PREPEND_CHAR`] refers to another group, which is what the group
//! dependency graph is built from.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Marker that distinguishes a group reference from a user name
pub const PREPEND_CHAR: char = '@';

/// A user group declared in a configuration unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    name: String,
    /// Kept sorted and de-duplicated so output is stable
    users: BTreeSet<String>,
}

impl Group {
    /// Create an empty group. A leading `@` on `name` is ignored.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.trim_start_matches(PREPEND_CHAR).to_string(),
            users: BTreeSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_user(&mut self, user: impl Into<String>) {
        self.users.insert(user.into());
    }

    pub fn add_users<I, S>(&mut self, users: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for user in users {
            self.add_user(user);
        }
    }

    pub fn rm_user(&mut self, user: &str) -> bool {
        self.users.remove(user)
    }

    pub fn has_user(&self, user: &str) -> bool {
        self.users.contains(user)
    }

    /// Members in output order
    pub fn users(&self) -> impl Iterator<Item = &str> {
        self.users.iter().map(String::as_str)
    }

    pub fn size(&self) -> usize {
        self.users.len()
    }

    /// Names of the groups this group's members refer to (marker stripped)
    pub fn group_references(&self) -> impl Iterator<Item = &str> {
        self.users
            .iter()
            .filter_map(|u| u.strip_prefix(PREPEND_CHAR))
            .filter(|name| !name.is_empty())
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = format!("{}{}", PREPEND_CHAR, self.name);
        let members: Vec<&str> = self.users().collect();
        write!(f, "{:<20}= {}", name, members.join(" "))
    }
}
