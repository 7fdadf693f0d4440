//! Repository records
//!
//! A [`Repo`] accumulates everything a configuration says about one
//! repository: permission rules, git-config settings and the optional
//! gitweb owner/description. Re-declaring a repository never creates a second
//! record; statements keep accumulating onto the first one.

use serde::Serialize;
use std::fmt;

/// One permission rule: `<perm> [refex] = <users...>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Permission {
    /// Permission string such as `R`, `RW+`, `RWCD` or `-`
    pub perm: String,
    /// Optional ref regex the rule is restricted to (empty for all refs)
    pub refex: String,
    /// Users and `@group` references the rule applies to
    pub users: Vec<String>,
}

/// A repository declared in a configuration unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repo {
    name: String,
    permissions: Vec<Permission>,
    config: Vec<(String, String)>,
    owner: Option<String>,
    description: Option<String>,
}

impl Repo {
    /// Create an empty repository record
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permissions: Vec::new(),
            config: Vec::new(),
            owner: None,
            description: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add users to the rule for `perm` + `refex`.
    ///
    /// Rules with the same permission and refex share one entry; users already
    /// listed are not repeated.
    pub fn add_permission<I, S>(&mut self, perm: &str, refex: &str, users: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let index = match self
            .permissions
            .iter()
            .position(|p| p.perm == perm && p.refex == refex)
        {
            Some(index) => index,
            None => {
                self.permissions.push(Permission {
                    perm: perm.to_string(),
                    refex: refex.to_string(),
                    users: Vec::new(),
                });
                self.permissions.len() - 1
            }
        };

        let rule = &mut self.permissions[index];
        for user in users {
            let user = user.into();
            if !rule.users.contains(&user) {
                rule.users.push(user);
            }
        }
    }

    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    pub fn clear_permissions(&mut self) {
        self.permissions.clear();
    }

    /// Set (or overwrite) a per-repository git config key
    pub fn set_git_config(&mut self, key: &str, value: &str) {
        match self.config.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.config.push((key.to_string(), value.to_string())),
        }
    }

    pub fn git_config(&self, key: &str) -> Option<&str> {
        self.config
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Remove a git config key, returning its old value
    pub fn unset_git_config(&mut self, key: &str) -> Option<String> {
        let index = self.config.iter().position(|(k, _)| k == key)?;
        Some(self.config.remove(index).1)
    }

    pub fn git_configs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.config.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn set_owner(&mut self, owner: Option<String>) {
        self.owner = owner;
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    /// The gitweb statement for this repository, if it has a description.
    ///
    /// Rendered as `name "owner" = "description"`, or `name = "description"`
    /// when no owner is set.
    pub fn gitweb_description(&self) -> Option<String> {
        let description = self.description.as_ref()?;
        let mut line = format!("{} ", self.name);
        if let Some(owner) = &self.owner {
            line.push_str(&format!("\"{}\" ", owner));
        }
        line.push_str(&format!("= \"{}\"", description));
        Some(line)
    }
}

impl fmt::Display for Repo {
    /// Permission/config block, one statement per line, no trailing newline
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "repo    {}", self.name)?;
        // a six-letter permission such as RW+CDM still needs a space before its refex
        for rule in &self.permissions {
            write!(
                f,
                "\n  {:<5} {:<25}= {}",
                rule.perm,
                rule.refex,
                rule.users.join(" ")
            )?;
        }
        for (key, value) in &self.config {
            write!(f, "\n  config {} = {}", key, value)?;
        }
        Ok(())
    }
}
