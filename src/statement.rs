//! # Statement Classification
//!
//! This module turns the raw lines of one configuration file into classified
//! [`Statement`]s. It knows nothing about units or trees; the loader consumes
//! the statements and decides what to build from them.
//!
//! ## Line cleanup
//!
//! Before classification every line is cleaned the way gitolite itself does
//! it:
//!
//! 1.  Comments are removed, including inline ones, unless the `#` sits inside
//!     a double-quoted span.
//! 2.  Every `=` is padded to ` = `.
//! 3.  Runs of whitespace collapse to a single space and the line is trimmed.
//!
//! Lines that are empty after cleanup are skipped.
//!
//! ## Recognized statements
//!
//! In priority order: `repo`, permission rules, `config`, group definitions,
//! gitweb descriptions, `include` and `subconf`. A line that matches none of
//! them is a parse error.

use crate::error::{Error, Result};
use crate::group::PREPEND_CHAR;
use log::trace;
use regex::Regex;

/// One classified configuration statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `repo <name> [<name>...]`: starts a new repository context
    Repo { names: Vec<String> },
    /// `<perm> [refex] = <users...>` for every repo in the current context
    Permission {
        perm: String,
        refex: String,
        users: Vec<String>,
    },
    /// `config <key> = <value>` for every repo in the current context
    Config { key: String, value: String },
    /// `@<name> = <members...>`
    Group { name: String, members: Vec<String> },
    /// `<repo> ["<owner>"] = "<description>"`
    Gitweb {
        repo: String,
        owner: Option<String>,
        description: String,
    },
    /// `include "<file>"`
    Include { file: String },
    /// `subconf [<name>] "<file>"`
    Subconf { name: Option<String>, file: String },
}

/// Compiled patterns for cleaning and classifying configuration lines
#[derive(Debug, Clone)]
pub struct StatementParser {
    comment: Regex,
    whitespace: Regex,
    repo: Regex,
    permission: Regex,
    config: Regex,
    group: Regex,
    gitweb: Regex,
    include: Regex,
    subconf: Regex,
}

impl StatementParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            comment: Regex::new(r#"^((?:".*?"|[^#"])*)#.*"#)?,
            whitespace: Regex::new(r"\s+")?,
            repo: Regex::new(r"^repo (.*)")?,
            permission: Regex::new(r"^(-|C|R|RW\+?(?:C?D?|D?C?)M?) (.* )?= (.+)")?,
            config: Regex::new(r"^config (.+) = ?(.*)")?,
            group: Regex::new(&format!(r"^{}(\S+) = ?(.*)$", PREPEND_CHAR))?,
            gitweb: Regex::new(r#"^(\S+)(?: "(.*?)")? =(?: "(.*)")?$"#)?,
            include: Regex::new(r#"^include\s+(?:"([^"\s]+)"|'([^'\s]+)')"#)?,
            subconf: Regex::new(
                r#"^subconf(?:\s+["']?([^"'\s]+)["']?)?\s+(?:"([^"\s]+)"|'([^'\s]+)')"#,
            )?,
        })
    }

    /// Strip comments and normalize whitespace around `=`
    pub fn clean_line(&self, line: &str) -> String {
        let uncommented = self.comment.replace(line, "$1");
        let padded = uncommented.replace('=', " = ");
        self.whitespace.replace_all(&padded, " ").trim().to_string()
    }

    /// Classify one raw line. Returns `Ok(None)` for blank and comment lines.
    pub fn parse_line(&self, raw: &str) -> Result<Option<Statement>> {
        let line = self.clean_line(raw);
        if line.is_empty() {
            return Ok(None);
        }

        let statement = self.classify(&line)?;
        trace!("Classified '{}' as {:?}", line, statement);
        Ok(Some(statement))
    }

    /// Classify every line of a file's content, in order.
    ///
    /// Errors carry the 1-based line number of the offending line.
    pub fn parse(&self, content: &str) -> Result<Vec<Statement>> {
        let mut statements = Vec::new();
        for (index, raw) in content.lines().enumerate() {
            match self.parse_line(raw) {
                Ok(Some(statement)) => statements.push(statement),
                Ok(None) => {}
                Err(Error::Parse { message, hint }) => {
                    return Err(Error::Parse {
                        message: format!("line {}: {}", index + 1, message),
                        hint,
                    })
                }
                Err(e) => return Err(e),
            }
        }
        Ok(statements)
    }

    fn classify(&self, line: &str) -> Result<Statement> {
        if let Some(caps) = self.repo.captures(line) {
            return Ok(Statement::Repo {
                names: split_words(&caps[1]),
            });
        }

        if let Some(caps) = self.permission.captures(line) {
            return Ok(Statement::Permission {
                perm: caps[1].to_string(),
                refex: caps
                    .get(2)
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_default(),
                users: split_words(&caps[3]),
            });
        }

        if let Some(caps) = self.config.captures(line) {
            return Ok(Statement::Config {
                key: caps[1].to_string(),
                value: caps[2].to_string(),
            });
        }

        if let Some(caps) = self.group.captures(line) {
            return Ok(Statement::Group {
                name: caps[1].to_string(),
                members: split_words(&caps[2]),
            });
        }

        if let Some(caps) = self.gitweb.captures(line) {
            let repo = caps[1].to_string();
            let description = caps.get(3).map(|m| m.as_str().to_string()).ok_or_else(|| {
                Error::Parse {
                    message: format!("Missing Gitweb description for repo: {}", repo),
                    hint: Some(format!("Write it as: {} = \"description\"", repo)),
                }
            })?;
            if repo.len() > 1 && repo.starts_with(PREPEND_CHAR) {
                return Err(Error::parse("Gitweb descriptions cannot be set for groups"));
            }
            return Ok(Statement::Gitweb {
                repo,
                owner: caps.get(2).map(|m| m.as_str().to_string()),
                description,
            });
        }

        if let Some(caps) = self.include.captures(line) {
            let file = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str());
            if let Some(file) = file {
                return Ok(Statement::Include {
                    file: file.to_string(),
                });
            }
        }

        if let Some(caps) = self.subconf.captures(line) {
            let file = caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str());
            if let Some(file) = file {
                return Ok(Statement::Subconf {
                    name: caps.get(1).map(|m| m.as_str().to_string()),
                    file: file.to_string(),
                });
            }
        }

        Err(Error::parse(format!("'{}' cannot be processed", line)))
    }
}

fn split_words(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}
