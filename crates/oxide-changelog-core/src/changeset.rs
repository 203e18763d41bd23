//! Changesets and changelogs.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::checksum::{CheckSum, ChecksumVersion};
use crate::error::ValidationError;
use crate::precondition::Preconditions;
use crate::statement::Statement;

/// Accepts any stored checksum when listed in `valid_checksums`.
pub const ANY_CHECKSUM: &str = "ANY";

/// Natural key of a changeset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChangesetKey {
    /// Changeset id, unique per author and path.
    pub id: String,
    /// Author of the changeset.
    pub author: String,
    /// Path of the changelog that declares it.
    pub path: String,
}

impl ChangesetKey {
    pub fn new(id: impl Into<String>, author: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for ChangesetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.path, self.id, self.author)
    }
}

/// An identified, checksummed unit of change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Identifier, unique together with author and path.
    pub id: String,
    /// Who wrote the changeset.
    pub author: String,
    /// Changelog path; filled from the enclosing changelog when empty.
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub statements: Vec<Statement>,
    /// Statements that undo this changeset.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rollback: Vec<Statement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preconditions: Option<Preconditions>,
    /// Execute on every run, recording RERAN after the first.
    #[serde(default)]
    pub run_always: bool,
    /// Re-execute when the checksum changes instead of halting.
    #[serde(default)]
    pub run_on_change: bool,
    /// Stored checksums accepted in place of the current one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub valid_checksums: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Runs only when one of these contexts is active. Empty means always.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<String>,
    /// Dialect short names this changeset targets; `!name` excludes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dbms: Vec<String>,
}

impl ChangeSet {
    /// Creates an empty changeset.
    pub fn new(id: impl Into<String>, author: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            author: author.into(),
            path: path.into(),
            statements: Vec::new(),
            rollback: Vec::new(),
            preconditions: None,
            run_always: false,
            run_on_change: false,
            valid_checksums: Vec::new(),
            comment: None,
            contexts: Vec::new(),
            dbms: Vec::new(),
        }
    }

    /// Appends a statement.
    #[must_use]
    pub fn statement(mut self, statement: impl Into<Statement>) -> Self {
        self.statements.push(statement.into());
        self
    }

    /// Appends a rollback statement.
    #[must_use]
    pub fn rollback(mut self, statement: impl Into<Statement>) -> Self {
        self.rollback.push(statement.into());
        self
    }

    /// Sets the preconditions.
    #[must_use]
    pub fn preconditions(mut self, preconditions: Preconditions) -> Self {
        self.preconditions = Some(preconditions);
        self
    }

    /// Marks the changeset as run-always.
    #[must_use]
    pub const fn run_always(mut self) -> Self {
        self.run_always = true;
        self
    }

    /// Marks the changeset as run-on-change.
    #[must_use]
    pub const fn run_on_change(mut self) -> Self {
        self.run_on_change = true;
        self
    }

    /// Accepts an additional stored checksum, or [`ANY_CHECKSUM`].
    #[must_use]
    pub fn valid_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.valid_checksums.push(checksum.into());
        self
    }

    /// Sets the comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Adds a context.
    #[must_use]
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.contexts.push(context.into());
        self
    }

    /// Adds a dbms filter entry.
    #[must_use]
    pub fn dbms(mut self, dbms: impl Into<String>) -> Self {
        self.dbms.push(dbms.into());
        self
    }

    /// Identity key.
    #[must_use]
    pub fn key(&self) -> ChangesetKey {
        ChangesetKey::new(&self.id, &self.author, &self.path)
    }

    /// Checksum under the current algorithm.
    ///
    /// # Errors
    ///
    /// Returns an error if a statement cannot be encoded.
    pub fn checksum(&self) -> Result<CheckSum, serde_json::Error> {
        self.checksum_for(ChecksumVersion::CURRENT)
    }

    /// Checksum under a specific algorithm version.
    ///
    /// # Errors
    ///
    /// Returns an error if a statement cannot be encoded.
    pub fn checksum_for(&self, version: ChecksumVersion) -> Result<CheckSum, serde_json::Error> {
        CheckSum::compute(version, &self.statements)
    }

    /// True when `stored` is listed in `valid_checksums` or `ANY` is.
    #[must_use]
    pub fn accepts_checksum(&self, stored: &CheckSum) -> bool {
        let stored = stored.to_string();
        self.valid_checksums.iter().any(|valid| {
            let valid = valid.trim();
            valid.eq_ignore_ascii_case(ANY_CHECKSUM) || valid.eq_ignore_ascii_case(&stored)
        })
    }

    /// Summary of the statements, e.g. `createTable tableName=a; sql`.
    #[must_use]
    pub fn description(&self) -> String {
        let description = self
            .statements
            .iter()
            .map(Statement::description)
            .collect::<Vec<_>>()
            .join("; ");
        if description.is_empty() {
            String::from("empty")
        } else {
            description
        }
    }

    /// Whether the changeset runs under the active contexts.
    #[must_use]
    pub fn matches_contexts(&self, active: &[String]) -> bool {
        if self.contexts.is_empty() || active.is_empty() {
            return true;
        }
        self.contexts
            .iter()
            .any(|wanted| active.iter().any(|a| a.trim().eq_ignore_ascii_case(wanted.trim())))
    }

    /// Whether the changeset targets the given dialect.
    #[must_use]
    pub fn matches_dbms(&self, short_name: &str) -> bool {
        let mut included = Vec::new();
        for entry in self.dbms.iter().flat_map(|d| d.split(',')).map(str::trim) {
            if let Some(excluded) = entry.strip_prefix('!') {
                if excluded.trim().eq_ignore_ascii_case(short_name) {
                    return false;
                }
            } else if !entry.is_empty() {
                included.push(entry);
            }
        }
        included.is_empty()
            || included
                .iter()
                .any(|d| d.eq_ignore_ascii_case("all") || d.eq_ignore_ascii_case(short_name))
    }

    /// Structural validation of the changeset and everything it owns.
    #[must_use]
    pub fn validate(&self) -> Vec<ValidationError> {
        let key = self.key();
        let mut errors = Vec::new();
        if self.id.trim().is_empty() {
            errors.push(ValidationError::new(&key, "changeset id is required"));
        }
        if self.author.trim().is_empty() {
            errors.push(ValidationError::new(&key, "changeset author is required"));
        }
        for statement in self.statements.iter().chain(&self.rollback) {
            errors.extend(
                statement
                    .validate()
                    .into_iter()
                    .map(|e| ValidationError::new(&key, e.to_string())),
            );
        }
        if let Some(preconditions) = &self.preconditions {
            errors.extend(
                preconditions
                    .validate()
                    .into_iter()
                    .map(|e| ValidationError::new(&key, e.to_string())),
            );
        }
        for valid in &self.valid_checksums {
            let valid = valid.trim();
            if !valid.eq_ignore_ascii_case(ANY_CHECKSUM) && valid.parse::<CheckSum>().is_err() {
                errors.push(ValidationError::new(
                    &key,
                    format!("valid checksum '{valid}' is not of the form <version>:<hex>"),
                ));
            }
        }
        errors
    }
}

/// An ordered, fully resolved list of changesets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChangeLog {
    /// Path recorded on changesets that do not carry their own.
    #[serde(default)]
    pub path: String,
    pub changesets: Vec<ChangeSet>,
}

impl ChangeLog {
    /// Creates a changelog, filling empty changeset paths with `path`.
    pub fn new(path: impl Into<String>, changesets: Vec<ChangeSet>) -> Self {
        let mut changelog = Self {
            path: path.into(),
            changesets,
        };
        changelog.resolve_paths();
        changelog
    }

    /// Fills empty changeset paths with the changelog path.
    pub fn resolve_paths(&mut self) {
        for changeset in &mut self.changesets {
            if changeset.path.is_empty() {
                changeset.path.clone_from(&self.path);
            }
        }
    }

    /// Validates every changeset and rejects duplicate identity keys.
    #[must_use]
    pub fn validate(&self) -> Vec<ValidationError> {
        validate_changesets(&self.changesets)
    }
}

/// Validates a changeset sequence: each changeset on its own, plus
/// uniqueness of identity keys across the sequence.
#[must_use]
pub fn validate_changesets(changesets: &[ChangeSet]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    for changeset in changesets {
        errors.extend(changeset.validate());
        let key = changeset.key();
        if !seen.insert(key.clone()) {
            errors.push(ValidationError::new(&key, "duplicate changeset identifier"));
        }
    }
    errors
}
