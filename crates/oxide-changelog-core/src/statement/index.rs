//! Indexes and sequences.

use serde::{Deserialize, Serialize};

use crate::identifier::TableIdentifier;

/// CREATE INDEX.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateIndexStatement {
    /// Index name.
    pub name: String,
    /// Indexed table.
    pub table: TableIdentifier,
    /// Indexed columns or expressions.
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub if_not_exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tablespace: Option<String>,
}

impl CreateIndexStatement {
    /// Creates a non-unique index.
    pub fn new<I, S>(name: impl Into<String>, table: impl Into<TableIdentifier>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
            if_not_exists: false,
            tablespace: None,
        }
    }

    /// Makes the index unique.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// DROP INDEX. The table is needed by dialects whose indexes are scoped to
/// a table and supplies the schema for the others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropIndexStatement {
    pub name: String,
    pub table: TableIdentifier,
}

/// CREATE SEQUENCE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSequenceStatement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_with: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub increment_by: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<i64>,
    #[serde(default)]
    pub cycle: bool,
}

impl CreateSequenceStatement {
    /// Sequence with database defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            start_with: None,
            increment_by: None,
            min_value: None,
            max_value: None,
            cycle: false,
        }
    }
}

/// DROP SEQUENCE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropSequenceStatement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub name: String,
}
