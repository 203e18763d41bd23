//! Declarative preconditions and their structural validation.
//!
//! Checking a precondition against a live database happens in the runtime
//! crate; this module only describes them.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identifier::TableIdentifier;

/// What to do when a precondition evaluates to false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OnFail {
    /// Stop the whole run.
    #[default]
    Halt,
    /// Skip the changeset and carry on.
    Continue,
    /// Record the changeset as ran without executing it.
    MarkRan,
    /// Record a warning, then skip like `Continue`.
    Warn,
}

/// A single declarative condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Precondition {
    /// The table exists.
    TableExists { table: TableIdentifier },
    /// The column exists.
    ColumnExists {
        table: TableIdentifier,
        column: String,
    },
    /// The table holds exactly `expected_rows` rows.
    RowCount {
        table: TableIdentifier,
        #[serde(default)]
        expected_rows: Option<i64>,
    },
    /// The connection is authenticated as `username`.
    RunningAs { username: String },
    /// The connected database is one of a comma separated list of dialects.
    Dbms { dbms: String },
    /// A scalar query returns `expected_result`.
    SqlCheck {
        sql: String,
        expected_result: String,
    },
    /// Another changeset has been executed.
    ChangesetExecuted {
        id: String,
        author: String,
        path: String,
    },
    /// Every nested condition holds.
    And { conditions: Vec<Precondition> },
    /// At least one nested condition holds.
    Or { conditions: Vec<Precondition> },
    /// No nested condition holds.
    Not { conditions: Vec<Precondition> },
}

impl Precondition {
    /// Name used in messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::TableExists { .. } => "tableExists",
            Self::ColumnExists { .. } => "columnExists",
            Self::RowCount { .. } => "rowCount",
            Self::RunningAs { .. } => "runningAs",
            Self::Dbms { .. } => "dbms",
            Self::SqlCheck { .. } => "sqlCheck",
            Self::ChangesetExecuted { .. } => "changeSetExecuted",
            Self::And { .. } => "and",
            Self::Or { .. } => "or",
            Self::Not { .. } => "not",
        }
    }

    /// Checks that the precondition's own parameters are well formed.
    #[must_use]
    pub fn validate(&self) -> Vec<ValidationError> {
        let name = self.name();
        let mut errors = Vec::new();
        let missing = |field: &str| ValidationError::new(name, format!("{field} is required"));

        match self {
            Self::TableExists { table } => {
                if table.table.trim().is_empty() {
                    errors.push(missing("tableName"));
                }
            }
            Self::ColumnExists { table, column } => {
                if table.table.trim().is_empty() {
                    errors.push(missing("tableName"));
                }
                if column.trim().is_empty() {
                    errors.push(missing("columnName"));
                }
            }
            Self::RowCount {
                table,
                expected_rows,
            } => {
                if table.table.trim().is_empty() {
                    errors.push(missing("tableName"));
                }
                match expected_rows {
                    None => errors.push(missing("expectedRows")),
                    Some(rows) if *rows < 0 => {
                        errors.push(ValidationError::new(name, "expectedRows must not be negative"));
                    }
                    Some(_) => {}
                }
            }
            Self::RunningAs { username } => {
                if username.trim().is_empty() {
                    errors.push(missing("username"));
                }
            }
            Self::Dbms { dbms } => {
                if dbms.trim().is_empty() {
                    errors.push(missing("type"));
                }
            }
            Self::SqlCheck { sql, .. } => {
                if sql.trim().is_empty() {
                    errors.push(missing("sql"));
                }
            }
            Self::ChangesetExecuted { id, author, path } => {
                for (field, value) in [("id", id), ("author", author), ("changeLogFile", path)] {
                    if value.trim().is_empty() {
                        errors.push(missing(field));
                    }
                }
            }
            Self::And { conditions } | Self::Or { conditions } | Self::Not { conditions } => {
                if conditions.is_empty() {
                    errors.push(ValidationError::new(name, "at least one nested condition is required"));
                }
                errors.extend(conditions.iter().flat_map(Self::validate));
            }
        }
        errors
    }
}

/// The preconditions of one changeset, all of which must hold.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preconditions {
    #[serde(default)]
    pub on_fail: OnFail,
    /// Replaces the generated failure text when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_fail_message: Option<String>,
    pub conditions: Vec<Precondition>,
}

impl Preconditions {
    /// Empty precondition set with the given policy.
    #[must_use]
    pub const fn new(on_fail: OnFail) -> Self {
        Self {
            on_fail,
            on_fail_message: None,
            conditions: Vec::new(),
        }
    }

    /// Adds a condition.
    #[must_use]
    pub fn condition(mut self, condition: Precondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Sets the failure message.
    #[must_use]
    pub fn on_fail_message(mut self, message: impl Into<String>) -> Self {
        self.on_fail_message = Some(message.into());
        self
    }

    /// Validates every condition.
    #[must_use]
    pub fn validate(&self) -> Vec<ValidationError> {
        self.conditions.iter().flat_map(Precondition::validate).collect()
    }
}
