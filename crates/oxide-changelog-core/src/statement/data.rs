//! Data manipulation, metadata queries and the raw SQL escape hatch.

use serde::{Deserialize, Serialize};

use crate::identifier::TableIdentifier;
use crate::value::SqlValue;

/// A column paired with a value, for INSERT and UPDATE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnValue {
    pub column: String,
    pub value: SqlValue,
}

impl ColumnValue {
    pub fn new(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// A WHERE-clause predicate. Multiple conditions are joined with AND.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// `column = value`
    Eq { column: String, value: SqlValue },
    /// `column <> value`
    NotEq { column: String, value: SqlValue },
    /// `column IS NULL`
    IsNull { column: String },
}

impl Condition {
    /// `column = value`
    pub fn eq(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::Eq {
            column: column.into(),
            value: value.into(),
        }
    }

    /// `column <> value`
    pub fn not_eq(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::NotEq {
            column: column.into(),
            value: value.into(),
        }
    }

    /// `column IS NULL`
    pub fn is_null(column: impl Into<String>) -> Self {
        Self::IsNull {
            column: column.into(),
        }
    }
}

/// INSERT of a single row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsertStatement {
    pub table: TableIdentifier,
    pub values: Vec<ColumnValue>,
}

impl InsertStatement {
    pub fn new(table: impl Into<TableIdentifier>) -> Self {
        Self {
            table: table.into(),
            values: Vec::new(),
        }
    }

    #[must_use]
    pub fn value(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.values.push(ColumnValue::new(column, value));
        self
    }
}

/// UPDATE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateStatement {
    pub table: TableIdentifier,
    pub set: Vec<ColumnValue>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl UpdateStatement {
    pub fn new(table: impl Into<TableIdentifier>) -> Self {
        Self {
            table: table.into(),
            set: Vec::new(),
            conditions: Vec::new(),
        }
    }

    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.set.push(ColumnValue::new(column, value));
        self
    }

    #[must_use]
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }
}

/// DELETE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteStatement {
    pub table: TableIdentifier,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// What a SELECT returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Projection {
    /// Named columns.
    Columns(Vec<String>),
    /// `COUNT(*)`
    Count,
    /// `MAX(column)`
    Max(String),
}

/// ORDER BY term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    #[serde(default)]
    pub descending: bool,
}

/// Single-table SELECT.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectStatement {
    pub table: TableIdentifier,
    pub projection: Projection,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
}

impl SelectStatement {
    /// SELECT of the given columns.
    pub fn columns<I, S>(table: impl Into<TableIdentifier>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: table.into(),
            projection: Projection::Columns(columns.into_iter().map(Into::into).collect()),
            conditions: Vec::new(),
            order_by: Vec::new(),
        }
    }

    /// SELECT MAX(column).
    pub fn max(table: impl Into<TableIdentifier>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            projection: Projection::Max(column.into()),
            conditions: Vec::new(),
            order_by: Vec::new(),
        }
    }

    /// SELECT COUNT(*).
    pub fn count(table: impl Into<TableIdentifier>) -> Self {
        Self {
            table: table.into(),
            projection: Projection::Count,
            conditions: Vec::new(),
            order_by: Vec::new(),
        }
    }

    #[must_use]
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>, descending: bool) -> Self {
        self.order_by.push(OrderBy {
            column: column.into(),
            descending,
        });
        self
    }
}

/// `SELECT COUNT(*) FROM table`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRowCountStatement {
    pub table: TableIdentifier,
}

/// Catalog query returning 1 when the table exists and 0 otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableExistsStatement {
    pub table: TableIdentifier,
}

/// Catalog query returning 1 when the column exists and 0 otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnExistsStatement {
    pub table: TableIdentifier,
    pub column: String,
}

/// SQL text executed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSqlStatement {
    pub sql: String,
}

impl RawSqlStatement {
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }

    /// The SQL with surrounding whitespace and a trailing `;` removed.
    #[must_use]
    pub fn trimmed(&self) -> &str {
        let sql = self.sql.trim();
        sql.strip_suffix(';').map_or(sql, str::trim_end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_sql_trimmed() {
        assert_eq!(RawSqlStatement::new("  SELECT 1 ;\n").trimmed(), "SELECT 1");
        assert_eq!(RawSqlStatement::new("SELECT 1").trimmed(), "SELECT 1");
    }

    #[test]
    fn test_select_builders() {
        let select = SelectStatement::columns("t", ["a", "b"])
            .filter(Condition::eq("a", 1))
            .order_by("b", true);
        assert_eq!(select.projection, Projection::Columns(vec!["a".into(), "b".into()]));
        assert_eq!(select.conditions.len(), 1);
        assert!(select.order_by[0].descending);
    }
}
