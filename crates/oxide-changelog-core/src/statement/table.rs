//! Table and column definitions.

use serde::{Deserialize, Serialize};

use super::constraint::{ForeignKeyConstraint, PrimaryKeyConstraint, UniqueConstraint};
use crate::identifier::TableIdentifier;
use crate::types::LogicalType;
use crate::value::SqlValue;

const fn default_true() -> bool {
    true
}

/// How an identity column generates values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationType {
    /// `GENERATED BY DEFAULT`: explicit inserts allowed.
    #[default]
    ByDefault,
    /// `GENERATED ALWAYS`: explicit inserts rejected.
    Always,
}

/// Auto-increment settings of a column.
///
/// A start or increment of `1` is the same as leaving it unset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AutoIncrement {
    /// First generated value.
    #[serde(default)]
    pub start_with: Option<i64>,
    /// Step between generated values.
    #[serde(default)]
    pub increment_by: Option<i64>,
    /// Identity generation mode, for dialects with identity columns.
    #[serde(default)]
    pub generation_type: Option<GenerationType>,
    /// Also generate a value when NULL is inserted explicitly.
    #[serde(default)]
    pub default_on_null: bool,
}

impl AutoIncrement {
    /// Auto-increment with dialect defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the first value.
    #[must_use]
    pub const fn start_with(mut self, start: i64) -> Self {
        self.start_with = Some(start);
        self
    }

    /// Sets the increment.
    #[must_use]
    pub const fn increment_by(mut self, increment: i64) -> Self {
        self.increment_by = Some(increment);
        self
    }

    /// Sets the generation type.
    #[must_use]
    pub const fn generation_type(mut self, generation_type: GenerationType) -> Self {
        self.generation_type = Some(generation_type);
        self
    }

    /// Requests `ON NULL` generation.
    #[must_use]
    pub const fn default_on_null(mut self) -> Self {
        self.default_on_null = true;
        self
    }

    /// Start value when it differs from the default of 1.
    #[must_use]
    pub fn explicit_start(&self) -> Option<i64> {
        self.start_with.filter(|start| *start != 1)
    }

    /// Increment when it differs from the default of 1.
    #[must_use]
    pub fn explicit_increment(&self) -> Option<i64> {
        self.increment_by.filter(|increment| *increment != 1)
    }

    /// True when either start or increment must be spelled out.
    #[must_use]
    pub fn has_explicit_parameters(&self) -> bool {
        self.explicit_start().is_some() || self.explicit_increment().is_some()
    }
}

/// A column in a create-table or add-column statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Logical type.
    #[serde(rename = "type")]
    pub data_type: LogicalType,
    /// Whether NULL is allowed.
    #[serde(default = "default_true")]
    pub nullable: bool,
    /// Part of the table's primary key.
    #[serde(default)]
    pub primary_key: bool,
    /// Single-column unique constraint.
    #[serde(default)]
    pub unique: bool,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<SqlValue>,
    /// Auto-increment settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_increment: Option<AutoIncrement>,
    /// Column comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl ColumnDef {
    /// Creates a nullable column.
    pub fn new(name: impl Into<String>, data_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            primary_key: false,
            unique: false,
            default: None,
            auto_increment: None,
            remarks: None,
        }
    }

    /// Marks the column NOT NULL.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    /// Adds the column to the primary key. Implies NOT NULL.
    #[must_use]
    pub const fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.nullable = false;
        self
    }

    /// Adds a single-column unique constraint.
    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<SqlValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Sets a function call as default value.
    #[must_use]
    pub fn default_function(mut self, function: impl Into<String>) -> Self {
        self.default = Some(SqlValue::Function(function.into()));
        self
    }

    /// Auto-increments with dialect defaults.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = Some(AutoIncrement::new());
        self
    }

    /// Auto-increments with explicit settings.
    #[must_use]
    pub fn auto_increment_with(mut self, settings: AutoIncrement) -> Self {
        self.auto_increment = Some(settings);
        self
    }

    /// Sets the column comment.
    #[must_use]
    pub fn remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = Some(remarks.into());
        self
    }
}

/// CREATE TABLE.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTableStatement {
    /// Table to create.
    pub table: TableIdentifier,
    /// Columns in declaration order.
    #[serde(default)]
    pub columns: Vec<ColumnDef>,
    /// Table-level primary key declaration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<PrimaryKeyConstraint>,
    /// Multi-column unique constraints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unique_constraints: Vec<UniqueConstraint>,
    /// Foreign keys declared with the table.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKeyConstraint>,
    /// Table comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    /// Tablespace, ignored by dialects without tablespaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tablespace: Option<String>,
    /// Skip creation when the table already exists.
    #[serde(default)]
    pub if_not_exists: bool,
}

impl CreateTableStatement {
    /// Creates an empty table definition.
    pub fn new(table: impl Into<TableIdentifier>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            primary_key: None,
            unique_constraints: Vec::new(),
            foreign_keys: Vec::new(),
            remarks: None,
            tablespace: None,
            if_not_exists: false,
        }
    }

    /// The effective primary key: the table-level declaration merged with
    /// every column flagged as primary key, in declaration order.
    #[must_use]
    pub fn effective_primary_key(&self) -> Option<PrimaryKeyConstraint> {
        let from_columns = PrimaryKeyConstraint::new(
            self.columns
                .iter()
                .filter(|c| c.primary_key)
                .map(|c| c.name.clone()),
        );
        let merged = match &self.primary_key {
            Some(declared) => declared.clone().merge(from_columns),
            None => from_columns,
        };
        (!merged.columns.is_empty()).then_some(merged)
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Fluent construction of a [`CreateTableStatement`].
#[derive(Debug, Clone)]
pub struct CreateTableBuilder {
    statement: CreateTableStatement,
}

impl CreateTableBuilder {
    /// Starts a table definition.
    pub fn new(table: impl Into<TableIdentifier>) -> Self {
        Self {
            statement: CreateTableStatement::new(table),
        }
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.statement.columns.push(column);
        self
    }

    /// Declares primary key columns. Repeated calls are merged.
    #[must_use]
    pub fn primary_key<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let declared = PrimaryKeyConstraint::new(columns);
        self.statement.primary_key = Some(match self.statement.primary_key.take() {
            Some(existing) => existing.merge(declared),
            None => declared,
        });
        self
    }

    /// Declares a named primary key. Repeated calls are merged.
    #[must_use]
    pub fn named_primary_key<I, S>(mut self, name: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let declared = PrimaryKeyConstraint::new(columns).named(name);
        self.statement.primary_key = Some(match self.statement.primary_key.take() {
            Some(existing) => existing.merge(declared),
            None => declared,
        });
        self
    }

    /// Adds a unique constraint.
    #[must_use]
    pub fn unique(mut self, constraint: UniqueConstraint) -> Self {
        self.statement.unique_constraints.push(constraint);
        self
    }

    /// Adds a foreign key.
    #[must_use]
    pub fn foreign_key(mut self, constraint: ForeignKeyConstraint) -> Self {
        self.statement.foreign_keys.push(constraint);
        self
    }

    /// Sets the table comment.
    #[must_use]
    pub fn remarks(mut self, remarks: impl Into<String>) -> Self {
        self.statement.remarks = Some(remarks.into());
        self
    }

    /// Sets the tablespace.
    #[must_use]
    pub fn tablespace(mut self, tablespace: impl Into<String>) -> Self {
        self.statement.tablespace = Some(tablespace.into());
        self
    }

    /// Skips creation when the table already exists.
    #[must_use]
    pub const fn if_not_exists(mut self, if_not_exists: bool) -> Self {
        self.statement.if_not_exists = if_not_exists;
        self
    }

    /// Finishes the definition.
    #[must_use]
    pub fn build(self) -> CreateTableStatement {
        self.statement
    }
}

/// DROP TABLE.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropTableStatement {
    /// Table to drop.
    pub table: TableIdentifier,
    /// Also drop dependent constraints.
    #[serde(default)]
    pub cascade_constraints: bool,
    /// Do nothing when the table is absent.
    #[serde(default)]
    pub if_exists: bool,
}

impl DropTableStatement {
    /// DROP TABLE without options.
    pub fn new(table: impl Into<TableIdentifier>) -> Self {
        Self {
            table: table.into(),
            cascade_constraints: false,
            if_exists: false,
        }
    }
}

/// Rename a table within its schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameTableStatement {
    /// Table to rename.
    pub table: TableIdentifier,
    /// New unqualified name.
    pub new_name: String,
}
