//! Canonical, dialect-neutral statements.
//!
//! A [`Statement`] is pure data: it names tables through
//! [`TableIdentifier`], columns through [`LogicalType`], and leaves every
//! piece of SQL syntax to the dialect that renders it.
//!
//! [`TableIdentifier`]: crate::identifier::TableIdentifier
//! [`LogicalType`]: crate::types::LogicalType

mod column;
mod constraint;
mod data;
mod index;
mod table;

use serde::{Deserialize, Serialize};

pub use column::{
    AddColumnStatement, DropColumnStatement, ModifyDataTypeStatement, RenameColumnStatement,
    SetNullableStatement,
};
pub use constraint::{
    AddForeignKeyStatement, DropForeignKeyStatement, ForeignKeyAction, ForeignKeyConstraint,
    PrimaryKeyConstraint, UniqueConstraint,
};
pub use data::{
    ColumnExistsStatement, ColumnValue, Condition, DeleteStatement, InsertStatement, OrderBy,
    Projection, RawSqlStatement, SelectStatement, TableExistsStatement, TableRowCountStatement,
    UpdateStatement,
};
pub use index::{
    CreateIndexStatement, CreateSequenceStatement, DropIndexStatement, DropSequenceStatement,
};
pub use table::{
    AutoIncrement, ColumnDef, CreateTableBuilder, CreateTableStatement, DropTableStatement,
    GenerationType, RenameTableStatement,
};

use crate::error::ValidationError;
use crate::identifier::TableIdentifier;

/// One primitive database operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    CreateTable(CreateTableStatement),
    DropTable(DropTableStatement),
    RenameTable(RenameTableStatement),
    AddColumn(AddColumnStatement),
    DropColumn(DropColumnStatement),
    RenameColumn(RenameColumnStatement),
    ModifyDataType(ModifyDataTypeStatement),
    SetNullable(SetNullableStatement),
    CreateIndex(CreateIndexStatement),
    DropIndex(DropIndexStatement),
    AddForeignKey(AddForeignKeyStatement),
    DropForeignKey(DropForeignKeyStatement),
    CreateSequence(CreateSequenceStatement),
    DropSequence(DropSequenceStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    Select(SelectStatement),
    TableRowCount(TableRowCountStatement),
    TableExists(TableExistsStatement),
    ColumnExists(ColumnExistsStatement),
    RawSql(RawSqlStatement),
}

impl Statement {
    /// Raw SQL shortcut.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self::RawSql(RawSqlStatement::new(sql))
    }

    /// Operation name, as used in tracking record descriptions.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::CreateTable(_) => "createTable",
            Self::DropTable(_) => "dropTable",
            Self::RenameTable(_) => "renameTable",
            Self::AddColumn(_) => "addColumn",
            Self::DropColumn(_) => "dropColumn",
            Self::RenameColumn(_) => "renameColumn",
            Self::ModifyDataType(_) => "modifyDataType",
            Self::SetNullable(s) => {
                if s.nullable {
                    "dropNotNullConstraint"
                } else {
                    "addNotNullConstraint"
                }
            }
            Self::CreateIndex(_) => "createIndex",
            Self::DropIndex(_) => "dropIndex",
            Self::AddForeignKey(_) => "addForeignKeyConstraint",
            Self::DropForeignKey(_) => "dropForeignKeyConstraint",
            Self::CreateSequence(_) => "createSequence",
            Self::DropSequence(_) => "dropSequence",
            Self::Insert(_) => "insert",
            Self::Update(_) => "update",
            Self::Delete(_) => "delete",
            Self::Select(_) => "select",
            Self::TableRowCount(_) => "tableRowCount",
            Self::TableExists(_) => "tableExists",
            Self::ColumnExists(_) => "columnExists",
            Self::RawSql(_) => "sql",
        }
    }

    /// The table this statement is scoped to, if any.
    #[must_use]
    pub const fn table(&self) -> Option<&TableIdentifier> {
        match self {
            Self::CreateTable(s) => Some(&s.table),
            Self::DropTable(s) => Some(&s.table),
            Self::RenameTable(s) => Some(&s.table),
            Self::AddColumn(s) => Some(&s.table),
            Self::DropColumn(s) => Some(&s.table),
            Self::RenameColumn(s) => Some(&s.table),
            Self::ModifyDataType(s) => Some(&s.table),
            Self::SetNullable(s) => Some(&s.table),
            Self::CreateIndex(s) => Some(&s.table),
            Self::DropIndex(s) => Some(&s.table),
            Self::AddForeignKey(s) => Some(&s.table),
            Self::DropForeignKey(s) => Some(&s.table),
            Self::Insert(s) => Some(&s.table),
            Self::Update(s) => Some(&s.table),
            Self::Delete(s) => Some(&s.table),
            Self::Select(s) => Some(&s.table),
            Self::TableRowCount(s) => Some(&s.table),
            Self::TableExists(s) => Some(&s.table),
            Self::ColumnExists(s) => Some(&s.table),
            Self::CreateSequence(_) | Self::DropSequence(_) | Self::RawSql(_) => None,
        }
    }

    /// Short human description, e.g. `createTable tableName=users`.
    #[must_use]
    pub fn description(&self) -> String {
        let kind = self.kind_name();
        match self {
            Self::CreateSequence(s) => format!("{kind} sequenceName={}", s.name),
            Self::DropSequence(s) => format!("{kind} sequenceName={}", s.name),
            Self::CreateIndex(s) => format!("{kind} indexName={}, tableName={}", s.name, s.table.table),
            Self::DropIndex(s) => format!("{kind} indexName={}, tableName={}", s.name, s.table.table),
            Self::AddColumn(s) => format!("{kind} tableName={}", s.table.table),
            Self::RawSql(_) => kind.to_string(),
            other => other
                .table()
                .map_or_else(|| kind.to_string(), |t| format!("{kind} tableName={}", t.table)),
        }
    }

    /// True for statements that only read.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        matches!(
            self,
            Self::Select(_) | Self::TableRowCount(_) | Self::TableExists(_) | Self::ColumnExists(_)
        )
    }

    /// Structural completeness check; no database access.
    #[must_use]
    pub fn validate(&self) -> Vec<ValidationError> {
        let subject = self.kind_name();
        let mut errors = Vec::new();
        let mut require = |ok: bool, message: &str| {
            if !ok {
                errors.push(ValidationError::new(subject, message));
            }
        };

        if let Some(table) = self.table() {
            require(!table.table.trim().is_empty(), "table name is required");
        }

        match self {
            Self::CreateTable(s) => {
                require(
                    s.columns.iter().all(|c| !c.name.trim().is_empty()),
                    "every column needs a name",
                );
                if let Some(pk) = &s.primary_key {
                    require(
                        pk.columns.iter().all(|c| s.column(c).is_some()),
                        "primary key references an undeclared column",
                    );
                }
            }
            Self::RenameTable(s) => require(!s.new_name.trim().is_empty(), "new table name is required"),
            Self::AddColumn(s) => require(!s.column.name.trim().is_empty(), "column name is required"),
            Self::DropColumn(s) => require(!s.column.trim().is_empty(), "column name is required"),
            Self::RenameColumn(s) => require(
                !s.old_name.trim().is_empty() && !s.new_name.trim().is_empty(),
                "old and new column names are required",
            ),
            Self::ModifyDataType(s) => require(!s.column.trim().is_empty(), "column name is required"),
            Self::SetNullable(s) => require(!s.column.trim().is_empty(), "column name is required"),
            Self::CreateIndex(s) => {
                require(!s.name.trim().is_empty(), "index name is required");
                require(!s.columns.is_empty(), "at least one indexed column is required");
            }
            Self::DropIndex(s) => require(!s.name.trim().is_empty(), "index name is required"),
            Self::AddForeignKey(s) => {
                require(s.constraint.name.is_some(), "constraint name is required");
                require(!s.constraint.columns.is_empty(), "at least one column is required");
                require(
                    s.constraint.columns.len() == s.constraint.referenced_columns.len(),
                    "column count must match referenced column count",
                );
            }
            Self::DropForeignKey(s) => require(!s.name.trim().is_empty(), "constraint name is required"),
            Self::CreateSequence(s) => require(!s.name.trim().is_empty(), "sequence name is required"),
            Self::DropSequence(s) => require(!s.name.trim().is_empty(), "sequence name is required"),
            Self::Insert(s) => require(!s.values.is_empty(), "at least one column value is required"),
            Self::Update(s) => require(!s.set.is_empty(), "at least one column value is required"),
            Self::ColumnExists(s) => require(!s.column.trim().is_empty(), "column name is required"),
            Self::RawSql(s) => require(!s.sql.trim().is_empty(), "sql is required"),
            Self::DropTable(_)
            | Self::Delete(_)
            | Self::Select(_)
            | Self::TableRowCount(_)
            | Self::TableExists(_) => {}
        }
        errors
    }
}

macro_rules! impl_from_statement {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Statement {
                fn from(statement: $ty) -> Self {
                    Self::$variant(statement)
                }
            }
        )*
    };
}

impl_from_statement!(
    CreateTable(CreateTableStatement),
    DropTable(DropTableStatement),
    RenameTable(RenameTableStatement),
    AddColumn(AddColumnStatement),
    DropColumn(DropColumnStatement),
    RenameColumn(RenameColumnStatement),
    ModifyDataType(ModifyDataTypeStatement),
    SetNullable(SetNullableStatement),
    CreateIndex(CreateIndexStatement),
    DropIndex(DropIndexStatement),
    AddForeignKey(AddForeignKeyStatement),
    DropForeignKey(DropForeignKeyStatement),
    CreateSequence(CreateSequenceStatement),
    DropSequence(DropSequenceStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    Select(SelectStatement),
    TableRowCount(TableRowCountStatement),
    TableExists(TableExistsStatement),
    ColumnExists(ColumnExistsStatement),
    RawSql(RawSqlStatement),
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LogicalType;

    #[test]
    fn test_description() {
        let create: Statement = CreateTableBuilder::new("users").build().into();
        assert_eq!(create.description(), "createTable tableName=users");

        let raw = Statement::raw("DELETE FROM x");
        assert_eq!(raw.description(), "sql");

        let index: Statement = CreateIndexStatement::new("idx_email", "users", ["email"]).into();
        assert_eq!(index.description(), "createIndex indexName=idx_email, tableName=users");
    }

    #[test]
    fn test_create_table_may_have_zero_columns() {
        let create: Statement = CreateTableBuilder::new("empty").build().into();
        assert!(create.validate().is_empty());
    }

    #[test]
    fn test_validate_missing_names() {
        let create: Statement = CreateTableBuilder::new("")
            .column(ColumnDef::new("", LogicalType::Integer))
            .build()
            .into();
        let errors = create.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.subject == "createTable"));
    }

    #[test]
    fn test_validate_primary_key_columns_declared() {
        let create: Statement = CreateTableBuilder::new("t")
            .column(ColumnDef::new("a", LogicalType::Integer))
            .primary_key(["b"])
            .build()
            .into();
        assert_eq!(create.validate().len(), 1);
    }

    #[test]
    fn test_read_only() {
        let count: Statement = TableRowCountStatement {
            table: "t".into(),
        }
        .into();
        assert!(count.is_read_only());
        assert!(!Statement::raw("SELECT 1").is_read_only());
    }

    #[test]
    fn test_serde_tagging() {
        let statement = Statement::raw("SELECT 1");
        let json = serde_json::to_string(&statement).unwrap();
        assert_eq!(json, r#"{"kind":"raw_sql","sql":"SELECT 1"}"#);
    }
}
