//! SQLite.

use super::{column_definition_sql, Dialect, QuotingStrategy};
use crate::error::DialectError;
use crate::identifier::{ObjectKind, TableIdentifier};
use crate::statement::{
    ColumnDef, ColumnExistsStatement, CreateTableStatement, ModifyDataTypeStatement,
    PrimaryKeyConstraint, SetNullableStatement, TableExistsStatement,
};
use crate::types::LogicalType;

/// SQLite dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect {
    quoting: QuotingStrategy,
}

impl SqliteDialect {
    /// Creates the dialect with legacy quoting.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            quoting: QuotingStrategy::Legacy,
        }
    }

    /// Overrides the quoting strategy.
    #[must_use]
    pub const fn with_quoting(mut self, quoting: QuotingStrategy) -> Self {
        self.quoting = quoting;
        self
    }

    fn schema_prefix(&self, table: &TableIdentifier) -> String {
        table
            .schema_name()
            .map(|s| format!("{}.", self.quote_identifier(s, ObjectKind::Schema)))
            .unwrap_or_default()
    }
}

/// True when the key is exactly one auto-increment column.
fn is_rowid_alias(statement: &CreateTableStatement, primary_key: &PrimaryKeyConstraint) -> bool {
    match primary_key.columns.as_slice() {
        [only] => statement
            .column(only)
            .is_some_and(|c| c.auto_increment.is_some()),
        _ => false,
    }
}

impl Dialect for SqliteDialect {
    fn short_name(&self) -> &'static str {
        "sqlite"
    }

    fn product_name(&self) -> &'static str {
        "SQLite"
    }

    fn default_driver(&self, url: &str) -> Option<&'static str> {
        url.starts_with("jdbc:sqlite:").then_some("org.sqlite.JDBC")
    }

    fn supports_sequences(&self) -> bool {
        false
    }

    fn supports_ddl_in_transactions(&self) -> bool {
        true
    }

    fn supports_alter_constraints(&self) -> bool {
        false
    }

    fn quoting_strategy(&self) -> QuotingStrategy {
        self.quoting
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn current_timestamp_call(&self, precision: u32) -> String {
        if precision == 0 {
            String::from("CURRENT_TIMESTAMP")
        } else {
            String::from("strftime('%Y-%m-%d %H:%M:%f','now')")
        }
    }

    fn map_type(&self, data_type: &LogicalType) -> String {
        match data_type {
            LogicalType::Boolean
            | LogicalType::SmallInt
            | LogicalType::Integer
            | LogicalType::BigInt => String::from("INTEGER"),
            LogicalType::Decimal(..) => String::from("NUMERIC"),
            LogicalType::Real | LogicalType::Double => String::from("REAL"),
            LogicalType::Text | LogicalType::Uuid | LogicalType::Json => String::from("TEXT"),
            other => super::ansi_type(other),
        }
    }

    fn foreign_key_checks_query(&self) -> Option<String> {
        Some(String::from("PRAGMA foreign_keys"))
    }

    fn set_foreign_key_checks(&self, enabled: bool) -> Option<String> {
        Some(format!(
            "PRAGMA foreign_keys = {}",
            if enabled { "ON" } else { "OFF" }
        ))
    }

    fn cascade_clause(&self) -> Option<&'static str> {
        None
    }

    /// Auto-increment only exists as `INTEGER PRIMARY KEY AUTOINCREMENT`
    /// on a single-column key, with no custom start or step.
    fn column_definition(
        &self,
        _table: &TableIdentifier,
        column: &ColumnDef,
        primary_key: Option<&PrimaryKeyConstraint>,
    ) -> Result<String, DialectError> {
        let in_primary_key = primary_key.is_some_and(|pk| pk.columns.contains(&column.name));
        let Some(settings) = &column.auto_increment else {
            return Ok(column_definition_sql(self, column, in_primary_key, None));
        };
        if settings.has_explicit_parameters() {
            return Err(self.unsupported("auto-increment columns with a custom start or increment"));
        }
        if !primary_key.is_some_and(|pk| pk.columns == [column.name.clone()]) {
            return Err(self.unsupported("auto-increment columns outside a single-column primary key"));
        }
        Ok(column_definition_sql(
            self,
            column,
            in_primary_key,
            Some("PRIMARY KEY AUTOINCREMENT"),
        ))
    }

    fn primary_key_is_inline(&self, statement: &CreateTableStatement, primary_key: &PrimaryKeyConstraint) -> bool {
        is_rowid_alias(statement, primary_key)
    }

    fn remarks_statements(&self, _statement: &CreateTableStatement) -> Vec<String> {
        Vec::new()
    }

    fn column_remarks_statement(&self, _table: &TableIdentifier, _column: &ColumnDef) -> Option<String> {
        None
    }

    fn modify_data_type(&self, _statement: &ModifyDataTypeStatement) -> Result<Vec<String>, DialectError> {
        Err(self.unsupported("changing a column's data type"))
    }

    fn set_nullable(&self, _statement: &SetNullableStatement) -> Result<Vec<String>, DialectError> {
        Err(self.unsupported("changing a column's nullability"))
    }

    fn table_exists(&self, statement: &TableExistsStatement) -> String {
        format!(
            "SELECT COUNT(*) FROM {}sqlite_master WHERE type = 'table' AND LOWER(name) = LOWER({})",
            self.schema_prefix(&statement.table),
            self.string_literal(&statement.table.table)
        )
    }

    fn column_exists(&self, statement: &ColumnExistsStatement) -> String {
        let arguments = match statement.table.schema_name() {
            Some(schema) => format!(
                "{}, {}",
                self.string_literal(&statement.table.table),
                self.string_literal(schema)
            ),
            None => self.string_literal(&statement.table.table),
        };
        format!(
            "SELECT COUNT(*) FROM pragma_table_info({arguments}) WHERE LOWER(name) = LOWER({})",
            self.string_literal(&statement.column)
        )
    }
}
