//! Oracle Database.

use super::{identity_clause, Dialect, QuotingStrategy};
use crate::error::DialectError;
use crate::identifier::{ObjectKind, TableIdentifier};
use crate::statement::{
    AutoIncrement, ColumnExistsStatement, ModifyDataTypeStatement, SetNullableStatement,
    TableExistsStatement,
};
use crate::types::LogicalType;

/// Oracle dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct OracleDialect {
    quoting: QuotingStrategy,
}

impl OracleDialect {
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

    fn owner_filter(&self, table: &TableIdentifier) -> String {
        table.schema_name().map_or_else(
            || String::from("owner = SYS_CONTEXT('USERENV', 'CURRENT_SCHEMA')"),
            |schema| format!("owner = UPPER({})", self.string_literal(schema)),
        )
    }
}

impl Dialect for OracleDialect {
    fn short_name(&self) -> &'static str {
        "oracle"
    }

    fn product_name(&self) -> &'static str {
        "Oracle"
    }

    fn default_port(&self) -> Option<u16> {
        Some(1521)
    }

    fn default_driver(&self, url: &str) -> Option<&'static str> {
        url.starts_with("jdbc:oracle:")
            .then_some("oracle.jdbc.OracleDriver")
    }

    fn supports_initially_deferrable_columns(&self) -> bool {
        true
    }

    fn supports_tablespaces(&self) -> bool {
        true
    }

    fn supports_if_not_exists(&self) -> bool {
        false
    }

    fn supports_drop_if_exists(&self) -> bool {
        false
    }

    fn supports_on_update_action(&self) -> bool {
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
            String::from("SYSTIMESTAMP")
        } else {
            format!("CURRENT_TIMESTAMP({precision})")
        }
    }

    fn map_type(&self, data_type: &LogicalType) -> String {
        match data_type {
            LogicalType::Boolean => String::from("NUMBER(1)"),
            LogicalType::SmallInt => String::from("NUMBER(5)"),
            LogicalType::Integer => String::from("NUMBER(10)"),
            LogicalType::BigInt => String::from("NUMBER(19)"),
            LogicalType::Decimal(p, s) => format!("NUMBER({p}, {s})"),
            LogicalType::Real => String::from("BINARY_FLOAT"),
            LogicalType::Double => String::from("BINARY_DOUBLE"),
            LogicalType::Varchar(n) => format!("VARCHAR2({n})"),
            LogicalType::Text | LogicalType::Json => String::from("CLOB"),
            LogicalType::Time => String::from("DATE"),
            LogicalType::Uuid => String::from("VARCHAR2(36)"),
            other => super::ansi_type(other),
        }
    }

    fn auto_increment_clause(
        &self,
        _table: &TableIdentifier,
        _column: &str,
        settings: &AutoIncrement,
    ) -> Result<String, DialectError> {
        Ok(identity_clause(settings, true))
    }

    fn cascade_clause(&self) -> Option<&'static str> {
        Some("CASCADE CONSTRAINTS")
    }

    fn add_column_keyword(&self) -> &'static str {
        "ADD"
    }

    fn modify_data_type(&self, statement: &ModifyDataTypeStatement) -> Result<Vec<String>, DialectError> {
        Ok(vec![format!(
            "ALTER TABLE {} MODIFY {} {}",
            self.escape_table_name(&statement.table),
            self.quote_identifier(&statement.column, ObjectKind::Column),
            self.map_type(&statement.new_type)
        )])
    }

    fn set_nullable(&self, statement: &SetNullableStatement) -> Result<Vec<String>, DialectError> {
        Ok(vec![format!(
            "ALTER TABLE {} MODIFY {} {}",
            self.escape_table_name(&statement.table),
            self.quote_identifier(&statement.column, ObjectKind::Column),
            if statement.nullable { "NULL" } else { "NOT NULL" }
        )])
    }

    fn table_exists(&self, statement: &TableExistsStatement) -> String {
        format!(
            "SELECT COUNT(*) FROM all_tables WHERE table_name = UPPER({}) AND {}",
            self.string_literal(&statement.table.table),
            self.owner_filter(&statement.table)
        )
    }

    fn column_exists(&self, statement: &ColumnExistsStatement) -> String {
        format!(
            "SELECT COUNT(*) FROM all_tab_columns WHERE table_name = UPPER({}) AND column_name = UPPER({}) AND {}",
            self.string_literal(&statement.table.table),
            self.string_literal(&statement.column),
            self.owner_filter(&statement.table)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::{
        ColumnDef, CreateTableBuilder, DropTableStatement, ForeignKeyAction, ForeignKeyConstraint,
        Statement,
    };

    #[test]
    fn test_identity_on_null() {
        let statement = CreateTableBuilder::new("t")
            .column(
                ColumnDef::new("id", LogicalType::BigInt)
                    .primary_key()
                    .auto_increment_with(AutoIncrement::new().default_on_null()),
            )
            .build();
        assert_eq!(
            OracleDialect::new().render(&Statement::CreateTable(statement)).unwrap(),
            vec!["CREATE TABLE t (\n    id NUMBER(19) GENERATED BY DEFAULT ON NULL AS IDENTITY NOT NULL,\n    PRIMARY KEY (id)\n)"]
        );
    }

    #[test]
    fn test_on_update_action_is_unsupported() {
        let statement = CreateTableBuilder::new("child")
            .column(ColumnDef::new("parent_id", LogicalType::Integer))
            .foreign_key(
                ForeignKeyConstraint::new(["parent_id"], "parent", ["id"])
                    .on_update(ForeignKeyAction::Cascade),
            )
            .build();
        assert!(OracleDialect::new().render(&Statement::CreateTable(statement)).is_err());
    }

    #[test]
    fn test_drop_table_cascade_constraints() {
        let mut statement = DropTableStatement::new("t");
        statement.cascade_constraints = true;
        assert_eq!(
            OracleDialect::new().render(&Statement::DropTable(statement)).unwrap(),
            vec!["DROP TABLE t CASCADE CONSTRAINTS"]
        );
    }

    #[test]
    fn test_if_not_exists_is_unsupported() {
        let statement = CreateTableBuilder::new("t")
            .column(ColumnDef::new("id", LogicalType::Integer))
            .if_not_exists(true)
            .build();
        let err = OracleDialect::new().render(&Statement::CreateTable(statement)).unwrap_err();
        assert_eq!(err.to_string(), "oracle does not support CREATE TABLE IF NOT EXISTS");
    }
}
