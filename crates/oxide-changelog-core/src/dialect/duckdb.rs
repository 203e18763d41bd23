//! DuckDB.
//!
//! DuckDB has no identity columns; auto-increment is emulated with a
//! sequence per column and a `nextval` default.

use super::{Dialect, QuotingStrategy};
use crate::error::DialectError;
use crate::identifier::TableIdentifier;
use crate::statement::{AutoIncrement, ColumnDef};
use crate::types::LogicalType;

/// DuckDB dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuckDbDialect {
    quoting: QuotingStrategy,
}

impl DuckDbDialect {
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

    fn sequence_name(&self, table: &TableIdentifier, column: &str) -> String {
        self.escape_sequence_name(table.schema_name(), &format!("seq_{}_{column}", table.table))
    }
}

impl Dialect for DuckDbDialect {
    fn short_name(&self) -> &'static str {
        "duckdb"
    }

    fn product_name(&self) -> &'static str {
        "DuckDB"
    }

    fn supports_ddl_in_transactions(&self) -> bool {
        true
    }

    fn supports_alter_constraints(&self) -> bool {
        false
    }

    fn supports_on_update_action(&self) -> bool {
        false
    }

    fn quoting_strategy(&self) -> QuotingStrategy {
        self.quoting
    }

    fn current_timestamp_call(&self, precision: u32) -> String {
        match precision {
            0 => String::from("CURRENT_TIMESTAMP"),
            1..=3 => String::from("CAST(NOW() AS TIMESTAMP_MS)"),
            _ => String::from("CAST(NOW() AS TIMESTAMP)"),
        }
    }

    fn map_type(&self, data_type: &LogicalType) -> String {
        match data_type {
            LogicalType::Double => String::from("DOUBLE"),
            LogicalType::Text | LogicalType::Varchar(_) => String::from("VARCHAR"),
            LogicalType::TimestampTz(_) => String::from("TIMESTAMPTZ"),
            LogicalType::Timestamp(_) => String::from("TIMESTAMP"),
            other => super::ansi_type(other),
        }
    }

    fn pre_column_statements(
        &self,
        table: &TableIdentifier,
        column: &ColumnDef,
    ) -> Result<Vec<String>, DialectError> {
        Ok(column
            .auto_increment
            .as_ref()
            .map(|settings| {
                format!(
                    "CREATE SEQUENCE IF NOT EXISTS {} START {} INCREMENT BY {}",
                    self.sequence_name(table, &column.name),
                    settings.start_with.unwrap_or(1),
                    settings.increment_by.unwrap_or(1)
                )
            })
            .into_iter()
            .collect())
    }

    fn auto_increment_clause(
        &self,
        table: &TableIdentifier,
        column: &str,
        _settings: &AutoIncrement,
    ) -> Result<String, DialectError> {
        Ok(format!(
            "DEFAULT nextval({})",
            self.string_literal(&self.sequence_name(table, column))
        ))
    }

    fn current_schema_expression(&self) -> Option<&'static str> {
        Some("current_schema()")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::ObjectKind;
    use crate::statement::{CreateTableBuilder, Statement};

    #[test]
    fn test_auto_increment_uses_sequence() {
        let statement = CreateTableBuilder::new(TableIdentifier::new("users").with_schema("app"))
            .column(
                ColumnDef::new("id", LogicalType::BigInt)
                    .primary_key()
                    .auto_increment_with(AutoIncrement::new().start_with(5)),
            )
            .build();
        let sql = DuckDbDialect::new().render(&Statement::CreateTable(statement)).unwrap();
        assert_eq!(
            sql,
            vec![
                "CREATE SEQUENCE IF NOT EXISTS app.seq_users_id START 5 INCREMENT BY 1".to_string(),
                "CREATE TABLE app.users (\n    id BIGINT DEFAULT nextval('app.seq_users_id') NOT NULL,\n    PRIMARY KEY (id)\n)".to_string(),
            ]
        );
    }

    #[test]
    fn test_timestamp_precision_buckets() {
        let dialect = DuckDbDialect::new();
        assert_eq!(dialect.current_timestamp_call(0), "CURRENT_TIMESTAMP");
        assert_eq!(dialect.current_timestamp_call(3), "CAST(NOW() AS TIMESTAMP_MS)");
        assert_eq!(dialect.current_timestamp_call(6), "CAST(NOW() AS TIMESTAMP)");
        assert_eq!(dialect.quote_identifier("pivot", ObjectKind::Column), "\"pivot\"");
    }
}
