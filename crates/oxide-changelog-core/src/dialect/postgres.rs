//! PostgreSQL.

use super::{Dialect, QuotingStrategy};
use crate::types::LogicalType;

/// PostgreSQL dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect {
    quoting: QuotingStrategy,
}

impl PostgresDialect {
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
}

impl Dialect for PostgresDialect {
    fn short_name(&self) -> &'static str {
        "postgresql"
    }

    fn product_name(&self) -> &'static str {
        "PostgreSQL"
    }

    fn default_port(&self) -> Option<u16> {
        Some(5432)
    }

    fn default_driver(&self, url: &str) -> Option<&'static str> {
        url.starts_with("jdbc:postgresql:")
            .then_some("org.postgresql.Driver")
    }

    fn quoting_strategy(&self) -> QuotingStrategy {
        self.quoting
    }

    fn supports_initially_deferrable_columns(&self) -> bool {
        true
    }

    fn supports_tablespaces(&self) -> bool {
        true
    }

    fn supports_ddl_in_transactions(&self) -> bool {
        true
    }

    fn current_timestamp_call(&self, precision: u32) -> String {
        if precision == 0 {
            String::from("NOW()")
        } else {
            format!("CURRENT_TIMESTAMP({precision})")
        }
    }

    fn map_type(&self, data_type: &LogicalType) -> String {
        match data_type {
            LogicalType::Blob => String::from("BYTEA"),
            LogicalType::Json => String::from("JSONB"),
            LogicalType::TimestampTz(None) => String::from("TIMESTAMPTZ"),
            LogicalType::TimestampTz(Some(p)) => format!("TIMESTAMPTZ({p})"),
            LogicalType::Decimal(p, s) => format!("NUMERIC({p}, {s})"),
            other => super::ansi_type(other),
        }
    }

    fn current_schema_expression(&self) -> Option<&'static str> {
        Some("current_schema()")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::{ModifyDataTypeStatement, SetNullableStatement, Statement};

    #[test]
    fn test_timestamps() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.format_current_timestamp("CURRENT_TIMESTAMP"), "NOW()");
        assert_eq!(
            dialect.format_current_timestamp("current_timestamp(6)"),
            "CURRENT_TIMESTAMP(6)"
        );
    }

    #[test]
    fn test_alter_column() {
        let dialect = PostgresDialect::new();
        let sql = dialect
            .render(&Statement::ModifyDataType(ModifyDataTypeStatement {
                table: "users".into(),
                column: "age".into(),
                new_type: LogicalType::BigInt,
            }))
            .unwrap();
        assert_eq!(sql, vec!["ALTER TABLE users ALTER COLUMN age TYPE BIGINT"]);

        let sql = dialect
            .render(&Statement::SetNullable(SetNullableStatement {
                table: "users".into(),
                column: "email".into(),
                nullable: false,
                column_type: None,
            }))
            .unwrap();
        assert_eq!(sql, vec!["ALTER TABLE users ALTER COLUMN email SET NOT NULL"]);
    }
}
