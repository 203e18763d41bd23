//! H2.

use super::{Dialect, QuotingStrategy};
use crate::error::DialectError;
use crate::identifier::ObjectKind;
use crate::statement::{ModifyDataTypeStatement, RenameColumnStatement, SetNullableStatement};
use crate::types::LogicalType;

/// H2 dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct H2Dialect {
    quoting: QuotingStrategy,
}

impl H2Dialect {
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

impl Dialect for H2Dialect {
    fn short_name(&self) -> &'static str {
        "h2"
    }

    fn product_name(&self) -> &'static str {
        "H2"
    }

    fn default_driver(&self, url: &str) -> Option<&'static str> {
        url.starts_with("jdbc:h2:").then_some("org.h2.Driver")
    }

    fn quoting_strategy(&self) -> QuotingStrategy {
        self.quoting
    }

    fn current_timestamp_call(&self, precision: u32) -> String {
        if precision == 0 {
            String::from("CURRENT_TIMESTAMP")
        } else {
            format!("CURRENT_TIMESTAMP({precision})")
        }
    }

    fn map_type(&self, data_type: &LogicalType) -> String {
        match data_type {
            LogicalType::Text => String::from("CLOB"),
            other => super::ansi_type(other),
        }
    }

    fn rename_column(&self, statement: &RenameColumnStatement) -> Result<Vec<String>, DialectError> {
        Ok(vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} RENAME TO {}",
            self.escape_table_name(&statement.table),
            self.quote_identifier(&statement.old_name, ObjectKind::Column),
            self.quote_identifier(&statement.new_name, ObjectKind::Column)
        )])
    }

    fn modify_data_type(&self, statement: &ModifyDataTypeStatement) -> Result<Vec<String>, DialectError> {
        Ok(vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} SET DATA TYPE {}",
            self.escape_table_name(&statement.table),
            self.quote_identifier(&statement.column, ObjectKind::Column),
            self.map_type(&statement.new_type)
        )])
    }

    fn set_nullable(&self, statement: &SetNullableStatement) -> Result<Vec<String>, DialectError> {
        Ok(vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} SET {}",
            self.escape_table_name(&statement.table),
            self.quote_identifier(&statement.column, ObjectKind::Column),
            if statement.nullable { "NULL" } else { "NOT NULL" }
        )])
    }

    fn current_schema_expression(&self) -> Option<&'static str> {
        Some("CURRENT_SCHEMA")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::Statement;

    #[test]
    fn test_rename_column() {
        let sql = H2Dialect::new()
            .render(&Statement::RenameColumn(RenameColumnStatement {
                table: "users".into(),
                old_name: "mail".into(),
                new_name: "value".into(),
            }))
            .unwrap();
        assert_eq!(sql, vec![r#"ALTER TABLE users ALTER COLUMN mail RENAME TO "value""#]);
    }
}
