//! XuguDB.

use super::{keyword_with_seed, mysql, Dialect, QuotingStrategy};
use crate::error::DialectError;
use crate::identifier::{ObjectKind, TableIdentifier};
use crate::statement::{
    AutoIncrement, DropIndexStatement, ModifyDataTypeStatement, SetNullableStatement,
};
use crate::types::LogicalType;

/// XuguDB dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct XuguDialect {
    quoting: QuotingStrategy,
}

impl XuguDialect {
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

impl Dialect for XuguDialect {
    fn short_name(&self) -> &'static str {
        "xugu"
    }

    fn product_name(&self) -> &'static str {
        "XuguDB"
    }

    fn default_port(&self) -> Option<u16> {
        Some(5138)
    }

    fn default_driver(&self, url: &str) -> Option<&'static str> {
        url.starts_with("jdbc:xugu")
            .then_some("com.xugu.cloudjdbc.Driver")
    }

    fn supports_sequences(&self) -> bool {
        false
    }

    fn supports_create_index_if_not_exists(&self) -> bool {
        false
    }

    fn quoting_strategy(&self) -> QuotingStrategy {
        self.quoting
    }

    fn quote_characters(&self) -> (char, char) {
        ('`', '`')
    }

    fn escape_string(&self, value: &str) -> String {
        mysql::escape_string(value)
    }

    fn concat(&self, values: &[&str]) -> String {
        format!("CONCAT_WS({})", values.join(", "))
    }

    fn current_timestamp_call(&self, precision: u32) -> String {
        mysql::current_timestamp_call(precision)
    }

    fn map_type(&self, data_type: &LogicalType) -> String {
        match data_type {
            LogicalType::Double => String::from("DOUBLE"),
            LogicalType::Text | LogicalType::Json => String::from("CLOB"),
            LogicalType::Uuid => String::from("VARCHAR(36)"),
            other => super::ansi_type(other),
        }
    }

    fn auto_increment_clause(
        &self,
        _table: &TableIdentifier,
        _column: &str,
        settings: &AutoIncrement,
    ) -> Result<String, DialectError> {
        Ok(keyword_with_seed("IDENTITY", settings, ","))
    }

    fn foreign_key_checks_query(&self) -> Option<String> {
        Some(String::from("SELECT @@FOREIGN_KEY_CHECKS"))
    }

    fn set_foreign_key_checks(&self, enabled: bool) -> Option<String> {
        Some(format!("SET FOREIGN_KEY_CHECKS={}", u8::from(enabled)))
    }

    fn add_column_keyword(&self) -> &'static str {
        "ADD"
    }

    fn modify_data_type(&self, statement: &ModifyDataTypeStatement) -> Result<Vec<String>, DialectError> {
        Ok(mysql::modify_data_type(self, statement))
    }

    fn set_nullable(&self, statement: &SetNullableStatement) -> Result<Vec<String>, DialectError> {
        Ok(vec![format!(
            "ALTER TABLE {} MODIFY {} {}",
            self.escape_table_name(&statement.table),
            self.quote_identifier(&statement.column, ObjectKind::Column),
            if statement.nullable { "NULL" } else { "NOT NULL" }
        )])
    }

    /// Indexes belong to their table: `DROP INDEX table.index`.
    fn drop_index(&self, statement: &DropIndexStatement) -> Result<Vec<String>, DialectError> {
        Ok(vec![format!(
            "DROP INDEX {}.{}",
            self.escape_table_name(&statement.table),
            self.quote_identifier(&statement.name, ObjectKind::Index)
        )])
    }

    fn current_schema_expression(&self) -> Option<&'static str> {
        Some("current_schema()")
    }
}
