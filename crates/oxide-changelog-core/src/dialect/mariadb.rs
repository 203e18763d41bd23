//! MariaDB. Mostly MySQL syntax; it also has sequences and
//! `CREATE INDEX IF NOT EXISTS`.

use super::{mysql, ConnectionMetadata, Dialect, QuotingStrategy};
use crate::error::DialectError;
use crate::identifier::{ObjectKind, TableIdentifier};
use crate::statement::{
    AutoIncrement, ColumnDef, CreateTableStatement, DropForeignKeyStatement, DropIndexStatement,
    ModifyDataTypeStatement, SetNullableStatement,
};
use crate::types::LogicalType;

/// MariaDB dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct MariaDbDialect {
    quoting: QuotingStrategy,
}

impl MariaDbDialect {
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

impl Dialect for MariaDbDialect {
    fn short_name(&self) -> &'static str {
        "mariadb"
    }

    fn product_name(&self) -> &'static str {
        "MariaDB"
    }

    fn default_port(&self) -> Option<u16> {
        Some(3306)
    }

    fn default_driver(&self, url: &str) -> Option<&'static str> {
        url.starts_with("jdbc:mariadb:")
            .then_some("org.mariadb.jdbc.Driver")
    }

    /// MariaDB servers often report themselves as MySQL and only mention
    /// MariaDB in the version string.
    fn identify(&self, metadata: &ConnectionMetadata) -> bool {
        let product = metadata.product_name.trim();
        product.eq_ignore_ascii_case("MariaDB")
            || (product.eq_ignore_ascii_case("MySQL")
                && mysql::reports_mariadb(&metadata.product_version))
    }

    fn quoting_strategy(&self) -> QuotingStrategy {
        self.quoting
    }

    fn quote_characters(&self) -> (char, char) {
        ('`', '`')
    }

    fn qualify(&self, catalog: Option<&str>, schema: Option<&str>, name: &str, kind: ObjectKind) -> String {
        mysql::qualify(self, catalog, schema, name, kind)
    }

    fn escape_string(&self, value: &str) -> String {
        mysql::escape_string(value)
    }

    fn concat(&self, values: &[&str]) -> String {
        format!("CONCAT({})", values.join(", "))
    }

    fn current_timestamp_call(&self, precision: u32) -> String {
        mysql::current_timestamp_call(precision)
    }

    fn map_type(&self, data_type: &LogicalType) -> String {
        match data_type {
            LogicalType::Json => String::from("LONGTEXT"),
            other => mysql::map_type(other),
        }
    }

    fn auto_increment_clause(
        &self,
        _table: &TableIdentifier,
        _column: &str,
        settings: &AutoIncrement,
    ) -> Result<String, DialectError> {
        mysql::auto_increment_clause(self, settings)
    }

    fn foreign_key_checks_query(&self) -> Option<String> {
        Some(String::from("SELECT @@FOREIGN_KEY_CHECKS"))
    }

    fn set_foreign_key_checks(&self, enabled: bool) -> Option<String> {
        Some(format!("SET FOREIGN_KEY_CHECKS={}", u8::from(enabled)))
    }

    fn post_column_statements(
        &self,
        table: &TableIdentifier,
        column: &ColumnDef,
    ) -> Result<Vec<String>, DialectError> {
        Ok(mysql::post_column_statements(self, table, column))
    }

    fn table_options(&self, statement: &CreateTableStatement) -> Result<String, DialectError> {
        Ok(mysql::table_options(self, statement))
    }

    fn remarks_statements(&self, _statement: &CreateTableStatement) -> Vec<String> {
        Vec::new()
    }

    fn column_remarks_statement(&self, _table: &TableIdentifier, _column: &ColumnDef) -> Option<String> {
        None
    }

    fn inline_column_remarks(&self, remarks: &str) -> String {
        mysql::inline_column_remarks(self, remarks)
    }

    fn modify_data_type(&self, statement: &ModifyDataTypeStatement) -> Result<Vec<String>, DialectError> {
        Ok(mysql::modify_data_type(self, statement))
    }

    fn set_nullable(&self, statement: &SetNullableStatement) -> Result<Vec<String>, DialectError> {
        mysql::set_nullable(self, statement)
    }

    fn drop_index(&self, statement: &DropIndexStatement) -> Result<Vec<String>, DialectError> {
        Ok(mysql::drop_index(self, statement))
    }

    fn drop_foreign_key(&self, statement: &DropForeignKeyStatement) -> Result<Vec<String>, DialectError> {
        Ok(mysql::drop_foreign_key(self, statement))
    }

    fn information_schema_filter(&self, table: &TableIdentifier) -> String {
        mysql::information_schema_filter(self, table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::{CreateIndexStatement, CreateSequenceStatement, Statement};

    #[test]
    fn test_identifies_mariadb_behind_mysql_product_name() {
        let dialect = MariaDbDialect::new();
        assert!(dialect.identify(&ConnectionMetadata::new("MySQL", "10.11.6-MariaDB-1:10.11.6")));
        assert!(dialect.identify(&ConnectionMetadata::new("MariaDB", "11.2")));
        assert!(!dialect.identify(&ConnectionMetadata::new("MySQL", "8.0.36")));
    }

    #[test]
    fn test_sequences_and_guarded_indexes() {
        let dialect = MariaDbDialect::new();
        let mut sequence = CreateSequenceStatement::new("order_seq");
        sequence.start_with = Some(10);
        assert_eq!(
            dialect.render(&Statement::CreateSequence(sequence)).unwrap(),
            vec!["CREATE SEQUENCE order_seq START WITH 10"]
        );

        let mut index = CreateIndexStatement::new("idx_email", "users", ["email"]);
        index.if_not_exists = true;
        assert_eq!(
            dialect.render(&Statement::CreateIndex(index)).unwrap(),
            vec!["CREATE INDEX IF NOT EXISTS idx_email ON users (email)"]
        );
    }
}
