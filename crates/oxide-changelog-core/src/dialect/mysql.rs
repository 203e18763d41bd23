//! MySQL, and the syntax MariaDB shares with it.

use super::{Dialect, QuotingStrategy};
use crate::error::DialectError;
use crate::identifier::{ObjectKind, TableIdentifier};
use crate::statement::{
    AutoIncrement, ColumnDef, CreateTableStatement, DropForeignKeyStatement, DropIndexStatement,
    ModifyDataTypeStatement, SetNullableStatement,
};
use crate::types::LogicalType;

/// MySQL dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect {
    quoting: QuotingStrategy,
}

impl MySqlDialect {
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

/// True when a MySQL-protocol server is really MariaDB.
pub(super) fn reports_mariadb(product_version: &str) -> bool {
    product_version.to_ascii_lowercase().contains("mariadb")
}

/// Databases are the only qualifier; a schema stands in for a missing
/// catalog.
pub(super) fn qualify<D: Dialect + ?Sized>(
    dialect: &D,
    catalog: Option<&str>,
    schema: Option<&str>,
    name: &str,
    kind: ObjectKind,
) -> String {
    let name = dialect.quote_identifier(name, kind);
    match catalog.or(schema).filter(|s| !s.is_empty()) {
        Some(database) => format!(
            "{}.{name}",
            dialect.quote_identifier(database, ObjectKind::Catalog)
        ),
        None => name,
    }
}

pub(super) fn escape_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "''")
}

pub(super) fn map_type(data_type: &LogicalType) -> String {
    match data_type {
        LogicalType::Double => String::from("DOUBLE"),
        LogicalType::Text => String::from("LONGTEXT"),
        LogicalType::Timestamp(None) => String::from("DATETIME"),
        LogicalType::Timestamp(Some(p)) => format!("DATETIME({p})"),
        LogicalType::TimestampTz(None) => String::from("TIMESTAMP"),
        LogicalType::TimestampTz(Some(p)) => format!("TIMESTAMP({p})"),
        LogicalType::Blob => String::from("LONGBLOB"),
        LogicalType::Uuid => String::from("CHAR(36)"),
        other => super::ansi_type(other),
    }
}

pub(super) fn current_timestamp_call(precision: u32) -> String {
    if precision == 0 {
        String::from("NOW()")
    } else {
        format!("NOW({precision})")
    }
}

/// `AUTO_INCREMENT`; the start value goes into a table option and a
/// custom step has no per-column form.
pub(super) fn auto_increment_clause<D: Dialect + ?Sized>(
    dialect: &D,
    settings: &AutoIncrement,
) -> Result<String, DialectError> {
    if settings.explicit_increment().is_some() {
        return Err(dialect.unsupported("auto-increment columns with a custom increment"));
    }
    Ok(String::from("AUTO_INCREMENT"))
}

pub(super) fn table_options<D: Dialect + ?Sized>(
    dialect: &D,
    statement: &CreateTableStatement,
) -> String {
    let mut options = String::new();
    if let Some(start) = statement
        .columns
        .iter()
        .filter_map(|c| c.auto_increment.as_ref())
        .find_map(AutoIncrement::explicit_start)
    {
        options.push_str(&format!(" AUTO_INCREMENT={start}"));
    }
    if let Some(remarks) = &statement.remarks {
        options.push_str(&format!(" COMMENT={}", dialect.string_literal(remarks)));
    }
    options
}

/// Seeds the counter after an auto-increment column was added.
pub(super) fn post_column_statements<D: Dialect + ?Sized>(
    dialect: &D,
    table: &TableIdentifier,
    column: &ColumnDef,
) -> Vec<String> {
    column
        .auto_increment
        .as_ref()
        .and_then(AutoIncrement::explicit_start)
        .map(|start| {
            format!(
                "ALTER TABLE {} AUTO_INCREMENT={start}",
                dialect.escape_table_name(table)
            )
        })
        .into_iter()
        .collect()
}

pub(super) fn inline_column_remarks<D: Dialect + ?Sized>(dialect: &D, remarks: &str) -> String {
    format!(" COMMENT {}", dialect.string_literal(remarks))
}

pub(super) fn modify_data_type<D: Dialect + ?Sized>(
    dialect: &D,
    statement: &ModifyDataTypeStatement,
) -> Vec<String> {
    vec![format!(
        "ALTER TABLE {} MODIFY {} {}",
        dialect.escape_table_name(&statement.table),
        dialect.quote_identifier(&statement.column, ObjectKind::Column),
        dialect.map_type(&statement.new_type)
    )]
}

/// MODIFY restates the column, so the type must be known.
pub(super) fn set_nullable<D: Dialect + ?Sized>(
    dialect: &D,
    statement: &SetNullableStatement,
) -> Result<Vec<String>, DialectError> {
    let column_type = statement
        .column_type
        .as_ref()
        .ok_or_else(|| dialect.unsupported("changing nullability without the column type"))?;
    Ok(vec![format!(
        "ALTER TABLE {} MODIFY {} {}{}",
        dialect.escape_table_name(&statement.table),
        dialect.quote_identifier(&statement.column, ObjectKind::Column),
        dialect.map_type(column_type),
        if statement.nullable { " NULL" } else { " NOT NULL" }
    )])
}

pub(super) fn drop_index<D: Dialect + ?Sized>(dialect: &D, statement: &DropIndexStatement) -> Vec<String> {
    vec![format!(
        "DROP INDEX {} ON {}",
        dialect.quote_identifier(&statement.name, ObjectKind::Index),
        dialect.escape_table_name(&statement.table)
    )]
}

pub(super) fn drop_foreign_key<D: Dialect + ?Sized>(
    dialect: &D,
    statement: &DropForeignKeyStatement,
) -> Vec<String> {
    vec![format!(
        "ALTER TABLE {} DROP FOREIGN KEY {}",
        dialect.escape_table_name(&statement.table),
        dialect.quote_identifier(&statement.name, ObjectKind::Constraint)
    )]
}

pub(super) fn information_schema_filter<D: Dialect + ?Sized>(
    dialect: &D,
    table: &TableIdentifier,
) -> String {
    match table.catalog_name().or_else(|| table.schema_name()) {
        Some(database) => format!(
            " AND LOWER(table_schema) = LOWER({})",
            dialect.string_literal(database)
        ),
        None => String::from(" AND table_schema = DATABASE()"),
    }
}

impl Dialect for MySqlDialect {
    fn short_name(&self) -> &'static str {
        "mysql"
    }

    fn product_name(&self) -> &'static str {
        "MySQL"
    }

    fn default_port(&self) -> Option<u16> {
        Some(3306)
    }

    fn default_driver(&self, url: &str) -> Option<&'static str> {
        url.starts_with("jdbc:mysql:")
            .then_some("com.mysql.cj.jdbc.Driver")
    }

    fn identify(&self, metadata: &super::ConnectionMetadata) -> bool {
        metadata.product_name.trim().eq_ignore_ascii_case("MySQL")
            && !reports_mariadb(&metadata.product_version)
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

    fn qualify(&self, catalog: Option<&str>, schema: Option<&str>, name: &str, kind: ObjectKind) -> String {
        qualify(self, catalog, schema, name, kind)
    }

    fn escape_string(&self, value: &str) -> String {
        escape_string(value)
    }

    fn concat(&self, values: &[&str]) -> String {
        format!("CONCAT({})", values.join(", "))
    }

    fn current_timestamp_call(&self, precision: u32) -> String {
        current_timestamp_call(precision)
    }

    fn map_type(&self, data_type: &LogicalType) -> String {
        map_type(data_type)
    }

    fn auto_increment_clause(
        &self,
        _table: &TableIdentifier,
        _column: &str,
        settings: &AutoIncrement,
    ) -> Result<String, DialectError> {
        auto_increment_clause(self, settings)
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
        Ok(post_column_statements(self, table, column))
    }

    fn table_options(&self, statement: &CreateTableStatement) -> Result<String, DialectError> {
        Ok(table_options(self, statement))
    }

    fn remarks_statements(&self, _statement: &CreateTableStatement) -> Vec<String> {
        Vec::new()
    }

    fn column_remarks_statement(&self, _table: &TableIdentifier, _column: &ColumnDef) -> Option<String> {
        None
    }

    fn inline_column_remarks(&self, remarks: &str) -> String {
        inline_column_remarks(self, remarks)
    }

    fn modify_data_type(&self, statement: &ModifyDataTypeStatement) -> Result<Vec<String>, DialectError> {
        Ok(modify_data_type(self, statement))
    }

    fn set_nullable(&self, statement: &SetNullableStatement) -> Result<Vec<String>, DialectError> {
        set_nullable(self, statement)
    }

    fn drop_index(&self, statement: &DropIndexStatement) -> Result<Vec<String>, DialectError> {
        Ok(drop_index(self, statement))
    }

    fn drop_foreign_key(&self, statement: &DropForeignKeyStatement) -> Result<Vec<String>, DialectError> {
        Ok(drop_foreign_key(self, statement))
    }

    fn information_schema_filter(&self, table: &TableIdentifier) -> String {
        information_schema_filter(self, table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::{AddColumnStatement, CreateTableBuilder, Statement};

    #[test]
    fn test_create_table_with_seeded_auto_increment() {
        let statement = CreateTableBuilder::new("users")
            .column(
                ColumnDef::new("id", LogicalType::BigInt)
                    .primary_key()
                    .auto_increment_with(AutoIncrement::new().start_with(100)),
            )
            .column(ColumnDef::new("bio", LogicalType::Text).remarks("it's me"))
            .remarks("people")
            .build();
        let sql = MySqlDialect::new().render(&Statement::CreateTable(statement)).unwrap();
        assert_eq!(
            sql,
            vec![
                "CREATE TABLE users (\n    id BIGINT AUTO_INCREMENT NOT NULL,\n    bio LONGTEXT COMMENT 'it''s me',\n    PRIMARY KEY (id)\n) AUTO_INCREMENT=100 COMMENT='people'"
            ]
        );
    }

    #[test]
    fn test_custom_increment_is_unsupported() {
        let statement = CreateTableBuilder::new("t")
            .column(
                ColumnDef::new("id", LogicalType::Integer)
                    .auto_increment_with(AutoIncrement::new().increment_by(5)),
            )
            .build();
        let err = MySqlDialect::new()
            .render(&Statement::CreateTable(statement))
            .unwrap_err();
        assert!(matches!(err, DialectError::Unsupported { dialect: "mysql", .. }));
    }

    #[test]
    fn test_add_auto_increment_column_seeds_counter() {
        let statement = AddColumnStatement {
            table: TableIdentifier::new("t").with_schema("app"),
            column: ColumnDef::new("n", LogicalType::Integer)
                .auto_increment_with(AutoIncrement::new().start_with(7)),
        };
        let sql = MySqlDialect::new().render(&Statement::AddColumn(statement)).unwrap();
        assert_eq!(
            sql,
            vec![
                "ALTER TABLE app.t ADD COLUMN n INTEGER AUTO_INCREMENT",
                "ALTER TABLE app.t AUTO_INCREMENT=7",
            ]
        );
    }

    #[test]
    fn test_set_nullable_requires_type() {
        let dialect = MySqlDialect::new();
        let mut statement = SetNullableStatement {
            table: "t".into(),
            column: "c".into(),
            nullable: false,
            column_type: None,
        };
        assert!(dialect.render(&Statement::SetNullable(statement.clone())).is_err());
        statement.column_type = Some(LogicalType::Varchar(20));
        assert_eq!(
            dialect.render(&Statement::SetNullable(statement)).unwrap(),
            vec!["ALTER TABLE t MODIFY c VARCHAR(20) NOT NULL"]
        );
    }

    #[test]
    fn test_backslashes_are_escaped() {
        assert_eq!(MySqlDialect::new().string_literal(r"a\b'c"), r"'a\\b''c'");
    }

    #[test]
    fn test_mariadb_version_is_not_mysql() {
        let dialect = MySqlDialect::new();
        assert!(dialect.identify(&super::super::ConnectionMetadata::new("MySQL", "8.0.36")));
        assert!(!dialect.identify(&super::super::ConnectionMetadata::new(
            "MySQL",
            "10.11.6-MariaDB"
        )));
    }
}
