//! Microsoft SQL Server.

use super::{keyword_with_seed, ConnectionMetadata, Dialect, QuotingStrategy};
use crate::error::DialectError;
use crate::identifier::{ObjectKind, TableIdentifier};
use crate::statement::{
    AutoIncrement, ColumnDef, CreateIndexStatement, CreateTableStatement, DropIndexStatement,
    ModifyDataTypeStatement, RenameColumnStatement, RenameTableStatement, SetNullableStatement,
};
use crate::types::LogicalType;

const DEFAULT_SCHEMA: &str = "dbo";

/// SQL Server dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct MssqlDialect {
    quoting: QuotingStrategy,
}

impl MssqlDialect {
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

    /// Object name as a unicode string literal, for OBJECT_ID and
    /// sp_rename.
    fn object_literal(&self, name: &str) -> String {
        format!("N{}", self.string_literal(name))
    }

    fn extended_property(&self, table: &TableIdentifier, column: Option<&str>, remarks: &str) -> String {
        let mut sql = format!(
            "EXEC sp_addextendedproperty @name = N'MS_Description', @value = {}, @level0type = N'SCHEMA', @level0name = {}, @level1type = N'TABLE', @level1name = {}",
            self.object_literal(remarks),
            self.object_literal(table.schema_name().unwrap_or(DEFAULT_SCHEMA)),
            self.object_literal(&table.table)
        );
        if let Some(column) = column {
            sql.push_str(&format!(
                ", @level2type = N'COLUMN', @level2name = {}",
                self.object_literal(column)
            ));
        }
        sql
    }
}

impl Dialect for MssqlDialect {
    fn short_name(&self) -> &'static str {
        "mssql"
    }

    fn product_name(&self) -> &'static str {
        "Microsoft SQL Server"
    }

    fn default_port(&self) -> Option<u16> {
        Some(1433)
    }

    fn default_driver(&self, url: &str) -> Option<&'static str> {
        url.starts_with("jdbc:sqlserver:")
            .then_some("com.microsoft.sqlserver.jdbc.SQLServerDriver")
    }

    /// Editions report e.g. "Microsoft SQL Server Express Edition".
    fn identify(&self, metadata: &ConnectionMetadata) -> bool {
        metadata
            .product_name
            .trim()
            .to_ascii_lowercase()
            .starts_with("microsoft sql server")
    }

    fn supports_tablespaces(&self) -> bool {
        true
    }

    fn supports_if_not_exists(&self) -> bool {
        false
    }

    fn supports_ddl_in_transactions(&self) -> bool {
        true
    }

    fn quoting_strategy(&self) -> QuotingStrategy {
        self.quoting
    }

    fn quote_characters(&self) -> (char, char) {
        ('[', ']')
    }

    /// `catalog.schema.name`; a catalog without schema yields
    /// `catalog..name`, which selects the default schema.
    fn qualify(&self, catalog: Option<&str>, schema: Option<&str>, name: &str, kind: ObjectKind) -> String {
        let name = self.quote_identifier(name, kind);
        let schema = schema
            .filter(|s| !s.is_empty())
            .map(|s| self.quote_identifier(s, ObjectKind::Schema));
        match (catalog.filter(|c| !c.is_empty()), schema) {
            (Some(catalog), schema) => format!(
                "{}.{}.{name}",
                self.quote_identifier(catalog, ObjectKind::Catalog),
                schema.unwrap_or_default()
            ),
            (None, Some(schema)) => format!("{schema}.{name}"),
            (None, None) => name,
        }
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn concat(&self, values: &[&str]) -> String {
        values.join(" + ")
    }

    fn current_timestamp_call(&self, precision: u32) -> String {
        if precision == 0 {
            String::from("GETDATE()")
        } else {
            format!("CAST(SYSDATETIME() AS DATETIME2({precision}))")
        }
    }

    fn map_type(&self, data_type: &LogicalType) -> String {
        match data_type {
            LogicalType::Boolean => String::from("BIT"),
            LogicalType::Double => String::from("FLOAT"),
            LogicalType::Varchar(n) => format!("NVARCHAR({n})"),
            LogicalType::Text | LogicalType::Json => String::from("NVARCHAR(MAX)"),
            LogicalType::Timestamp(None) => String::from("DATETIME2"),
            LogicalType::Timestamp(Some(p)) => format!("DATETIME2({p})"),
            LogicalType::TimestampTz(None) => String::from("DATETIMEOFFSET"),
            LogicalType::TimestampTz(Some(p)) => format!("DATETIMEOFFSET({p})"),
            LogicalType::Blob => String::from("VARBINARY(MAX)"),
            LogicalType::Uuid => String::from("UNIQUEIDENTIFIER"),
            other => super::ansi_type(other),
        }
    }

    fn auto_increment_clause(
        &self,
        _table: &TableIdentifier,
        _column: &str,
        settings: &AutoIncrement,
    ) -> Result<String, DialectError> {
        Ok(keyword_with_seed("IDENTITY", settings, ", "))
    }

    fn tablespace_clause(&self, tablespace: &str) -> String {
        format!(" ON {}", self.quote_identifier(tablespace, ObjectKind::Schema))
    }

    fn guard_create_table(&self, table: &TableIdentifier, sql: String) -> Result<String, DialectError> {
        Ok(format!(
            "IF OBJECT_ID({}, N'U') IS NULL\n{sql}",
            self.object_literal(&table.to_string())
        ))
    }

    fn guard_create_index(&self, statement: &CreateIndexStatement, sql: String) -> Result<String, DialectError> {
        Ok(format!(
            "IF NOT EXISTS (SELECT 1 FROM sys.indexes WHERE name = {} AND object_id = OBJECT_ID({}))\n{sql}",
            self.object_literal(&statement.name),
            self.object_literal(&statement.table.to_string())
        ))
    }

    fn remarks_statements(&self, statement: &CreateTableStatement) -> Vec<String> {
        let mut statements = Vec::new();
        if let Some(remarks) = &statement.remarks {
            statements.push(self.extended_property(&statement.table, None, remarks));
        }
        for column in &statement.columns {
            statements.extend(self.column_remarks_statement(&statement.table, column));
        }
        statements
    }

    fn column_remarks_statement(&self, table: &TableIdentifier, column: &ColumnDef) -> Option<String> {
        column
            .remarks
            .as_ref()
            .map(|remarks| self.extended_property(table, Some(&column.name), remarks))
    }

    fn cascade_clause(&self) -> Option<&'static str> {
        None
    }

    fn rename_table(&self, statement: &RenameTableStatement) -> Result<Vec<String>, DialectError> {
        Ok(vec![format!(
            "EXEC sp_rename {}, {}",
            self.object_literal(&statement.table.to_string()),
            self.object_literal(&statement.new_name)
        )])
    }

    fn add_column_keyword(&self) -> &'static str {
        "ADD"
    }

    fn rename_column(&self, statement: &RenameColumnStatement) -> Result<Vec<String>, DialectError> {
        Ok(vec![format!(
            "EXEC sp_rename {}, {}, 'COLUMN'",
            self.object_literal(&format!("{}.{}", statement.table, statement.old_name)),
            self.object_literal(&statement.new_name)
        )])
    }

    fn modify_data_type(&self, statement: &ModifyDataTypeStatement) -> Result<Vec<String>, DialectError> {
        Ok(vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} {}",
            self.escape_table_name(&statement.table),
            self.quote_identifier(&statement.column, ObjectKind::Column),
            self.map_type(&statement.new_type)
        )])
    }

    /// ALTER COLUMN restates the type.
    fn set_nullable(&self, statement: &SetNullableStatement) -> Result<Vec<String>, DialectError> {
        let column_type = statement
            .column_type
            .as_ref()
            .ok_or_else(|| self.unsupported("changing nullability without the column type"))?;
        Ok(vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} {}{}",
            self.escape_table_name(&statement.table),
            self.quote_identifier(&statement.column, ObjectKind::Column),
            self.map_type(column_type),
            if statement.nullable { " NULL" } else { " NOT NULL" }
        )])
    }

    fn drop_index(&self, statement: &DropIndexStatement) -> Result<Vec<String>, DialectError> {
        Ok(vec![format!(
            "DROP INDEX {} ON {}",
            self.quote_identifier(&statement.name, ObjectKind::Index),
            self.escape_table_name(&statement.table)
        )])
    }

    fn current_schema_expression(&self) -> Option<&'static str> {
        Some("SCHEMA_NAME()")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::{CreateTableBuilder, Statement};

    #[test]
    fn test_guarded_create_table_with_identity() {
        let statement = CreateTableBuilder::new(TableIdentifier::new("users").with_schema("app"))
            .column(
                ColumnDef::new("id", LogicalType::Integer)
                    .primary_key()
                    .auto_increment_with(AutoIncrement::new().start_with(100).increment_by(10)),
            )
            .column(ColumnDef::new("order", LogicalType::Integer))
            .if_not_exists(true)
            .build();
        let sql = MssqlDialect::new().render(&Statement::CreateTable(statement)).unwrap();
        assert_eq!(
            sql,
            vec![
                "IF OBJECT_ID(N'app.users', N'U') IS NULL\nCREATE TABLE app.users (\n    id INTEGER IDENTITY(100, 10) NOT NULL,\n    [order] INTEGER,\n    PRIMARY KEY (id)\n)"
            ]
        );
    }

    #[test]
    fn test_qualify_with_catalog() {
        let dialect = MssqlDialect::new();
        let table = TableIdentifier::new("t").with_catalog("sales");
        assert_eq!(dialect.escape_table_name(&table), "sales..t");
        let table = table.with_schema("dbo");
        assert_eq!(dialect.escape_table_name(&table), "sales.dbo.t");
    }

    #[test]
    fn test_renames_use_sp_rename() {
        let dialect = MssqlDialect::new();
        assert_eq!(
            dialect
                .render(&Statement::RenameColumn(RenameColumnStatement {
                    table: "users".into(),
                    old_name: "mail".into(),
                    new_name: "email".into(),
                }))
                .unwrap(),
            vec!["EXEC sp_rename N'users.mail', N'email', 'COLUMN'"]
        );
    }

    #[test]
    fn test_remarks_use_extended_properties() {
        let statement = CreateTableBuilder::new("users")
            .column(ColumnDef::new("id", LogicalType::Integer).remarks("key"))
            .remarks("people")
            .build();
        let sql = MssqlDialect::new().render(&Statement::CreateTable(statement)).unwrap();
        assert_eq!(sql.len(), 3);
        assert!(sql[1].starts_with("EXEC sp_addextendedproperty @name = N'MS_Description', @value = N'people'"));
        assert!(sql[2].ends_with("@level2type = N'COLUMN', @level2name = N'id'"));
    }
}
