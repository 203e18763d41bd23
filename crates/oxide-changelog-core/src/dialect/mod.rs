//! Dialect capability providers.
//!
//! Each supported database product implements [`Dialect`]: it identifies
//! itself from connection metadata, answers capability questions, quotes
//! identifiers and literals, maps logical types to native types and renders
//! every [`Statement`] kind to SQL text.
//!
//! Rendering is a pure function of (statement, dialect). The default method
//! bodies produce ANSI-flavoured SQL; dialects override only the hooks where
//! their syntax differs. A statement the dialect cannot express, and cannot
//! safely rewrite, fails with [`DialectError::Unsupported`].

mod duckdb;
mod h2;
mod mariadb;
mod mssql;
mod mysql;
mod oracle;
mod postgres;
mod registry;
pub mod reserved;
mod sqlite;
mod xugu;

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

pub use duckdb::DuckDbDialect;
pub use h2::H2Dialect;
pub use mariadb::MariaDbDialect;
pub use mssql::MssqlDialect;
pub use mysql::MySqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use registry::DialectRegistry;
pub use sqlite::SqliteDialect;
pub use xugu::XuguDialect;

use crate::error::DialectError;
use crate::identifier::{ObjectKind, TableIdentifier};
use crate::statement::{
    AddColumnStatement, AddForeignKeyStatement, AutoIncrement, ColumnDef, ColumnExistsStatement,
    Condition, CreateIndexStatement, CreateSequenceStatement, CreateTableStatement,
    DeleteStatement, DropColumnStatement, DropForeignKeyStatement, DropIndexStatement,
    DropSequenceStatement, DropTableStatement, ForeignKeyConstraint, GenerationType,
    InsertStatement, ModifyDataTypeStatement, PrimaryKeyConstraint, Projection, RawSqlStatement,
    RenameColumnStatement, RenameTableStatement, SelectStatement, SetNullableStatement, Statement,
    TableExistsStatement, TableRowCountStatement, UniqueConstraint, UpdateStatement,
};
use crate::types::LogicalType;
use crate::value::SqlValue;

/// Extracts the `3` in `CURRENT_TIMESTAMP(3)`.
static PRECISION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+)\)").expect("precision pattern is valid"));

/// Product identification of a live connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionMetadata {
    /// Product name as reported by the driver (`PostgreSQL`, `MySQL`, ...).
    pub product_name: String,
    /// Product version string.
    pub product_version: String,
    /// Authenticated user, when the driver can tell.
    pub username: Option<String>,
    /// Connection URL.
    pub url: Option<String>,
}

impl ConnectionMetadata {
    /// Creates metadata for a product and version.
    pub fn new(product_name: impl Into<String>, product_version: impl Into<String>) -> Self {
        Self {
            product_name: product_name.into(),
            product_version: product_version.into(),
            username: None,
            url: None,
        }
    }

    /// Sets the authenticated user.
    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Sets the connection URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// When identifiers get quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuotingStrategy {
    /// Quote reserved words and names with characters outside `[A-Za-z0-9_]`.
    #[default]
    Legacy,
    /// Quote every object name.
    QuoteAll,
    /// Quote reserved words only.
    QuoteReservedOnly,
}

/// True when `name` consists of ASCII letters, digits and underscores only.
#[must_use]
pub fn is_simple_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Fractional-second precision embedded in a function call, 0 when absent.
#[must_use]
pub fn extract_precision(expression: &str) -> u32 {
    PRECISION_PATTERN
        .captures(expression)
        .and_then(|captures| captures[1].parse().ok())
        .unwrap_or(0)
}

/// True when `expression` asks for the current date and time.
#[must_use]
pub fn is_current_timestamp_function(expression: &str) -> bool {
    let lowered = expression.trim().to_ascii_lowercase();
    [
        "current_timestamp",
        "current_datetime",
        "localtimestamp",
        "systimestamp",
        "sysdate",
        "now(",
        "getdate(",
    ]
    .iter()
    .any(|prefix| lowered.starts_with(prefix))
}

/// `GENERATED ... AS IDENTITY (START WITH s INCREMENT BY i)`, with the
/// parameter list only when a value differs from its default.
#[must_use]
pub fn identity_clause(settings: &AutoIncrement, supports_on_null: bool) -> String {
    let mut clause = match settings.generation_type.unwrap_or_default() {
        GenerationType::Always => String::from("GENERATED ALWAYS"),
        GenerationType::ByDefault => String::from("GENERATED BY DEFAULT"),
    };
    if supports_on_null && settings.default_on_null {
        clause.push_str(" ON NULL");
    }
    clause.push_str(" AS IDENTITY");

    let mut parameters = Vec::new();
    if let Some(start) = settings.explicit_start() {
        parameters.push(format!("START WITH {start}"));
    }
    if let Some(increment) = settings.explicit_increment() {
        parameters.push(format!("INCREMENT BY {increment}"));
    }
    if !parameters.is_empty() {
        clause.push_str(&format!(" ({})", parameters.join(" ")));
    }
    clause
}

/// `KEYWORD` or `KEYWORD(start,increment)` when either value is explicit.
#[must_use]
pub fn keyword_with_seed(keyword: &str, settings: &AutoIncrement, separator: &str) -> String {
    if settings.has_explicit_parameters() {
        format!(
            "{keyword}({}{separator}{})",
            settings.start_with.unwrap_or(1),
            settings.increment_by.unwrap_or(1)
        )
    } else {
        keyword.to_string()
    }
}

/// Standard SQL spelling of a logical type.
#[must_use]
pub fn ansi_type(data_type: &LogicalType) -> String {
    match data_type {
        LogicalType::Boolean => String::from("BOOLEAN"),
        LogicalType::SmallInt => String::from("SMALLINT"),
        LogicalType::Integer => String::from("INTEGER"),
        LogicalType::BigInt => String::from("BIGINT"),
        LogicalType::Decimal(p, s) => format!("DECIMAL({p}, {s})"),
        LogicalType::Real => String::from("REAL"),
        LogicalType::Double => String::from("DOUBLE PRECISION"),
        LogicalType::Char(n) => format!("CHAR({n})"),
        LogicalType::Varchar(n) => format!("VARCHAR({n})"),
        LogicalType::Text => String::from("TEXT"),
        LogicalType::Date => String::from("DATE"),
        LogicalType::Time => String::from("TIME"),
        LogicalType::Timestamp(None) => String::from("TIMESTAMP"),
        LogicalType::Timestamp(Some(p)) => format!("TIMESTAMP({p})"),
        LogicalType::TimestampTz(None) => String::from("TIMESTAMP WITH TIME ZONE"),
        LogicalType::TimestampTz(Some(p)) => format!("TIMESTAMP({p}) WITH TIME ZONE"),
        LogicalType::Blob => String::from("BLOB"),
        LogicalType::Uuid => String::from("UUID"),
        LogicalType::Json => String::from("JSON"),
        LogicalType::Custom(native) => native.clone(),
    }
}

/// Assembles a column definition from its parts:
/// `name TYPE [DEFAULT x] [auto-increment] [NOT NULL] [UNIQUE] [comment]`.
pub fn column_definition_sql<D: Dialect + ?Sized>(
    dialect: &D,
    column: &ColumnDef,
    in_primary_key: bool,
    auto_increment: Option<&str>,
) -> String {
    let mut sql = format!(
        "{} {}",
        dialect.quote_identifier(&column.name, ObjectKind::Column),
        dialect.map_type(&column.data_type)
    );
    if let Some(default) = &column.default {
        sql.push_str(" DEFAULT ");
        sql.push_str(&dialect.value_literal(default));
    }
    if let Some(clause) = auto_increment {
        sql.push(' ');
        sql.push_str(clause);
    }
    if !column.nullable || in_primary_key {
        sql.push_str(" NOT NULL");
    }
    if column.unique && !in_primary_key {
        sql.push_str(" UNIQUE");
    }
    if let Some(remarks) = &column.remarks {
        sql.push_str(&dialect.inline_column_remarks(remarks));
    }
    sql
}

/// A database product's SQL syntax and capability profile.
pub trait Dialect: fmt::Debug + Send + Sync {
    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    /// Short name used in configuration and `dbms` filters.
    fn short_name(&self) -> &'static str;

    /// Product name as drivers report it.
    fn product_name(&self) -> &'static str;

    /// Default TCP port.
    fn default_port(&self) -> Option<u16> {
        None
    }

    /// Driver class conventionally used for a connection URL.
    fn default_driver(&self, _url: &str) -> Option<&'static str> {
        None
    }

    /// Whether this provider is the right one for a live connection.
    fn identify(&self, metadata: &ConnectionMetadata) -> bool {
        metadata
            .product_name
            .trim()
            .eq_ignore_ascii_case(self.product_name())
    }

    /// Error for a capability this dialect lacks.
    fn unsupported(&self, capability: &str) -> DialectError {
        DialectError::Unsupported {
            dialect: self.short_name(),
            capability: capability.to_string(),
        }
    }

    // ------------------------------------------------------------------
    // Capabilities
    // ------------------------------------------------------------------

    fn supports_sequences(&self) -> bool {
        true
    }

    fn supports_initially_deferrable_columns(&self) -> bool {
        false
    }

    fn supports_tablespaces(&self) -> bool {
        false
    }

    /// `CREATE TABLE IF NOT EXISTS`.
    fn supports_if_not_exists(&self) -> bool {
        true
    }

    /// `CREATE INDEX IF NOT EXISTS`.
    fn supports_create_index_if_not_exists(&self) -> bool {
        self.supports_if_not_exists()
    }

    /// `DROP TABLE IF EXISTS`.
    fn supports_drop_if_exists(&self) -> bool {
        true
    }

    fn supports_schemas(&self) -> bool {
        true
    }

    /// Whether DDL participates in transactions instead of committing
    /// implicitly.
    fn supports_ddl_in_transactions(&self) -> bool {
        false
    }

    /// `ALTER TABLE ... ADD/DROP CONSTRAINT`.
    fn supports_alter_constraints(&self) -> bool {
        true
    }

    /// `ON UPDATE` referential actions on foreign keys.
    fn supports_on_update_action(&self) -> bool {
        true
    }

    /// Session-level toggling of foreign key enforcement.
    fn supports_foreign_key_checks(&self) -> bool {
        self.foreign_key_checks_query().is_some()
    }

    // ------------------------------------------------------------------
    // Identifiers
    // ------------------------------------------------------------------

    fn quoting_strategy(&self) -> QuotingStrategy;

    /// Opening and closing quote characters.
    fn quote_characters(&self) -> (char, char) {
        ('"', '"')
    }

    fn is_reserved_word(&self, word: &str) -> bool {
        reserved::is_reserved(self.short_name(), word)
    }

    /// The conditional quoting rule.
    fn must_quote(&self, name: &str, _kind: ObjectKind) -> bool {
        if name.contains('(') {
            return false;
        }
        match self.quoting_strategy() {
            QuotingStrategy::QuoteAll => true,
            QuotingStrategy::QuoteReservedOnly => self.is_reserved_word(name),
            QuotingStrategy::Legacy => self.is_reserved_word(name) || !is_simple_identifier(name),
        }
    }

    fn quote_identifier(&self, name: &str, kind: ObjectKind) -> String {
        if !self.must_quote(name, kind) {
            return name.to_string();
        }
        let (open, close) = self.quote_characters();
        let escaped = name.replace(close, &format!("{close}{close}"));
        format!("{open}{escaped}{close}")
    }

    /// Joins the qualifying parts that this dialect uses with `name`.
    fn qualify(
        &self,
        _catalog: Option<&str>,
        schema: Option<&str>,
        name: &str,
        kind: ObjectKind,
    ) -> String {
        let name = self.quote_identifier(name, kind);
        match schema.filter(|s| !s.is_empty() && self.supports_schemas()) {
            Some(schema) => format!("{}.{name}", self.quote_identifier(schema, ObjectKind::Schema)),
            None => name,
        }
    }

    fn escape_table_name(&self, table: &TableIdentifier) -> String {
        self.qualify(
            table.catalog_name(),
            table.schema_name(),
            &table.table,
            ObjectKind::Table,
        )
    }

    /// Index name as written in CREATE INDEX.
    fn escape_index_name(&self, name: &str, _table: &TableIdentifier) -> String {
        self.quote_identifier(name, ObjectKind::Index)
    }

    fn escape_sequence_name(&self, schema: Option<&str>, name: &str) -> String {
        self.qualify(None, schema, name, ObjectKind::Sequence)
    }

    /// Comma separated, quoted column list.
    fn column_list(&self, columns: &[String]) -> String {
        columns
            .iter()
            .map(|c| self.quote_identifier(c, ObjectKind::Column))
            .collect::<Vec<_>>()
            .join(", ")
    }

    // ------------------------------------------------------------------
    // Literals
    // ------------------------------------------------------------------

    /// Escapes the content of a string literal (without the quotes).
    fn escape_string(&self, value: &str) -> String {
        value.replace('\'', "''")
    }

    fn string_literal(&self, value: &str) -> String {
        format!("'{}'", self.escape_string(value))
    }

    fn boolean_literal(&self, value: bool) -> &'static str {
        if value {
            "TRUE"
        } else {
            "FALSE"
        }
    }

    fn value_literal(&self, value: &SqlValue) -> String {
        match value {
            SqlValue::Null => String::from("NULL"),
            SqlValue::Boolean(b) => self.boolean_literal(*b).to_string(),
            SqlValue::Integer(i) => i.to_string(),
            SqlValue::Float(f) => f.to_string(),
            SqlValue::Text(t) => self.string_literal(t),
            SqlValue::Function(f) => self.function_value(f),
        }
    }

    /// Renders a function call value; current-timestamp calls are
    /// translated, anything else passes through.
    fn function_value(&self, function: &str) -> String {
        if is_current_timestamp_function(function) {
            self.format_current_timestamp(function)
        } else {
            function.to_string()
        }
    }

    fn line_comment(&self) -> &'static str {
        "-- "
    }

    /// String concatenation expression.
    fn concat(&self, values: &[&str]) -> String {
        values.join(" || ")
    }

    // ------------------------------------------------------------------
    // Timestamps
    // ------------------------------------------------------------------

    /// The current timestamp at `precision` fractional digits; 0 selects the
    /// dialect's plain form.
    fn current_timestamp_call(&self, precision: u32) -> String;

    /// Re-emits a current-timestamp expression in this dialect's calling
    /// convention. Expressions with an `on update` clause pass through.
    fn format_current_timestamp(&self, expression: &str) -> String {
        if expression.to_ascii_lowercase().contains("on update") {
            return expression.to_string();
        }
        self.current_timestamp_call(extract_precision(expression))
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    fn map_type(&self, data_type: &LogicalType) -> String {
        ansi_type(data_type)
    }

    // ------------------------------------------------------------------
    // Auto increment
    // ------------------------------------------------------------------

    /// Column clause making a column auto-increment.
    ///
    /// # Errors
    ///
    /// Fails when the settings cannot be expressed.
    fn auto_increment_clause(
        &self,
        _table: &TableIdentifier,
        _column: &str,
        settings: &AutoIncrement,
    ) -> Result<String, DialectError> {
        Ok(identity_clause(settings, false))
    }

    // ------------------------------------------------------------------
    // Foreign key checks
    // ------------------------------------------------------------------

    /// Query returning 1 while foreign keys are enforced.
    fn foreign_key_checks_query(&self) -> Option<String> {
        None
    }

    /// Statement enabling or disabling foreign key enforcement.
    fn set_foreign_key_checks(&self, _enabled: bool) -> Option<String> {
        None
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Renders a statement into one or more SQL statements.
    ///
    /// # Errors
    ///
    /// Fails with [`DialectError::Unsupported`] when the statement needs a
    /// capability this dialect lacks.
    fn render(&self, statement: &Statement) -> Result<Vec<String>, DialectError> {
        match statement {
            Statement::CreateTable(s) => self.create_table(s),
            Statement::DropTable(s) => self.drop_table(s),
            Statement::RenameTable(s) => self.rename_table(s),
            Statement::AddColumn(s) => self.add_column(s),
            Statement::DropColumn(s) => self.drop_column(s),
            Statement::RenameColumn(s) => self.rename_column(s),
            Statement::ModifyDataType(s) => self.modify_data_type(s),
            Statement::SetNullable(s) => self.set_nullable(s),
            Statement::CreateIndex(s) => self.create_index(s),
            Statement::DropIndex(s) => self.drop_index(s),
            Statement::AddForeignKey(s) => self.add_foreign_key(s),
            Statement::DropForeignKey(s) => self.drop_foreign_key(s),
            Statement::CreateSequence(s) => self.create_sequence(s),
            Statement::DropSequence(s) => self.drop_sequence(s),
            Statement::Insert(s) => Ok(vec![self.insert(s)]),
            Statement::Update(s) => Ok(vec![self.update(s)]),
            Statement::Delete(s) => Ok(vec![self.delete(s)]),
            Statement::Select(s) => Ok(vec![self.select(s)]),
            Statement::TableRowCount(s) => Ok(vec![self.table_row_count(s)]),
            Statement::TableExists(s) => Ok(vec![self.table_exists(s)]),
            Statement::ColumnExists(s) => Ok(vec![self.column_exists(s)]),
            Statement::RawSql(s) => Ok(vec![self.raw_sql(s)]),
        }
    }

    /// CREATE TABLE plus any statements it needs around it.
    fn create_table(&self, statement: &CreateTableStatement) -> Result<Vec<String>, DialectError> {
        let mut statements = Vec::new();
        for column in &statement.columns {
            statements.extend(self.pre_column_statements(&statement.table, column)?);
        }

        let primary_key = statement.effective_primary_key();
        let mut definitions = Vec::new();
        for column in &statement.columns {
            definitions.push(self.column_definition(
                &statement.table,
                column,
                primary_key.as_ref(),
            )?);
        }
        if let Some(pk) = primary_key
            .as_ref()
            .filter(|pk| !self.primary_key_is_inline(statement, pk))
        {
            definitions.push(self.primary_key_clause(pk));
        }
        for unique in &statement.unique_constraints {
            definitions.push(self.unique_clause(unique));
        }
        for foreign_key in &statement.foreign_keys {
            definitions.push(self.foreign_key_clause(foreign_key)?);
        }

        let guarded = statement.if_not_exists && !self.supports_if_not_exists();
        let mut sql = String::from("CREATE TABLE ");
        if statement.if_not_exists && self.supports_if_not_exists() {
            sql.push_str("IF NOT EXISTS ");
        }
        sql.push_str(&self.escape_table_name(&statement.table));
        sql.push_str(" (\n");
        sql.push_str(
            &definitions
                .iter()
                .map(|d| format!("    {d}"))
                .collect::<Vec<_>>()
                .join(",\n"),
        );
        sql.push_str("\n)");
        if let Some(tablespace) = statement
            .tablespace
            .as_deref()
            .filter(|_| self.supports_tablespaces())
        {
            sql.push_str(&self.tablespace_clause(tablespace));
        }
        sql.push_str(&self.table_options(statement)?);
        if guarded {
            sql = self.guard_create_table(&statement.table, sql)?;
        }
        statements.push(sql);
        statements.extend(self.remarks_statements(statement));
        Ok(statements)
    }

    /// One column definition inside CREATE TABLE or ADD COLUMN.
    fn column_definition(
        &self,
        table: &TableIdentifier,
        column: &ColumnDef,
        primary_key: Option<&PrimaryKeyConstraint>,
    ) -> Result<String, DialectError> {
        let auto_increment = column
            .auto_increment
            .as_ref()
            .map(|settings| self.auto_increment_clause(table, &column.name, settings))
            .transpose()?;
        let in_primary_key = primary_key.is_some_and(|pk| pk.columns.contains(&column.name));
        Ok(column_definition_sql(
            self,
            column,
            in_primary_key,
            auto_increment.as_deref(),
        ))
    }

    /// Statements that must run before a column can be defined.
    fn pre_column_statements(
        &self,
        _table: &TableIdentifier,
        _column: &ColumnDef,
    ) -> Result<Vec<String>, DialectError> {
        Ok(Vec::new())
    }

    /// Statements that must run after a column was added to a table.
    fn post_column_statements(
        &self,
        _table: &TableIdentifier,
        _column: &ColumnDef,
    ) -> Result<Vec<String>, DialectError> {
        Ok(Vec::new())
    }

    /// Whether the primary key was already written in a column definition.
    fn primary_key_is_inline(
        &self,
        _statement: &CreateTableStatement,
        _primary_key: &PrimaryKeyConstraint,
    ) -> bool {
        false
    }

    fn primary_key_clause(&self, primary_key: &PrimaryKeyConstraint) -> String {
        let mut sql = String::new();
        if let Some(name) = &primary_key.name {
            sql.push_str(&format!(
                "CONSTRAINT {} ",
                self.quote_identifier(name, ObjectKind::Constraint)
            ));
        }
        sql.push_str(&format!("PRIMARY KEY ({})", self.column_list(&primary_key.columns)));
        sql
    }

    fn unique_clause(&self, unique: &UniqueConstraint) -> String {
        let mut sql = String::new();
        if let Some(name) = &unique.name {
            sql.push_str(&format!(
                "CONSTRAINT {} ",
                self.quote_identifier(name, ObjectKind::Constraint)
            ));
        }
        sql.push_str(&format!("UNIQUE ({})", self.column_list(&unique.columns)));
        sql
    }

    fn foreign_key_clause(&self, foreign_key: &ForeignKeyConstraint) -> Result<String, DialectError> {
        let mut sql = String::new();
        if let Some(name) = &foreign_key.name {
            sql.push_str(&format!(
                "CONSTRAINT {} ",
                self.quote_identifier(name, ObjectKind::Constraint)
            ));
        }
        sql.push_str(&format!(
            "FOREIGN KEY ({}) REFERENCES {} ({})",
            self.column_list(&foreign_key.columns),
            self.escape_table_name(&foreign_key.referenced_table),
            self.column_list(&foreign_key.referenced_columns)
        ));
        if let Some(action) = foreign_key.on_delete {
            sql.push_str(" ON DELETE ");
            sql.push_str(action.as_sql());
        }
        if let Some(action) = foreign_key.on_update {
            if !self.supports_on_update_action() {
                return Err(self.unsupported("ON UPDATE referential actions"));
            }
            sql.push_str(" ON UPDATE ");
            sql.push_str(action.as_sql());
        }
        if foreign_key.deferrable {
            if !self.supports_initially_deferrable_columns() {
                return Err(self.unsupported("deferrable constraints"));
            }
            sql.push_str(" DEFERRABLE");
            if foreign_key.initially_deferred {
                sql.push_str(" INITIALLY DEFERRED");
            }
        }
        Ok(sql)
    }

    fn tablespace_clause(&self, tablespace: &str) -> String {
        format!(" TABLESPACE {}", self.quote_identifier(tablespace, ObjectKind::Schema))
    }

    /// Text appended after the closing parenthesis of CREATE TABLE.
    fn table_options(&self, _statement: &CreateTableStatement) -> Result<String, DialectError> {
        Ok(String::new())
    }

    /// Wraps CREATE TABLE in an existence guard for dialects without
    /// `IF NOT EXISTS`.
    fn guard_create_table(&self, _table: &TableIdentifier, _sql: String) -> Result<String, DialectError> {
        Err(self.unsupported("CREATE TABLE IF NOT EXISTS"))
    }

    /// Table and column comments issued after CREATE TABLE.
    fn remarks_statements(&self, statement: &CreateTableStatement) -> Vec<String> {
        let mut statements = Vec::new();
        if let Some(remarks) = &statement.remarks {
            statements.push(format!(
                "COMMENT ON TABLE {} IS {}",
                self.escape_table_name(&statement.table),
                self.string_literal(remarks)
            ));
        }
        for column in &statement.columns {
            statements.extend(self.column_remarks_statement(&statement.table, column));
        }
        statements
    }

    fn column_remarks_statement(&self, table: &TableIdentifier, column: &ColumnDef) -> Option<String> {
        column.remarks.as_ref().map(|remarks| {
            format!(
                "COMMENT ON COLUMN {}.{} IS {}",
                self.escape_table_name(table),
                self.quote_identifier(&column.name, ObjectKind::Column),
                self.string_literal(remarks)
            )
        })
    }

    /// Column comment written inside the column definition.
    fn inline_column_remarks(&self, _remarks: &str) -> String {
        String::new()
    }

    fn drop_table(&self, statement: &DropTableStatement) -> Result<Vec<String>, DialectError> {
        let mut sql = String::from("DROP TABLE ");
        if statement.if_exists {
            if !self.supports_drop_if_exists() {
                return Err(self.unsupported("DROP TABLE IF EXISTS"));
            }
            sql.push_str("IF EXISTS ");
        }
        sql.push_str(&self.escape_table_name(&statement.table));
        if statement.cascade_constraints {
            let cascade = self
                .cascade_clause()
                .ok_or_else(|| self.unsupported("DROP TABLE with cascading constraints"))?;
            sql.push(' ');
            sql.push_str(cascade);
        }
        Ok(vec![sql])
    }

    /// Suffix of DROP TABLE that also drops dependent constraints.
    fn cascade_clause(&self) -> Option<&'static str> {
        Some("CASCADE")
    }

    fn rename_table(&self, statement: &RenameTableStatement) -> Result<Vec<String>, DialectError> {
        Ok(vec![format!(
            "ALTER TABLE {} RENAME TO {}",
            self.escape_table_name(&statement.table),
            self.quote_identifier(&statement.new_name, ObjectKind::Table)
        )])
    }

    /// Keyword between the table name and the column definition.
    fn add_column_keyword(&self) -> &'static str {
        "ADD COLUMN"
    }

    fn add_column(&self, statement: &AddColumnStatement) -> Result<Vec<String>, DialectError> {
        let mut statements = self.pre_column_statements(&statement.table, &statement.column)?;
        statements.push(format!(
            "ALTER TABLE {} {} {}",
            self.escape_table_name(&statement.table),
            self.add_column_keyword(),
            self.column_definition(&statement.table, &statement.column, None)?
        ));
        if statement.column.primary_key {
            if !self.supports_alter_constraints() {
                return Err(self.unsupported("adding a primary key to an existing table"));
            }
            statements.push(format!(
                "ALTER TABLE {} ADD {}",
                self.escape_table_name(&statement.table),
                self.primary_key_clause(&PrimaryKeyConstraint::new([statement.column.name.as_str()]))
            ));
        }
        statements.extend(self.post_column_statements(&statement.table, &statement.column)?);
        statements.extend(self.column_remarks_statement(&statement.table, &statement.column));
        Ok(statements)
    }

    fn drop_column(&self, statement: &DropColumnStatement) -> Result<Vec<String>, DialectError> {
        Ok(vec![format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.escape_table_name(&statement.table),
            self.quote_identifier(&statement.column, ObjectKind::Column)
        )])
    }

    fn rename_column(&self, statement: &RenameColumnStatement) -> Result<Vec<String>, DialectError> {
        Ok(vec![format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            self.escape_table_name(&statement.table),
            self.quote_identifier(&statement.old_name, ObjectKind::Column),
            self.quote_identifier(&statement.new_name, ObjectKind::Column)
        )])
    }

    fn modify_data_type(&self, statement: &ModifyDataTypeStatement) -> Result<Vec<String>, DialectError> {
        Ok(vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} TYPE {}",
            self.escape_table_name(&statement.table),
            self.quote_identifier(&statement.column, ObjectKind::Column),
            self.map_type(&statement.new_type)
        )])
    }

    fn set_nullable(&self, statement: &SetNullableStatement) -> Result<Vec<String>, DialectError> {
        let action = if statement.nullable {
            "DROP NOT NULL"
        } else {
            "SET NOT NULL"
        };
        Ok(vec![format!(
            "ALTER TABLE {} ALTER COLUMN {} {action}",
            self.escape_table_name(&statement.table),
            self.quote_identifier(&statement.column, ObjectKind::Column)
        )])
    }

    fn create_index(&self, statement: &CreateIndexStatement) -> Result<Vec<String>, DialectError> {
        let guarded = statement.if_not_exists && !self.supports_create_index_if_not_exists();
        let mut sql = String::from("CREATE ");
        if statement.unique {
            sql.push_str("UNIQUE ");
        }
        sql.push_str("INDEX ");
        if statement.if_not_exists && self.supports_create_index_if_not_exists() {
            sql.push_str("IF NOT EXISTS ");
        }
        sql.push_str(&format!(
            "{} ON {} ({})",
            self.escape_index_name(&statement.name, &statement.table),
            self.escape_table_name(&statement.table),
            self.column_list(&statement.columns)
        ));
        if let Some(tablespace) = statement
            .tablespace
            .as_deref()
            .filter(|_| self.supports_tablespaces())
        {
            sql.push_str(&self.tablespace_clause(tablespace));
        }
        if guarded {
            sql = self.guard_create_index(statement, sql)?;
        }
        Ok(vec![sql])
    }

    /// Wraps CREATE INDEX in an existence guard for dialects without
    /// `IF NOT EXISTS`.
    fn guard_create_index(&self, _statement: &CreateIndexStatement, _sql: String) -> Result<String, DialectError> {
        Err(self.unsupported("CREATE INDEX IF NOT EXISTS"))
    }

    fn drop_index(&self, statement: &DropIndexStatement) -> Result<Vec<String>, DialectError> {
        Ok(vec![format!(
            "DROP INDEX {}",
            self.qualify(
                statement.table.catalog_name(),
                statement.table.schema_name(),
                &statement.name,
                ObjectKind::Index
            )
        )])
    }

    fn add_foreign_key(&self, statement: &AddForeignKeyStatement) -> Result<Vec<String>, DialectError> {
        if !self.supports_alter_constraints() {
            return Err(self.unsupported("adding foreign keys to an existing table"));
        }
        Ok(vec![format!(
            "ALTER TABLE {} ADD {}",
            self.escape_table_name(&statement.table),
            self.foreign_key_clause(&statement.constraint)?
        )])
    }

    fn drop_foreign_key(&self, statement: &DropForeignKeyStatement) -> Result<Vec<String>, DialectError> {
        if !self.supports_alter_constraints() {
            return Err(self.unsupported("dropping foreign keys"));
        }
        Ok(vec![format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            self.escape_table_name(&statement.table),
            self.quote_identifier(&statement.name, ObjectKind::Constraint)
        )])
    }

    fn create_sequence(&self, statement: &CreateSequenceStatement) -> Result<Vec<String>, DialectError> {
        if !self.supports_sequences() {
            return Err(self.unsupported("sequences"));
        }
        let mut sql = format!(
            "CREATE SEQUENCE {}",
            self.escape_sequence_name(statement.schema.as_deref(), &statement.name)
        );
        if let Some(start) = statement.start_with {
            sql.push_str(&format!(" START WITH {start}"));
        }
        if let Some(increment) = statement.increment_by {
            sql.push_str(&format!(" INCREMENT BY {increment}"));
        }
        if let Some(min) = statement.min_value {
            sql.push_str(&format!(" MINVALUE {min}"));
        }
        if let Some(max) = statement.max_value {
            sql.push_str(&format!(" MAXVALUE {max}"));
        }
        if statement.cycle {
            sql.push_str(" CYCLE");
        }
        Ok(vec![sql])
    }

    fn drop_sequence(&self, statement: &DropSequenceStatement) -> Result<Vec<String>, DialectError> {
        if !self.supports_sequences() {
            return Err(self.unsupported("sequences"));
        }
        Ok(vec![format!(
            "DROP SEQUENCE {}",
            self.escape_sequence_name(statement.schema.as_deref(), &statement.name)
        )])
    }

    fn insert(&self, statement: &InsertStatement) -> String {
        let columns: Vec<String> = statement.values.iter().map(|v| v.column.clone()).collect();
        let values: Vec<String> = statement
            .values
            .iter()
            .map(|v| self.value_literal(&v.value))
            .collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.escape_table_name(&statement.table),
            self.column_list(&columns),
            values.join(", ")
        )
    }

    fn update(&self, statement: &UpdateStatement) -> String {
        let assignments: Vec<String> = statement
            .set
            .iter()
            .map(|v| {
                format!(
                    "{} = {}",
                    self.quote_identifier(&v.column, ObjectKind::Column),
                    self.value_literal(&v.value)
                )
            })
            .collect();
        format!(
            "UPDATE {} SET {}{}",
            self.escape_table_name(&statement.table),
            assignments.join(", "),
            self.where_clause(&statement.conditions)
        )
    }

    fn delete(&self, statement: &DeleteStatement) -> String {
        format!(
            "DELETE FROM {}{}",
            self.escape_table_name(&statement.table),
            self.where_clause(&statement.conditions)
        )
    }

    fn select(&self, statement: &SelectStatement) -> String {
        let projection = match &statement.projection {
            Projection::Columns(columns) => self.column_list(columns),
            Projection::Count => String::from("COUNT(*)"),
            Projection::Max(column) => {
                format!("MAX({})", self.quote_identifier(column, ObjectKind::Column))
            }
        };
        let mut sql = format!(
            "SELECT {projection} FROM {}{}",
            self.escape_table_name(&statement.table),
            self.where_clause(&statement.conditions)
        );
        if !statement.order_by.is_empty() {
            let terms: Vec<String> = statement
                .order_by
                .iter()
                .map(|o| {
                    let column = self.quote_identifier(&o.column, ObjectKind::Column);
                    if o.descending {
                        format!("{column} DESC")
                    } else {
                        format!("{column} ASC")
                    }
                })
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&terms.join(", "));
        }
        sql
    }

    /// ` WHERE a = 1 AND b IS NULL`, or nothing.
    fn where_clause(&self, conditions: &[Condition]) -> String {
        if conditions.is_empty() {
            return String::new();
        }
        let terms: Vec<String> = conditions
            .iter()
            .map(|condition| match condition {
                Condition::Eq { column, value } => format!(
                    "{} = {}",
                    self.quote_identifier(column, ObjectKind::Column),
                    self.value_literal(value)
                ),
                Condition::NotEq { column, value } => format!(
                    "{} <> {}",
                    self.quote_identifier(column, ObjectKind::Column),
                    self.value_literal(value)
                ),
                Condition::IsNull { column } => format!(
                    "{} IS NULL",
                    self.quote_identifier(column, ObjectKind::Column)
                ),
            })
            .collect();
        format!(" WHERE {}", terms.join(" AND "))
    }

    fn table_row_count(&self, statement: &TableRowCountStatement) -> String {
        format!("SELECT COUNT(*) FROM {}", self.escape_table_name(&statement.table))
    }

    /// Expression yielding the connection's current schema.
    fn current_schema_expression(&self) -> Option<&'static str> {
        None
    }

    /// Schema filter for catalog queries against `information_schema`.
    fn information_schema_filter(&self, table: &TableIdentifier) -> String {
        match table.schema_name() {
            Some(schema) => format!(
                " AND LOWER(table_schema) = LOWER({})",
                self.string_literal(schema)
            ),
            None => self
                .current_schema_expression()
                .map(|expression| format!(" AND table_schema = {expression}"))
                .unwrap_or_default(),
        }
    }

    fn table_exists(&self, statement: &TableExistsStatement) -> String {
        format!(
            "SELECT COUNT(*) FROM information_schema.tables WHERE LOWER(table_name) = LOWER({}){}",
            self.string_literal(&statement.table.table),
            self.information_schema_filter(&statement.table)
        )
    }

    fn column_exists(&self, statement: &ColumnExistsStatement) -> String {
        format!(
            "SELECT COUNT(*) FROM information_schema.columns WHERE LOWER(table_name) = LOWER({}) AND LOWER(column_name) = LOWER({}){}",
            self.string_literal(&statement.table.table),
            self.string_literal(&statement.column),
            self.information_schema_filter(&statement.table)
        )
    }

    fn raw_sql(&self, statement: &RawSqlStatement) -> String {
        statement.trimmed().to_string()
    }
}
