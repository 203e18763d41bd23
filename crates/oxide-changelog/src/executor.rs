//! Statement executor.
//!
//! The executor is the only place SQL reaches the database. It renders
//! statements with the selected dialect, runs them on the owned connection
//! and wraps driver failures with the SQL text and the changeset being
//! applied. It never retries.

use std::sync::Arc;

use tracing::debug;

use oxide_changelog_core::{ChangesetKey, ConnectionMetadata, Dialect, SqlValue, Statement};

use crate::connection::{Connection, DriverError, Row};
use crate::error::{ChangelogError, Result};

/// Runs statements against one connection with one dialect.
pub struct StatementExecutor {
    connection: Box<dyn Connection>,
    dialect: Arc<dyn Dialect>,
    changeset: Option<ChangesetKey>,
    dry_run: bool,
    captured: Vec<String>,
}

impl std::fmt::Debug for StatementExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementExecutor")
            .field("dialect", &self.dialect.short_name())
            .field("changeset", &self.changeset)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl StatementExecutor {
    /// Creates an executor owning `connection`.
    pub fn new(connection: Box<dyn Connection>, dialect: Arc<dyn Dialect>) -> Self {
        Self {
            connection,
            dialect,
            changeset: None,
            dry_run: false,
            captured: Vec::new(),
        }
    }

    /// The dialect statements are rendered with.
    #[must_use]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Metadata of the underlying connection.
    #[must_use]
    pub fn metadata(&self) -> &ConnectionMetadata {
        self.connection.metadata()
    }

    /// Sets the changeset reported in errors raised from now on.
    pub fn set_changeset(&mut self, changeset: Option<ChangesetKey>) {
        self.changeset = changeset;
    }

    /// Enables or disables dry-run mode.
    ///
    /// In dry-run mode writes are captured instead of executed. Queries still
    /// reach the database.
    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.dry_run = dry_run;
    }

    /// Returns whether writes are being captured.
    #[must_use]
    pub const fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// SQL captured in dry-run mode.
    #[must_use]
    pub fn captured_sql(&self) -> &[String] {
        &self.captured
    }

    /// Drains the captured SQL.
    pub fn take_captured(&mut self) -> Vec<String> {
        std::mem::take(&mut self.captured)
    }

    /// Adds a comment line to the captured SQL. No-op outside dry-run mode.
    pub fn comment(&mut self, text: &str) {
        if self.dry_run {
            let prefix = self.dialect.line_comment();
            self.captured.push(format!("{prefix}{text}"));
        }
    }

    /// Renders a statement with the dialect.
    pub fn render(&self, statement: &Statement) -> Result<Vec<String>> {
        self.dialect
            .render(statement)
            .map_err(|source| match &self.changeset {
                Some(changeset) => ChangelogError::UnsupportedCapability {
                    changeset: changeset.clone(),
                    source,
                },
                None => ChangelogError::Dialect(source),
            })
    }

    /// Renders and executes a statement. Returns the affected row count.
    pub async fn execute(&mut self, statement: &Statement) -> Result<u64> {
        let mut affected = 0;
        for sql in self.render(statement)? {
            affected += self.execute_sql(&sql).await?;
        }
        Ok(affected)
    }

    /// Executes literal SQL.
    pub async fn execute_sql(&mut self, sql: &str) -> Result<u64> {
        if self.dry_run {
            debug!(sql = %sql, "Captured");
            self.captured.push(format!("{};", sql.trim_end_matches(';')));
            return Ok(0);
        }
        debug!(sql = %sql, "Executing");
        match self.connection.execute(sql).await {
            Ok(affected) => Ok(affected),
            Err(source) => Err(self.execution_error(sql, source)),
        }
    }

    /// Renders a query and returns every row.
    pub async fn query_for_rows(&mut self, statement: &Statement) -> Result<Vec<Row>> {
        let mut rendered = self.render(statement)?;
        let sql = match (rendered.pop(), rendered.is_empty()) {
            (Some(sql), true) => sql,
            _ => {
                return Err(ChangelogError::UnexpectedResult {
                    sql: statement.description(),
                    message: String::from("a query must render to exactly one SQL statement"),
                })
            }
        };
        self.query_sql(&sql).await
    }

    /// Runs literal SQL as a query.
    pub async fn query_sql(&mut self, sql: &str) -> Result<Vec<Row>> {
        debug!(sql = %sql, "Querying");
        match self.connection.query(sql).await {
            Ok(rows) => Ok(rows),
            Err(source) => Err(self.execution_error(sql, source)),
        }
    }

    /// Runs a query expected to return one integer. NULL and no rows are 0.
    pub async fn query_for_long(&mut self, statement: &Statement) -> Result<i64> {
        let rows = self.query_for_rows(statement).await?;
        let Some(value) = rows.first().and_then(Row::first) else {
            return Ok(0);
        };
        if value.is_null() {
            return Ok(0);
        }
        value.as_i64().ok_or_else(|| ChangelogError::UnexpectedResult {
            sql: statement.description(),
            message: format!("expected an integer, got {value}"),
        })
    }

    /// Like [`query_for_long`](Self::query_for_long) but the value must fit
    /// in an `i32`.
    pub async fn query_for_int(&mut self, statement: &Statement) -> Result<i32> {
        let value = self.query_for_long(statement).await?;
        i32::try_from(value).map_err(|_| ChangelogError::UnexpectedResult {
            sql: statement.description(),
            message: format!("{value} does not fit in a 32-bit integer"),
        })
    }

    /// Runs a query and returns the first column of the first row as text.
    pub async fn query_for_text(&mut self, statement: &Statement) -> Result<Option<String>> {
        let rows = self.query_for_rows(statement).await?;
        Ok(rows.first().and_then(Row::first).and_then(SqlValue::as_text))
    }

    /// Turns foreign key checks off for the session.
    ///
    /// Returns whether checks were on before, so callers can restore them.
    /// Dialects without session-level checks report `false` and do nothing.
    pub async fn disable_foreign_key_checks(&mut self) -> Result<bool> {
        let (Some(query), Some(disable)) = (
            self.dialect.foreign_key_checks_query(),
            self.dialect.set_foreign_key_checks(false),
        ) else {
            return Ok(false);
        };
        let rows = self.query_sql(&query).await?;
        let enabled = rows
            .first()
            .and_then(Row::first)
            .and_then(SqlValue::as_bool)
            .unwrap_or(false);
        self.execute_sql(&disable).await?;
        Ok(enabled)
    }

    /// Turns foreign key checks on for the session.
    pub async fn enable_foreign_key_checks(&mut self) -> Result<()> {
        if let Some(enable) = self.dialect.set_foreign_key_checks(true) {
            self.execute_sql(&enable).await?;
        }
        Ok(())
    }

    /// Releases the connection.
    #[must_use]
    pub fn into_connection(self) -> Box<dyn Connection> {
        self.connection
    }

    fn execution_error(&self, sql: &str, source: DriverError) -> ChangelogError {
        ChangelogError::DatabaseExecution {
            changeset: self.changeset.clone(),
            sql: sql.to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::SqlxConnection;
    use oxide_changelog_core::dialect::SqliteDialect;
    use oxide_changelog_core::statement::{
        ColumnDef, CreateTableBuilder, CreateSequenceStatement, InsertStatement, SelectStatement,
        TableRowCountStatement,
    };
    use oxide_changelog_core::types::LogicalType;

    async fn create_test_executor() -> StatementExecutor {
        let connection = SqlxConnection::connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory SQLite");
        StatementExecutor::new(Box::new(connection), Arc::new(SqliteDialect::new()))
    }

    fn items_table() -> Statement {
        CreateTableBuilder::new("items")
            .column(ColumnDef::new("id", LogicalType::Integer).primary_key())
            .column(ColumnDef::new("label", LogicalType::Varchar(50)))
            .build()
            .into()
    }

    #[tokio::test]
    async fn test_execute_and_count() {
        let mut executor = create_test_executor().await;
        executor.execute(&items_table()).await.unwrap();
        for id in 1..=3 {
            let insert = InsertStatement::new("items").value("id", id).value("label", "x");
            assert_eq!(executor.execute(&insert.into()).await.unwrap(), 1);
        }

        let count = Statement::from(TableRowCountStatement {
            table: "items".into(),
        });
        assert_eq!(executor.query_for_long(&count).await.unwrap(), 3);
        assert_eq!(executor.query_for_int(&count).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_max_of_empty_table_is_zero() {
        let mut executor = create_test_executor().await;
        executor.execute(&items_table()).await.unwrap();
        let max = Statement::from(SelectStatement::max("items", "id"));
        assert_eq!(executor.query_for_long(&max).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_execution_error_carries_sql_and_changeset() {
        let mut executor = create_test_executor().await;
        executor.set_changeset(Some(ChangesetKey::new("7", "bob", "log.json")));
        let err = executor
            .execute(&Statement::raw("INSERT INTO missing VALUES (1)"))
            .await
            .unwrap_err();
        match err {
            ChangelogError::DatabaseExecution { changeset, sql, .. } => {
                assert_eq!(changeset.unwrap().to_string(), "log.json::7::bob");
                assert_eq!(sql, "INSERT INTO missing VALUES (1)");
            }
            other => panic!("Unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_unsupported_statement_names_changeset() {
        let mut executor = create_test_executor().await;
        executor.set_changeset(Some(ChangesetKey::new("1", "a", "log.json")));
        let err = executor
            .execute(&CreateSequenceStatement::new("seq").into())
            .await
            .unwrap_err();
        assert!(matches!(err, ChangelogError::UnsupportedCapability { .. }));
        assert!(err.to_string().contains("log.json::1::a"));
    }

    #[tokio::test]
    async fn test_dry_run_captures_writes() {
        let mut executor = create_test_executor().await;
        executor.set_dry_run(true);
        executor.comment("Changeset log.json::1::a");
        executor.execute(&items_table()).await.unwrap();
        assert_eq!(executor.captured_sql().len(), 2);
        assert_eq!(executor.captured_sql()[0], "-- Changeset log.json::1::a");
        assert!(executor.captured_sql()[1].starts_with("CREATE TABLE items"));

        let exists = executor
            .query_sql("SELECT COUNT(*) FROM sqlite_master WHERE name = 'items'")
            .await
            .unwrap();
        assert_eq!(exists[0].first(), Some(&SqlValue::Integer(0)));
        assert_eq!(executor.take_captured().len(), 2);
        assert!(executor.captured_sql().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_key_checks_round_trip() {
        let mut executor = create_test_executor().await;
        executor.enable_foreign_key_checks().await.unwrap();
        assert!(executor.disable_foreign_key_checks().await.unwrap());
        assert!(!executor.disable_foreign_key_checks().await.unwrap());
        executor.enable_foreign_key_checks().await.unwrap();
        assert!(executor.disable_foreign_key_checks().await.unwrap());
    }
}
