//! Live database connections.
//!
//! The engine talks to the database through the [`Connection`] trait so the
//! executor does not care which driver sits underneath. [`SqlxConnection`]
//! is the production implementation on top of `sqlx`'s `Any` driver.

use async_trait::async_trait;
use sqlx::AnyConnection;
use sqlx::{Column as _, Connection as _, Row as _, ValueRef as _};
use tracing::debug;

use oxide_changelog_core::{ConnectionMetadata, SqlValue};

use crate::error::Result;

/// Error raised by a driver. Kept opaque so any backend fits.
pub type DriverError = Box<dyn std::error::Error + Send + Sync>;

/// A result row. Column names are stored upper-cased.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, SqlValue)>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Appends a column.
    pub fn push(&mut self, name: &str, value: SqlValue) {
        self.columns.push((name.to_ascii_uppercase(), value));
    }

    /// Looks a column up by name, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.columns
            .iter()
            .find(|(column, _)| column.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Text value of a column. NULL and missing columns are `None`.
    #[must_use]
    pub fn get_text(&self, name: &str) -> Option<String> {
        self.get(name).and_then(SqlValue::as_text)
    }

    /// Integer value of a column.
    #[must_use]
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(SqlValue::as_i64)
    }

    /// Boolean value of a column.
    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(SqlValue::as_bool)
    }

    /// The first column's value.
    #[must_use]
    pub fn first(&self) -> Option<&SqlValue> {
        self.columns.first().map(|(_, value)| value)
    }

    /// Column names in result order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// An open connection to the target database.
#[async_trait]
pub trait Connection: Send {
    /// Runs a statement and returns the number of affected rows.
    async fn execute(&mut self, sql: &str) -> std::result::Result<u64, DriverError>;

    /// Runs a query and returns every row.
    async fn query(&mut self, sql: &str) -> std::result::Result<Vec<Row>, DriverError>;

    /// Product identification of the connected database.
    fn metadata(&self) -> &ConnectionMetadata;
}

/// [`Connection`] over `sqlx::AnyConnection` (SQLite, PostgreSQL, MySQL).
pub struct SqlxConnection {
    inner: AnyConnection,
    metadata: ConnectionMetadata,
}

impl std::fmt::Debug for SqlxConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlxConnection")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl SqlxConnection {
    /// Connects to `url` and probes product name, version and user.
    pub async fn connect(url: &str) -> Result<Self> {
        sqlx::any::install_default_drivers();
        let inner = AnyConnection::connect(url).await?;
        let product = product_name(inner.backend_name());
        let mut connection = Self {
            inner,
            metadata: ConnectionMetadata::new(product, "").with_url(redact_url(url)),
        };
        connection.metadata.product_version = connection.probe_version().await;
        connection.metadata.username = connection.probe_user().await;
        debug!(
            product = %connection.metadata.product_name,
            version = %connection.metadata.product_version,
            "Connected"
        );
        Ok(connection)
    }

    /// Closes the underlying connection.
    pub async fn close(self) -> Result<()> {
        self.inner.close().await?;
        Ok(())
    }

    async fn probe_version(&mut self) -> String {
        let sql = match self.metadata.product_name.as_str() {
            "SQLite" => "SELECT sqlite_version()",
            "PostgreSQL" => "SELECT current_setting('server_version')",
            _ => "SELECT VERSION()",
        };
        self.scalar_text(sql).await.unwrap_or_default()
    }

    async fn probe_user(&mut self) -> Option<String> {
        match self.metadata.product_name.as_str() {
            "SQLite" => None,
            "MySQL" => self.scalar_text("SELECT CURRENT_USER()").await.map(|user| {
                user.split_once('@')
                    .map_or_else(|| user.clone(), |(name, _)| name.to_string())
            }),
            _ => self.scalar_text("SELECT CAST(CURRENT_USER AS TEXT)").await,
        }
    }

    async fn scalar_text(&mut self, sql: &str) -> Option<String> {
        match self.query(sql).await {
            Ok(rows) => rows.first().and_then(Row::first).and_then(SqlValue::as_text),
            Err(e) => {
                debug!(sql = %sql, error = %e, "Metadata probe failed");
                None
            }
        }
    }
}

#[async_trait]
impl Connection for SqlxConnection {
    async fn execute(&mut self, sql: &str) -> std::result::Result<u64, DriverError> {
        let result = sqlx::Executor::execute(&mut self.inner, sql).await?;
        Ok(result.rows_affected())
    }

    async fn query(&mut self, sql: &str) -> std::result::Result<Vec<Row>, DriverError> {
        let conn = &mut self.inner;
        let rows = sqlx::query(sql).fetch_all(conn).await?;
        let mut result = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut decoded = Row::new();
            for (index, column) in row.columns().iter().enumerate() {
                decoded.push(column.name(), decode_value(row, index)?);
            }
            result.push(decoded);
        }
        Ok(result)
    }

    fn metadata(&self) -> &ConnectionMetadata {
        &self.metadata
    }
}

fn decode_value(row: &sqlx::any::AnyRow, index: usize) -> std::result::Result<SqlValue, DriverError> {
    if row.try_get_raw(index)?.is_null() {
        return Ok(SqlValue::Null);
    }
    if let Ok(value) = row.try_get::<i64, _>(index) {
        return Ok(SqlValue::Integer(value));
    }
    if let Ok(value) = row.try_get::<f64, _>(index) {
        return Ok(SqlValue::Float(value));
    }
    if let Ok(value) = row.try_get::<String, _>(index) {
        return Ok(SqlValue::Text(value));
    }
    if let Ok(value) = row.try_get::<bool, _>(index) {
        return Ok(SqlValue::Boolean(value));
    }
    if let Ok(value) = row.try_get::<Vec<u8>, _>(index) {
        return Ok(SqlValue::Text(String::from_utf8_lossy(&value).into_owned()));
    }
    Err(format!("column {index} has a type that cannot be decoded").into())
}

fn product_name(backend: &str) -> &'static str {
    match backend.to_ascii_lowercase().as_str() {
        "sqlite" => "SQLite",
        "postgresql" | "postgres" => "PostgreSQL",
        "mysql" => "MySQL",
        _ => "Unknown",
    }
}

/// Strips the password from a connection URL.
fn redact_url(url: &str) -> String {
    let Some((scheme, rest)) = url.split_once("://") else {
        return url.to_string();
    };
    let Some((credentials, host)) = rest.split_once('@') else {
        return url.to_string();
    };
    let user = credentials.split_once(':').map_or(credentials, |(user, _)| user);
    format!("{scheme}://{user}@{host}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_lookup_ignores_case() {
        let mut row = Row::new();
        row.push("Locked", SqlValue::Integer(1));
        row.push("lockedby", SqlValue::Text("host".into()));
        assert_eq!(row.column_names().collect::<Vec<_>>(), ["LOCKED", "LOCKEDBY"]);
        assert_eq!(row.get_bool("locked"), Some(true));
        assert_eq!(row.get_text("LOCKEDBY").as_deref(), Some("host"));
        assert_eq!(row.get_i64("missing"), None);
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn test_redact_url() {
        assert_eq!(
            redact_url("postgres://app:secret@db:5432/main"),
            "postgres://app@db:5432/main"
        );
        assert_eq!(redact_url("sqlite::memory:"), "sqlite::memory:");
    }

    #[tokio::test]
    async fn test_sqlite_connection() {
        let mut connection = SqlxConnection::connect("sqlite::memory:").await.unwrap();
        assert_eq!(connection.metadata().product_name, "SQLite");
        assert!(!connection.metadata().product_version.is_empty());

        connection
            .execute("CREATE TABLE t (id INTEGER, name TEXT, score REAL)")
            .await
            .unwrap();
        let inserted = connection
            .execute("INSERT INTO t VALUES (1, 'a', 1.5), (2, NULL, NULL)")
            .await
            .unwrap();
        assert_eq!(inserted, 2);

        let rows = connection.query("SELECT id, name, score FROM t ORDER BY id").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get_i64("id"), Some(1));
        assert_eq!(rows[0].get_text("name").as_deref(), Some("a"));
        assert_eq!(rows[0].get("score"), Some(&SqlValue::Float(1.5)));
        assert_eq!(rows[1].get("name"), Some(&SqlValue::Null));
    }
}
