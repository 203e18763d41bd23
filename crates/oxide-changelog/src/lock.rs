//! Database-resident execution lock.
//!
//! A single row (`id = 1`) in the lock table says whether some process is
//! running changesets. Acquiring it is one conditional `UPDATE ... WHERE
//! locked = FALSE`; the database decides the winner, so two processes can
//! never both see an affected row count of 1.

use std::fmt;

use chrono::{DateTime, Utc};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use oxide_changelog_core::statement::{
    ColumnDef, Condition, CreateTableBuilder, InsertStatement, SelectStatement,
    TableExistsStatement, UpdateStatement,
};
use oxide_changelog_core::{LogicalType, SqlValue, Statement, TableIdentifier};

use crate::config::LockConfig;
use crate::error::{ChangelogError, Result};
use crate::executor::StatementExecutor;

const LOCK_ID: i64 = 1;

/// Who holds the lock.
#[derive(Clone, PartialEq, Eq)]
pub struct LockHolder {
    /// Identity written by the holder, usually `<hostname> (<pid>)`.
    pub locked_by: String,
    /// When the holder acquired it.
    pub granted_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for LockHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LockHolder({self})")
    }
}

impl fmt::Display for LockHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.granted_at {
            Some(granted) => write!(f, "{} since {}", self.locked_by, granted.to_rfc3339()),
            None => f.write_str(&self.locked_by),
        }
    }
}

/// Lock state as seen by this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockState {
    /// Nobody holds the lock.
    Unlocked,
    /// This service holds the lock.
    LockedBySelf,
    /// Someone else holds the lock.
    LockedByOther(LockHolder),
}

/// Acquires and releases the lock row.
#[derive(Debug, Clone)]
pub struct LockService {
    table: TableIdentifier,
    config: LockConfig,
    locked_by: String,
    held: bool,
}

impl LockService {
    /// Creates a lock service for `table`.
    pub fn new(table: impl Into<TableIdentifier>, config: LockConfig) -> Self {
        let locked_by = config.locked_by.clone().unwrap_or_else(default_identity);
        Self {
            table: table.into(),
            config,
            locked_by,
            held: false,
        }
    }

    /// The lock table.
    #[must_use]
    pub const fn table(&self) -> &TableIdentifier {
        &self.table
    }

    /// Identity written to the lock row.
    #[must_use]
    pub fn locked_by(&self) -> &str {
        &self.locked_by
    }

    /// Returns whether this service currently holds the lock.
    #[must_use]
    pub const fn has_lock(&self) -> bool {
        self.held
    }

    /// Definition of the lock table.
    #[must_use]
    pub fn create_table_statement(&self) -> Statement {
        CreateTableBuilder::new(self.table.clone())
            .column(ColumnDef::new("id", LogicalType::Integer).primary_key())
            .column(ColumnDef::new("locked", LogicalType::Boolean).not_null())
            .column(ColumnDef::new("lockgranted", LogicalType::Varchar(40)))
            .column(ColumnDef::new("lockedby", LogicalType::Varchar(255)))
            .build()
            .into()
    }

    /// Creates the lock table and its row if missing.
    ///
    /// Safe to race: a losing `CREATE` or `INSERT` is ignored as long as the
    /// table and row exist afterwards.
    pub async fn bootstrap(&self, executor: &mut StatementExecutor) -> Result<()> {
        if !self.table_exists(executor).await? {
            info!(table = %self.table, "Creating lock table");
            if let Err(e) = executor.execute(&self.create_table_statement()).await {
                if !self.table_exists(executor).await? {
                    return Err(e);
                }
                debug!(error = %e, "Lock table created concurrently");
            }
        }
        if !self.row_exists(executor).await? {
            let insert = InsertStatement::new(self.table.clone())
                .value("id", LOCK_ID)
                .value("locked", false);
            if let Err(e) = executor.execute(&insert.into()).await {
                if !self.row_exists(executor).await? {
                    return Err(e);
                }
                debug!(error = %e, "Lock row inserted concurrently");
            }
        }
        Ok(())
    }

    /// Makes one attempt at taking the lock.
    ///
    /// Fails with [`ChangelogError::LockContention`] when someone else holds
    /// it.
    pub async fn try_acquire(&mut self, executor: &mut StatementExecutor) -> Result<()> {
        if self.held {
            return Ok(());
        }
        self.bootstrap(executor).await?;
        let update = UpdateStatement::new(self.table.clone())
            .set("locked", true)
            .set("lockgranted", Utc::now().to_rfc3339())
            .set("lockedby", self.locked_by.as_str())
            .filter(Condition::eq("id", LOCK_ID))
            .filter(Condition::eq("locked", false));
        let affected = executor.execute(&update.into()).await?;
        match affected {
            1 => {
                self.held = true;
                info!(locked_by = %self.locked_by, "Acquired changelog lock");
                Ok(())
            }
            0 => {
                let holder = self.holder(executor).await?.unwrap_or_else(|| LockHolder {
                    locked_by: String::from("unknown"),
                    granted_at: None,
                });
                Err(ChangelogError::LockContention { holder })
            }
            n => Err(ChangelogError::InvalidState(format!(
                "lock update touched {n} rows in {}",
                self.table
            ))),
        }
    }

    /// Takes the lock, polling with exponential backoff until the configured
    /// wait timeout.
    pub async fn acquire(&mut self, executor: &mut StatementExecutor) -> Result<()> {
        let deadline = Instant::now() + self.config.wait_timeout;
        let mut interval = self.config.poll_interval;
        loop {
            match self.try_acquire(executor).await {
                Ok(()) => return Ok(()),
                Err(ChangelogError::LockContention { holder }) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(ChangelogError::LockTimeout {
                            holder: Some(holder),
                        });
                    }
                    info!(holder = %holder, "Waiting for changelog lock");
                    sleep(interval.min(deadline - now)).await;
                    interval = (interval * 2).min(self.config.max_poll_interval);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Releases the lock if this service holds it.
    pub async fn release(&mut self, executor: &mut StatementExecutor) -> Result<()> {
        if !self.held {
            return Ok(());
        }
        let update = Self::unlock_statement(&self.table)
            .filter(Condition::eq("lockedby", self.locked_by.as_str()));
        let affected = executor.execute(&update.into()).await?;
        self.held = false;
        if affected == 0 {
            warn!(locked_by = %self.locked_by, "Lock was no longer held at release");
        } else {
            info!(locked_by = %self.locked_by, "Released changelog lock");
        }
        Ok(())
    }

    /// Clears the lock whoever holds it. Administrative use only.
    pub async fn force_release(&mut self, executor: &mut StatementExecutor) -> Result<()> {
        if !self.table_exists(executor).await? {
            return Ok(());
        }
        executor.execute(&Self::unlock_statement(&self.table).into()).await?;
        self.held = false;
        warn!(table = %self.table, "Forcibly released changelog lock");
        Ok(())
    }

    /// Current holder, if the lock is taken.
    pub async fn holder(&self, executor: &mut StatementExecutor) -> Result<Option<LockHolder>> {
        if !self.table_exists(executor).await? {
            return Ok(None);
        }
        let query = SelectStatement::columns(self.table.clone(), ["locked", "lockgranted", "lockedby"])
            .filter(Condition::eq("id", LOCK_ID));
        let rows = executor.query_for_rows(&query.into()).await?;
        let Some(row) = rows.first() else {
            return Ok(None);
        };
        if !row.get_bool("locked").unwrap_or(false) {
            return Ok(None);
        }
        Ok(Some(LockHolder {
            locked_by: row.get_text("lockedby").unwrap_or_else(|| String::from("unknown")),
            granted_at: row
                .get_text("lockgranted")
                .and_then(|granted| DateTime::parse_from_rfc3339(&granted).ok())
                .map(|granted| granted.with_timezone(&Utc)),
        }))
    }

    /// Lock state from this service's point of view.
    pub async fn state(&self, executor: &mut StatementExecutor) -> Result<LockState> {
        Ok(match self.holder(executor).await? {
            None => LockState::Unlocked,
            Some(holder) if self.held && holder.locked_by == self.locked_by => LockState::LockedBySelf,
            Some(holder) => LockState::LockedByOther(holder),
        })
    }

    fn unlock_statement(table: &TableIdentifier) -> UpdateStatement {
        UpdateStatement::new(table.clone())
            .set("locked", false)
            .set("lockgranted", SqlValue::Null)
            .set("lockedby", SqlValue::Null)
            .filter(Condition::eq("id", LOCK_ID))
    }

    async fn table_exists(&self, executor: &mut StatementExecutor) -> Result<bool> {
        let statement = Statement::from(TableExistsStatement {
            table: self.table.clone(),
        });
        Ok(executor.query_for_long(&statement).await? > 0)
    }

    async fn row_exists(&self, executor: &mut StatementExecutor) -> Result<bool> {
        let query = SelectStatement::count(self.table.clone()).filter(Condition::eq("id", LOCK_ID));
        Ok(executor.query_for_long(&query.into()).await? > 0)
    }
}

/// `<hostname> (<pid>)`.
fn default_identity() -> String {
    let host = std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .ok()
        .filter(|h| !h.trim().is_empty())
        .unwrap_or_else(|| String::from("localhost"));
    format!("{host} ({})", std::process::id())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::connection::SqlxConnection;
    use oxide_changelog_core::dialect::SqliteDialect;

    async fn create_test_executor() -> StatementExecutor {
        let connection = SqlxConnection::connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory SQLite");
        StatementExecutor::new(Box::new(connection), Arc::new(SqliteDialect::new()))
    }

    fn service(name: &str) -> LockService {
        LockService::new(
            "oxide_changelog_lock",
            LockConfig::default()
                .locked_by(name)
                .wait_timeout(Duration::from_millis(200))
                .poll_interval(Duration::from_millis(20)),
        )
    }

    #[tokio::test]
    async fn test_acquire_and_release() {
        let mut executor = create_test_executor().await;
        let mut lock = service("first");

        assert_eq!(lock.state(&mut executor).await.unwrap(), LockState::Unlocked);
        lock.acquire(&mut executor).await.unwrap();
        assert!(lock.has_lock());
        assert_eq!(lock.state(&mut executor).await.unwrap(), LockState::LockedBySelf);

        let holder = lock.holder(&mut executor).await.unwrap().unwrap();
        assert_eq!(holder.locked_by, "first");
        assert!(holder.granted_at.is_some());

        lock.release(&mut executor).await.unwrap();
        assert!(!lock.has_lock());
        assert_eq!(lock.state(&mut executor).await.unwrap(), LockState::Unlocked);
    }

    #[tokio::test]
    async fn test_contention_and_timeout() {
        let mut executor = create_test_executor().await;
        let mut first = service("first");
        let mut second = service("second");

        first.acquire(&mut executor).await.unwrap();
        let err = second.try_acquire(&mut executor).await.unwrap_err();
        match &err {
            ChangelogError::LockContention { holder } => assert_eq!(holder.locked_by, "first"),
            other => panic!("Unexpected error: {other}"),
        }
        assert!(err.is_retryable());
        assert!(matches!(
            second.state(&mut executor).await.unwrap(),
            LockState::LockedByOther(_)
        ));

        let err = second.acquire(&mut executor).await.unwrap_err();
        assert!(matches!(err, ChangelogError::LockTimeout { holder: Some(_) }));
        assert!(err.to_string().contains("held by first"));

        // Release by a non-holder changes nothing
        second.release(&mut executor).await.unwrap();
        assert!(first.has_lock());
        assert!(lock_is_taken(&first, &mut executor).await);

        first.release(&mut executor).await.unwrap();
        second.acquire(&mut executor).await.unwrap();
        assert!(second.has_lock());
    }

    #[tokio::test]
    async fn test_force_release() {
        let mut executor = create_test_executor().await;
        let mut first = service("first");
        let mut admin = service("admin");

        first.acquire(&mut executor).await.unwrap();
        admin.force_release(&mut executor).await.unwrap();
        assert_eq!(admin.holder(&mut executor).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_bootstrap_twice() {
        let mut executor = create_test_executor().await;
        let lock = service("first");
        lock.bootstrap(&mut executor).await.unwrap();
        lock.bootstrap(&mut executor).await.unwrap();
        let count = Statement::from(SelectStatement::count("oxide_changelog_lock"));
        assert_eq!(executor.query_for_long(&count).await.unwrap(), 1);
    }

    #[test]
    fn test_default_identity_contains_pid() {
        assert!(default_identity().ends_with(&format!("({})", std::process::id())));
    }

    async fn lock_is_taken(lock: &LockService, executor: &mut StatementExecutor) -> bool {
        lock.holder(executor).await.unwrap().is_some()
    }
}
