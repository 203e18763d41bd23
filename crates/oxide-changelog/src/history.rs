//! Change tracking.
//!
//! This module manages the tracking table that records which changesets
//! have been applied to the database. Every read and write goes through the
//! [`StatementExecutor`]; nothing is cached between calls.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use oxide_changelog_core::statement::{
    ColumnDef, Condition, CreateTableBuilder, InsertStatement, SelectStatement,
    TableExistsStatement, UpdateStatement,
};
use oxide_changelog_core::{
    ChangesetKey, CheckSum, ChecksumVersion, LogicalType, SqlValue, Statement, TableIdentifier,
};

use crate::connection::Row;
use crate::error::{ChangelogError, Result};
use crate::executor::StatementExecutor;

/// Version written to the `tool_version` column.
pub const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

const COLUMNS: [&str; 14] = [
    "id",
    "author",
    "filename",
    "dateexecuted",
    "orderexecuted",
    "exectype",
    "checksum",
    "checksum_version",
    "description",
    "comments",
    "contexts",
    "deployment_id",
    "deployed_by",
    "tool_version",
];

const DESCRIPTION_LIMIT: usize = 255;

/// How a changeset came to be recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecType {
    /// Statements ran for the first time.
    Executed,
    /// Statements ran again (`run_always` / `run_on_change`).
    Reran,
    /// Recorded without running its statements.
    MarkRan,
    /// Attempted and failed. Never treated as applied.
    Failed,
}

impl ExecType {
    /// Value stored in the `exectype` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Executed => "EXECUTED",
            Self::Reran => "RERAN",
            Self::MarkRan => "MARK_RAN",
            Self::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ExecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecType {
    type Err = ChangelogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EXECUTED" => Ok(Self::Executed),
            "RERAN" => Ok(Self::Reran),
            "MARK_RAN" => Ok(Self::MarkRan),
            "FAILED" => Ok(Self::Failed),
            other => Err(ChangelogError::InvalidState(format!(
                "unknown execution type '{other}'"
            ))),
        }
    }
}

/// One row of the tracking table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingRecord {
    /// Changeset identity.
    pub key: ChangesetKey,
    /// When it was recorded.
    pub date_executed: DateTime<Utc>,
    /// Position in the global execution order, starting at 1.
    pub order_executed: i64,
    /// How it was recorded.
    pub exec_type: ExecType,
    /// Checksum at the time of execution. `None` after `clear_checksums`.
    pub checksum: Option<CheckSum>,
    /// Statement summary.
    pub description: String,
    /// Changeset comment.
    pub comments: Option<String>,
    /// Contexts the changeset was tagged with.
    pub contexts: Option<String>,
    /// Identifier shared by every record of one run.
    pub deployment_id: Option<String>,
    /// Who applied it.
    pub deployed_by: Option<String>,
    /// Version of this tool.
    pub tool_version: Option<String>,
}

/// Manages the tracking table.
#[derive(Debug, Clone)]
pub struct TrackingStore {
    table: TableIdentifier,
}

impl TrackingStore {
    /// Creates a store for `table`.
    pub fn new(table: impl Into<TableIdentifier>) -> Self {
        Self {
            table: table.into(),
        }
    }

    /// The tracking table.
    #[must_use]
    pub const fn table(&self) -> &TableIdentifier {
        &self.table
    }

    /// Definition of the tracking table.
    #[must_use]
    pub fn create_table_statement(&self) -> Statement {
        CreateTableBuilder::new(self.table.clone())
            .column(ColumnDef::new("id", LogicalType::Varchar(255)).not_null())
            .column(ColumnDef::new("author", LogicalType::Varchar(255)).not_null())
            .column(ColumnDef::new("filename", LogicalType::Varchar(255)).not_null())
            .column(ColumnDef::new("dateexecuted", LogicalType::Varchar(40)).not_null())
            .column(ColumnDef::new("orderexecuted", LogicalType::Integer).not_null())
            .column(ColumnDef::new("exectype", LogicalType::Varchar(10)).not_null())
            .column(ColumnDef::new("checksum", LogicalType::Varchar(80)))
            .column(ColumnDef::new("checksum_version", LogicalType::Integer))
            .column(ColumnDef::new("description", LogicalType::Varchar(255)))
            .column(ColumnDef::new("comments", LogicalType::Varchar(255)))
            .column(ColumnDef::new("contexts", LogicalType::Varchar(255)))
            .column(ColumnDef::new("deployment_id", LogicalType::Varchar(20)))
            .column(ColumnDef::new("deployed_by", LogicalType::Varchar(255)))
            .column(ColumnDef::new("tool_version", LogicalType::Varchar(20)))
            .build()
            .into()
    }

    /// Checks whether the tracking table exists.
    pub async fn exists(&self, executor: &mut StatementExecutor) -> Result<bool> {
        let statement = Statement::from(TableExistsStatement {
            table: self.table.clone(),
        });
        Ok(executor.query_for_long(&statement).await? > 0)
    }

    /// Creates the tracking table if it is missing.
    ///
    /// Callers hold the lock, so no other process creates it concurrently.
    pub async fn bootstrap(&self, executor: &mut StatementExecutor) -> Result<()> {
        if self.exists(executor).await? {
            return Ok(());
        }
        info!(table = %self.table, "Creating tracking table");
        executor.execute(&self.create_table_statement()).await?;
        Ok(())
    }

    /// The current record for a changeset: the latest row that is not
    /// `FAILED`.
    pub async fn records_for(
        &self,
        executor: &mut StatementExecutor,
        key: &ChangesetKey,
    ) -> Result<Option<TrackingRecord>> {
        let query = SelectStatement::columns(self.table.clone(), COLUMNS)
            .filter(Condition::eq("id", key.id.as_str()))
            .filter(Condition::eq("author", key.author.as_str()))
            .filter(Condition::eq("filename", key.path.as_str()))
            .filter(Condition::not_eq("exectype", ExecType::Failed.as_str()))
            .order_by("orderexecuted", true);
        let rows = executor.query_for_rows(&query.into()).await?;
        rows.first().map(parse_record).transpose()
    }

    /// Every record in execution order.
    pub async fn all_records(&self, executor: &mut StatementExecutor) -> Result<Vec<TrackingRecord>> {
        let query =
            SelectStatement::columns(self.table.clone(), COLUMNS).order_by("orderexecuted", false);
        let rows = executor.query_for_rows(&query.into()).await?;
        rows.iter().map(parse_record).collect()
    }

    /// Highest `orderexecuted` so far, 0 for an empty table.
    pub async fn max_order(&self, executor: &mut StatementExecutor) -> Result<i64> {
        let query = SelectStatement::max(self.table.clone(), "orderexecuted");
        executor.query_for_long(&query.into()).await
    }

    /// Appends a record.
    pub async fn append(&self, executor: &mut StatementExecutor, record: &TrackingRecord) -> Result<()> {
        let insert = InsertStatement::new(self.table.clone())
            .value("id", record.key.id.as_str())
            .value("author", record.key.author.as_str())
            .value("filename", record.key.path.as_str())
            .value("dateexecuted", record.date_executed.to_rfc3339())
            .value("orderexecuted", record.order_executed)
            .value("exectype", record.exec_type.as_str())
            .value("checksum", record.checksum.as_ref().map(ToString::to_string))
            .value(
                "checksum_version",
                record.checksum.as_ref().map(|c| i64::from(c.version().number())),
            )
            .value("description", truncate(&record.description))
            .value("comments", record.comments.as_deref().map(truncate))
            .value("contexts", record.contexts.clone())
            .value("deployment_id", record.deployment_id.clone())
            .value("deployed_by", record.deployed_by.clone())
            .value("tool_version", record.tool_version.clone());
        debug!(changeset = %record.key, exec_type = %record.exec_type, "Recording changeset");
        executor.execute(&insert.into()).await?;
        Ok(())
    }

    /// Replaces the stored checksum of a changeset.
    pub async fn update_checksum(
        &self,
        executor: &mut StatementExecutor,
        key: &ChangesetKey,
        checksum: &CheckSum,
    ) -> Result<()> {
        let update = UpdateStatement::new(self.table.clone())
            .set("checksum", checksum.to_string())
            .set("checksum_version", i64::from(checksum.version().number()))
            .filter(Condition::eq("id", key.id.as_str()))
            .filter(Condition::eq("author", key.author.as_str()))
            .filter(Condition::eq("filename", key.path.as_str()));
        executor.execute(&update.into()).await?;
        Ok(())
    }

    /// Sets every stored checksum to NULL. The next run recomputes them.
    pub async fn clear_checksums(&self, executor: &mut StatementExecutor) -> Result<u64> {
        let update = UpdateStatement::new(self.table.clone())
            .set("checksum", SqlValue::Null)
            .set("checksum_version", SqlValue::Null);
        executor.execute(&update.into()).await
    }
}

fn truncate(value: &str) -> String {
    value.chars().take(DESCRIPTION_LIMIT).collect()
}

fn parse_date(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            // Rows written by hand or by other tools
            chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .map(|dt| dt.and_utc())
                .unwrap_or_else(|_| Utc::now())
        })
}

fn parse_record(row: &Row) -> Result<TrackingRecord> {
    let required = |column: &str| {
        row.get_text(column).ok_or_else(|| {
            ChangelogError::InvalidState(format!("tracking row is missing `{column}`"))
        })
    };
    let version = row
        .get_i64("checksum_version")
        .and_then(ChecksumVersion::from_number);
    let checksum = row
        .get_text("checksum")
        .and_then(|stored| CheckSum::parse_stored(&stored, version));

    Ok(TrackingRecord {
        key: ChangesetKey::new(required("id")?, required("author")?, required("filename")?),
        date_executed: parse_date(&required("dateexecuted")?),
        order_executed: row.get_i64("orderexecuted").unwrap_or_default(),
        exec_type: required("exectype")?.parse()?,
        checksum,
        description: row.get_text("description").unwrap_or_default(),
        comments: row.get_text("comments"),
        contexts: row.get_text("contexts"),
        deployment_id: row.get_text("deployment_id"),
        deployed_by: row.get_text("deployed_by"),
        tool_version: row.get_text("tool_version"),
    })
}
