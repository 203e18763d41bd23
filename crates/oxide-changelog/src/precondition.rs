//! Precondition evaluation against the live database.
//!
//! Evaluation distinguishes a condition that was checked and did not hold
//! ([`PreconditionResult::Fail`]) from one that could not be checked at all
//! ([`PreconditionResult::Error`]). Only the former is subject to the
//! changeset's on-fail policy.

use futures::future::BoxFuture;
use futures::FutureExt;

use oxide_changelog_core::statement::{
    ColumnExistsStatement, TableExistsStatement, TableRowCountStatement,
};
use oxide_changelog_core::{
    ChangesetKey, Precondition, Preconditions, SqlValue, Statement, ValidationError,
};

use crate::connection::Row;
use crate::error::ChangelogError;
use crate::executor::StatementExecutor;
use crate::history::{ExecType, TrackingStore};

/// Outcome of checking a precondition.
#[derive(Debug)]
pub enum PreconditionResult {
    /// The condition holds.
    Pass,
    /// The condition was evaluated and does not hold.
    Fail(String),
    /// The condition could not be evaluated.
    Error(ChangelogError),
}

impl PreconditionResult {
    /// True for [`PreconditionResult::Pass`].
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl From<ChangelogError> for PreconditionResult {
    fn from(error: ChangelogError) -> Self {
        Self::Error(error)
    }
}

/// Evaluates preconditions through a [`StatementExecutor`].
#[derive(Debug, Clone)]
pub struct PreconditionEvaluator<'a> {
    tracking: &'a TrackingStore,
}

impl<'a> PreconditionEvaluator<'a> {
    /// Creates an evaluator. `tracking` answers `ChangesetExecuted` checks.
    #[must_use]
    pub const fn new(tracking: &'a TrackingStore) -> Self {
        Self { tracking }
    }

    /// Structural validation. Touches no database.
    #[must_use]
    pub fn validate(preconditions: &Preconditions) -> Vec<ValidationError> {
        preconditions.validate()
    }

    /// Checks every condition in order; all must pass.
    ///
    /// A failure message is replaced by `on_fail_message` when one is set.
    pub async fn check(
        &self,
        executor: &mut StatementExecutor,
        preconditions: &Preconditions,
    ) -> PreconditionResult {
        for condition in &preconditions.conditions {
            match self.check_one(executor, condition).await {
                PreconditionResult::Pass => {}
                PreconditionResult::Fail(message) => {
                    return PreconditionResult::Fail(
                        preconditions.on_fail_message.clone().unwrap_or(message),
                    );
                }
                error @ PreconditionResult::Error(_) => return error,
            }
        }
        PreconditionResult::Pass
    }

    /// Checks a single condition.
    pub fn check_one<'e>(
        &'e self,
        executor: &'e mut StatementExecutor,
        condition: &'e Precondition,
    ) -> BoxFuture<'e, PreconditionResult> {
        async move {
            match condition {
                Precondition::TableExists { table } => {
                    let exists = Statement::from(TableExistsStatement {
                        table: table.clone(),
                    });
                    match executor.query_for_long(&exists).await {
                        Ok(count) if count > 0 => PreconditionResult::Pass,
                        Ok(_) => PreconditionResult::Fail(format!("Table {table} does not exist")),
                        Err(e) => e.into(),
                    }
                }
                Precondition::ColumnExists { table, column } => {
                    let exists = Statement::from(ColumnExistsStatement {
                        table: table.clone(),
                        column: column.clone(),
                    });
                    match executor.query_for_long(&exists).await {
                        Ok(count) if count > 0 => PreconditionResult::Pass,
                        Ok(_) => PreconditionResult::Fail(format!(
                            "Column {table}.{column} does not exist"
                        )),
                        Err(e) => e.into(),
                    }
                }
                Precondition::RowCount {
                    table,
                    expected_rows,
                } => {
                    let Some(expected) = *expected_rows else {
                        return PreconditionResult::Error(ChangelogError::InvalidState(
                            String::from("rowCount precondition has no expected row count"),
                        ));
                    };
                    let count = Statement::from(TableRowCountStatement {
                        table: table.clone(),
                    });
                    match executor.query_for_long(&count).await {
                        Ok(actual) if actual == expected => PreconditionResult::Pass,
                        Ok(actual) => PreconditionResult::Fail(format!(
                            "Table {table} does not have the expected row count of {expected}. It contains {actual} rows"
                        )),
                        Err(e) => e.into(),
                    }
                }
                Precondition::RunningAs { username } => match &executor.metadata().username {
                    Some(actual) if actual.eq_ignore_ascii_case(username.trim()) => {
                        PreconditionResult::Pass
                    }
                    Some(actual) => PreconditionResult::Fail(format!(
                        "RunningAs precondition failed: expected {username}, was {actual}"
                    )),
                    None => ChangelogError::InvalidState(String::from(
                        "the connection does not report a user name",
                    ))
                    .into(),
                },
                Precondition::Dbms { dbms } => {
                    let short_name = executor.dialect().short_name();
                    if dbms_matches(dbms, short_name) {
                        PreconditionResult::Pass
                    } else {
                        PreconditionResult::Fail(format!(
                            "DBMS precondition failed: expected {dbms}, got {short_name}"
                        ))
                    }
                }
                Precondition::SqlCheck {
                    sql,
                    expected_result,
                } => match executor.query_sql(sql).await {
                    Ok(rows) => {
                        let actual = rows.first().and_then(Row::first).and_then(SqlValue::as_text);
                        match actual {
                            Some(actual) if actual.trim() == expected_result.trim() => {
                                PreconditionResult::Pass
                            }
                            Some(actual) => PreconditionResult::Fail(format!(
                                "SQL precondition failed: expected '{expected_result}', got '{actual}'"
                            )),
                            None => PreconditionResult::Fail(format!(
                                "SQL precondition failed: expected '{expected_result}', got no value"
                            )),
                        }
                    }
                    Err(e) => e.into(),
                },
                Precondition::ChangesetExecuted { id, author, path } => {
                    let key = ChangesetKey::new(id, author, path);
                    match self.executed(executor, &key).await {
                        Ok(true) => PreconditionResult::Pass,
                        Ok(false) => {
                            PreconditionResult::Fail(format!("Changeset {key} has not been executed"))
                        }
                        Err(e) => e.into(),
                    }
                }
                Precondition::And { conditions } => {
                    for nested in conditions {
                        match self.check_one(executor, nested).await {
                            PreconditionResult::Pass => {}
                            other => return other,
                        }
                    }
                    PreconditionResult::Pass
                }
                Precondition::Or { conditions } => {
                    let mut failures = Vec::new();
                    for nested in conditions {
                        match self.check_one(executor, nested).await {
                            PreconditionResult::Pass => return PreconditionResult::Pass,
                            PreconditionResult::Fail(message) => failures.push(message),
                            error @ PreconditionResult::Error(_) => return error,
                        }
                    }
                    PreconditionResult::Fail(format!(
                        "No alternative held: {}",
                        failures.join("; ")
                    ))
                }
                Precondition::Not { conditions } => {
                    for nested in conditions {
                        match self.check_one(executor, nested).await {
                            PreconditionResult::Pass => {
                                return PreconditionResult::Fail(format!(
                                    "Not precondition failed: {} holds",
                                    nested.name()
                                ));
                            }
                            PreconditionResult::Fail(_) => {}
                            error @ PreconditionResult::Error(_) => return error,
                        }
                    }
                    PreconditionResult::Pass
                }
            }
        }
        .boxed()
    }

    async fn executed(
        &self,
        executor: &mut StatementExecutor,
        key: &ChangesetKey,
    ) -> crate::error::Result<bool> {
        if !self.tracking.exists(executor).await? {
            return Ok(false);
        }
        Ok(self
            .tracking
            .records_for(executor, key)
            .await?
            .is_some_and(|record| record.exec_type != ExecType::Failed))
    }
}

/// Comma-separated dialect list; `!name` excludes, `all` matches anything.
fn dbms_matches(list: &str, short_name: &str) -> bool {
    let mut included = false;
    let mut any_included = false;
    for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        if let Some(excluded) = entry.strip_prefix('!') {
            if excluded.trim().eq_ignore_ascii_case(short_name) {
                return false;
            }
        } else {
            any_included = true;
            included |= entry.eq_ignore_ascii_case("all") || entry.eq_ignore_ascii_case(short_name);
        }
    }
    included || !any_included
}
