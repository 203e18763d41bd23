//! Changeset execution engine.
//!
//! The engine walks a changeset sequence in order under the database lock.
//! For each changeset it consults the tracking table, decides whether the
//! changeset is pending, already ran, must re-run or was modified, gates it
//! on its preconditions, executes its statements and records the result.
//!
//! Statements of one changeset run one after another with no surrounding
//! transaction. Whether earlier statements survive a later failure depends
//! on the database; a halt reports how many had executed.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use oxide_changelog_core::changeset::validate_changesets;
use oxide_changelog_core::{
    ChangeSet, ChangesetKey, CheckSum, ChecksumVersion, Dialect, DialectRegistry, OnFail,
};

use crate::config::EngineConfig;
use crate::connection::{Connection, SqlxConnection};
use crate::error::{ChangelogError, Result};
use crate::executor::StatementExecutor;
use crate::history::{ExecType, TrackingRecord, TrackingStore, TOOL_VERSION};
use crate::lock::{LockHolder, LockService};
use crate::precondition::{PreconditionEvaluator, PreconditionResult};

/// What the tracking table says about a changeset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Never ran.
    Pending,
    /// Ran with the same content.
    AlreadyRan,
    /// Ran before and runs again (`run_always`, or `run_on_change` after an
    /// edit).
    Rerun,
    /// Unchanged, but the stored checksum is NULL or from an older algorithm
    /// and gets rewritten.
    ChecksumUpgrade,
    /// Ran with different content.
    ChecksumMismatch {
        /// Checksum in the tracking table.
        stored: CheckSum,
        /// Checksum of the changeset now.
        current: CheckSum,
    },
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("PENDING"),
            Self::AlreadyRan => f.write_str("ALREADY_RAN"),
            Self::Rerun => f.write_str("RERUN"),
            Self::ChecksumUpgrade => f.write_str("CHECKSUM_UPGRADE"),
            Self::ChecksumMismatch { .. } => f.write_str("CHECKSUM_MISMATCH"),
        }
    }
}

/// Classifies a changeset against its current tracking record.
pub fn classify(
    changeset: &ChangeSet,
    record: Option<&TrackingRecord>,
    ignore_checksum_mismatch: bool,
) -> Result<Classification> {
    let Some(record) = record else {
        return Ok(Classification::Pending);
    };
    if changeset.run_always {
        return Ok(Classification::Rerun);
    }
    let Some(stored) = &record.checksum else {
        return Ok(Classification::ChecksumUpgrade);
    };
    let current = changeset.checksum()?;
    if *stored == current {
        return Ok(Classification::AlreadyRan);
    }
    if stored.version() < ChecksumVersion::CURRENT
        && changeset.checksum_for(stored.version())? == *stored
    {
        return Ok(Classification::ChecksumUpgrade);
    }
    if changeset.accepts_checksum(stored) {
        return Ok(Classification::AlreadyRan);
    }
    if changeset.run_on_change {
        return Ok(Classification::Rerun);
    }
    if ignore_checksum_mismatch {
        return Ok(Classification::AlreadyRan);
    }
    Ok(Classification::ChecksumMismatch {
        stored: stored.clone(),
        current,
    })
}

/// Why a changeset was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipReason {
    /// Not tagged with an active context.
    Context,
    /// Excluded for this database.
    Dbms,
    /// Precondition failed under `CONTINUE`.
    PreconditionFailed,
    /// Precondition failed under `WARN`.
    PreconditionWarned,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Context => "context does not match",
            Self::Dbms => "dbms does not match",
            Self::PreconditionFailed => "precondition failed",
            Self::PreconditionWarned => "precondition failed (warned)",
        })
    }
}

/// A changeset recorded by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedChangeset {
    /// Changeset identity.
    pub key: ChangesetKey,
    /// How it was recorded.
    pub exec_type: ExecType,
}

/// Where and why a run stopped.
#[derive(Debug)]
pub struct Halt {
    /// The changeset the run stopped at.
    pub changeset: ChangesetKey,
    /// The cause.
    pub error: ChangelogError,
    /// SQL statements of that changeset executed before the failure.
    pub statements_executed: usize,
}

impl Halt {
    const fn new(changeset: ChangesetKey, error: ChangelogError, statements_executed: usize) -> Self {
        Self {
            changeset,
            error,
            statements_executed,
        }
    }
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every changeset was applied or skipped.
    Success,
    /// A precondition failed under `HALT` or could not be evaluated.
    HaltedOnPrecondition(Halt),
    /// A changeset was modified after it ran.
    HaltedOnChecksumMismatch(Halt),
    /// A statement could not be rendered or executed.
    HaltedOnExecutionError(Halt),
    /// Cancellation was requested; `next` was not started.
    Cancelled {
        /// The first changeset that was not started.
        next: ChangesetKey,
    },
}

/// Changeset counts of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunCounts {
    /// Executed for the first time.
    pub executed: usize,
    /// Executed again.
    pub reran: usize,
    /// Recorded without running.
    pub mark_ran: usize,
    /// Already applied.
    pub previously_ran: usize,
    /// Failed (at most one; the run stops there).
    pub failed: usize,
    /// Skipped, by reason.
    pub skipped: BTreeMap<SkipReason, usize>,
    /// Changesets handed to the run.
    pub total: usize,
}

impl RunCounts {
    /// Skipped changesets across all reasons.
    #[must_use]
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }

    fn skip(&mut self, reason: SkipReason) {
        *self.skipped.entry(reason).or_default() += 1;
    }
}

/// Result of [`ChangesetEngine::update`].
#[derive(Debug)]
pub struct RunReport {
    /// How the run ended.
    pub outcome: RunOutcome,
    /// Changesets recorded by this run, in order.
    pub applied: Vec<AppliedChangeset>,
    /// Counts.
    pub counts: RunCounts,
    /// Warnings from `WARN` preconditions.
    pub warnings: Vec<String>,
    /// Identifier written with every record of this run.
    pub deployment_id: String,
}

impl RunReport {
    /// True when the run finished without halting.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, RunOutcome::Success)
    }

    /// The halt, if the run stopped on an error.
    #[must_use]
    pub const fn halt(&self) -> Option<&Halt> {
        match &self.outcome {
            RunOutcome::HaltedOnPrecondition(halt)
            | RunOutcome::HaltedOnChecksumMismatch(halt)
            | RunOutcome::HaltedOnExecutionError(halt) => Some(halt),
            RunOutcome::Success | RunOutcome::Cancelled { .. } => None,
        }
    }

    /// Turns a halted or cancelled run into its error.
    pub fn into_result(self) -> Result<Self> {
        match self.outcome {
            RunOutcome::HaltedOnPrecondition(halt)
            | RunOutcome::HaltedOnChecksumMismatch(halt)
            | RunOutcome::HaltedOnExecutionError(halt) => Err(halt.error),
            RunOutcome::Cancelled { next } => Err(ChangelogError::Cancelled { next }),
            RunOutcome::Success => Ok(self),
        }
    }
}

/// Per-changeset state reported by [`ChangesetEngine::status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangesetStatus {
    /// Changeset identity.
    pub key: ChangesetKey,
    /// Classification against the tracking table.
    pub classification: Classification,
    /// Set when the changeset would be filtered out.
    pub skip: Option<SkipReason>,
}

/// Bookkeeping shared by every changeset of one run.
#[derive(Debug)]
struct RunState {
    order: i64,
    deployment_id: String,
    deployed_by: String,
}

/// Verdict of the precondition gate.
#[derive(Debug)]
enum Gate {
    Proceed,
    Skip,
    MarkRan,
    Halt(ChangelogError),
}

/// Applies changesets to one database.
pub struct ChangesetEngine {
    executor: StatementExecutor,
    tracking: TrackingStore,
    lock: LockService,
    config: EngineConfig,
}

impl fmt::Debug for ChangesetEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangesetEngine")
            .field("executor", &self.executor)
            .field("tracking", &self.tracking)
            .field("lock", &self.lock)
            .finish_non_exhaustive()
    }
}

impl ChangesetEngine {
    /// Creates an engine around an executor.
    #[must_use]
    pub fn new(executor: StatementExecutor, config: EngineConfig) -> Self {
        let tracking = TrackingStore::new(config.tracking_table.clone());
        let lock = LockService::new(config.lock_table.clone(), config.lock.clone());
        Self {
            executor,
            tracking,
            lock,
            config,
        }
    }

    /// Creates an engine for a connection, picking the dialect from the
    /// registry. `dialect` forces a dialect by short name.
    pub fn from_connection(
        connection: Box<dyn Connection>,
        registry: &DialectRegistry,
        config: EngineConfig,
        dialect: Option<&str>,
    ) -> Result<Self> {
        let dialect: Arc<dyn Dialect> = match dialect {
            Some(name) => registry.by_short_name(name)?,
            None => registry.detect(connection.metadata())?,
        };
        info!(
            dialect = dialect.short_name(),
            product = %connection.metadata().product_name,
            "Selected dialect"
        );
        Ok(Self::new(StatementExecutor::new(connection, dialect), config))
    }

    /// Connects to `url` with `sqlx` and builds an engine with the default
    /// dialects.
    pub async fn connect(url: &str, config: EngineConfig, dialect: Option<&str>) -> Result<Self> {
        let connection = SqlxConnection::connect(url).await?;
        Self::from_connection(
            Box::new(connection),
            &DialectRegistry::with_defaults(),
            config,
            dialect,
        )
    }

    /// The executor. Useful for inspecting the database in tests.
    pub fn executor(&mut self) -> &mut StatementExecutor {
        &mut self.executor
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The tracking store.
    #[must_use]
    pub const fn tracking(&self) -> &TrackingStore {
        &self.tracking
    }

    /// Gives the executor back.
    #[must_use]
    pub fn into_executor(self) -> StatementExecutor {
        self.executor
    }

    /// Applies `changesets` in order.
    pub async fn update(&mut self, changesets: &[ChangeSet]) -> Result<RunReport> {
        self.update_with_cancel(changesets, &CancellationToken::new()).await
    }

    /// Applies `changesets` in order, stopping at the next changeset
    /// boundary once `cancel` fires.
    ///
    /// Returns `Err` for validation failures, lock failures and errors
    /// outside any changeset. Changeset-level failures end up in the
    /// report's outcome. The lock is released on every path.
    pub async fn update_with_cancel(
        &mut self,
        changesets: &[ChangeSet],
        cancel: &CancellationToken,
    ) -> Result<RunReport> {
        let errors = validate_changesets(changesets);
        if !errors.is_empty() {
            return Err(ChangelogError::Validation(errors));
        }

        self.lock.acquire(&mut self.executor).await?;
        let result = self.run_locked(changesets, cancel).await;
        self.executor.set_changeset(None);
        let released = self.lock.release(&mut self.executor).await;

        match (result, released) {
            (Ok(report), Ok(())) => Ok(report),
            (Ok(report), Err(e)) => {
                warn!(
                    applied = report.applied.len(),
                    error = %e,
                    "Run finished but the lock could not be released"
                );
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(release_error)) => {
                warn!(error = %release_error, "Failed to release lock after error");
                Err(e)
            }
        }
    }

    async fn run_locked(
        &mut self,
        changesets: &[ChangeSet],
        cancel: &CancellationToken,
    ) -> Result<RunReport> {
        self.tracking.bootstrap(&mut self.executor).await?;
        let mut run = RunState {
            order: self.tracking.max_order(&mut self.executor).await?,
            deployment_id: deployment_id(),
            deployed_by: self.deployed_by(),
        };
        let mut report = RunReport {
            outcome: RunOutcome::Success,
            applied: Vec::new(),
            counts: RunCounts {
                total: changesets.len(),
                ..RunCounts::default()
            },
            warnings: Vec::new(),
            deployment_id: run.deployment_id.clone(),
        };
        info!(
            changesets = changesets.len(),
            deployment_id = %run.deployment_id,
            "Starting update"
        );

        for changeset in changesets {
            if cancel.is_cancelled() {
                let next = changeset.key();
                info!(next = %next, "Update cancelled");
                report.outcome = RunOutcome::Cancelled { next };
                break;
            }
            if let Some(outcome) = self.step(changeset, &mut run, &mut report).await {
                report.outcome = outcome;
                break;
            }
        }

        info!(
            executed = report.counts.executed,
            reran = report.counts.reran,
            mark_ran = report.counts.mark_ran,
            previously_ran = report.counts.previously_ran,
            skipped = report.counts.skipped_total(),
            failed = report.counts.failed,
            "Update finished"
        );
        Ok(report)
    }

    /// Takes one changeset through classification, preconditions,
    /// execution and recording. Returns the outcome when the run must stop.
    async fn step(
        &mut self,
        changeset: &ChangeSet,
        run: &mut RunState,
        report: &mut RunReport,
    ) -> Option<RunOutcome> {
        let key = changeset.key();
        self.executor.set_changeset(Some(key.clone()));

        if let Some(reason) = self.filter(changeset) {
            debug!(changeset = %key, reason = %reason, "Skipping");
            report.counts.skip(reason);
            return None;
        }

        let classification = match self.lookup(changeset, &key).await {
            Ok(classification) => classification,
            Err(error) => {
                report.counts.failed += 1;
                return Some(RunOutcome::HaltedOnExecutionError(Halt::new(key, error, 0)));
            }
        };
        let exec_type = match classification {
            Classification::AlreadyRan => {
                debug!(changeset = %key, "Already ran");
                report.counts.previously_ran += 1;
                return None;
            }
            Classification::ChecksumUpgrade => {
                if let Err(error) = self.upgrade_checksum(changeset, &key).await {
                    report.counts.failed += 1;
                    return Some(RunOutcome::HaltedOnExecutionError(Halt::new(key, error, 0)));
                }
                report.counts.previously_ran += 1;
                return None;
            }
            Classification::ChecksumMismatch { stored, current } => {
                warn!(changeset = %key, stored = %stored, current = %current, "Checksum mismatch");
                let error = ChangelogError::ChecksumMismatch {
                    changeset: key.clone(),
                    stored: stored.to_string(),
                    current: current.to_string(),
                };
                report.counts.failed += 1;
                return Some(RunOutcome::HaltedOnChecksumMismatch(Halt::new(key, error, 0)));
            }
            Classification::Pending => ExecType::Executed,
            Classification::Rerun => ExecType::Reran,
        };

        match self.gate(changeset, &key, report).await {
            Gate::Proceed => {}
            Gate::Skip => return None,
            Gate::MarkRan => {
                run.order += 1;
                if let Err(error) = self.record(changeset, ExecType::MarkRan, run).await {
                    report.counts.failed += 1;
                    return Some(RunOutcome::HaltedOnExecutionError(Halt::new(key, error, 0)));
                }
                report.counts.mark_ran += 1;
                report.applied.push(AppliedChangeset {
                    key,
                    exec_type: ExecType::MarkRan,
                });
                return None;
            }
            Gate::Halt(error) => {
                report.counts.failed += 1;
                return Some(RunOutcome::HaltedOnPrecondition(Halt::new(key, error, 0)));
            }
        }

        info!(changeset = %key, exec_type = %exec_type, "Running changeset");
        let recorded = match self.apply(changeset).await {
            Ok(executed) => {
                run.order += 1;
                self.record(changeset, exec_type, run)
                    .await
                    .map_err(|error| (error, executed))
            }
            Err(failure) => Err(failure),
        };
        if let Err((error, statements_executed)) = recorded {
            warn!(changeset = %key, error = %error, statements_executed, "Changeset failed");
            report.counts.failed += 1;
            return Some(RunOutcome::HaltedOnExecutionError(Halt::new(
                key,
                error,
                statements_executed,
            )));
        }
        if exec_type == ExecType::Reran {
            report.counts.reran += 1;
        } else {
            report.counts.executed += 1;
        }
        report.applied.push(AppliedChangeset { key, exec_type });
        None
    }

    fn filter(&self, changeset: &ChangeSet) -> Option<SkipReason> {
        if !changeset.matches_contexts(&self.config.contexts) {
            Some(SkipReason::Context)
        } else if !changeset.matches_dbms(self.executor.dialect().short_name()) {
            Some(SkipReason::Dbms)
        } else {
            None
        }
    }

    async fn lookup(&mut self, changeset: &ChangeSet, key: &ChangesetKey) -> Result<Classification> {
        let record = self.tracking.records_for(&mut self.executor, key).await?;
        classify(changeset, record.as_ref(), self.config.ignore_checksum_mismatch)
    }

    async fn upgrade_checksum(&mut self, changeset: &ChangeSet, key: &ChangesetKey) -> Result<()> {
        let checksum = changeset.checksum()?;
        self.tracking
            .update_checksum(&mut self.executor, key, &checksum)
            .await?;
        info!(changeset = %key, checksum = %checksum, "Upgraded stored checksum");
        Ok(())
    }

    /// Evaluates the changeset's preconditions and applies its on-fail
    /// policy.
    async fn gate(&mut self, changeset: &ChangeSet, key: &ChangesetKey, report: &mut RunReport) -> Gate {
        let Some(preconditions) = &changeset.preconditions else {
            return Gate::Proceed;
        };
        let evaluator = PreconditionEvaluator::new(&self.tracking);
        let message = match evaluator.check(&mut self.executor, preconditions).await {
            PreconditionResult::Pass => return Gate::Proceed,
            PreconditionResult::Error(source) => {
                return Gate::Halt(ChangelogError::PreconditionError {
                    changeset: key.clone(),
                    source: Box::new(source),
                });
            }
            PreconditionResult::Fail(message) => message,
        };
        match preconditions.on_fail {
            OnFail::Halt => Gate::Halt(ChangelogError::PreconditionFailure {
                changeset: key.clone(),
                message,
            }),
            OnFail::Continue => {
                info!(changeset = %key, reason = %message, "Precondition failed, skipping");
                report.counts.skip(SkipReason::PreconditionFailed);
                Gate::Skip
            }
            OnFail::Warn => {
                warn!(changeset = %key, reason = %message, "Precondition failed");
                report.warnings.push(format!("{key}: {message}"));
                report.counts.skip(SkipReason::PreconditionWarned);
                Gate::Skip
            }
            OnFail::MarkRan => {
                info!(changeset = %key, reason = %message, "Precondition failed, marking as ran");
                Gate::MarkRan
            }
        }
    }

    /// Renders every statement first, then executes them in order.
    ///
    /// On failure returns the error and how many SQL statements had run.
    async fn apply(&mut self, changeset: &ChangeSet) -> std::result::Result<usize, (ChangelogError, usize)> {
        let mut rendered = Vec::new();
        for statement in &changeset.statements {
            rendered.extend(self.executor.render(statement).map_err(|e| (e, 0))?);
        }
        for (executed, sql) in rendered.iter().enumerate() {
            self.executor
                .execute_sql(sql)
                .await
                .map_err(|e| (e, executed))?;
        }
        Ok(rendered.len())
    }

    /// Appends the tracking record for a changeset at `run.order`.
    async fn record(&mut self, changeset: &ChangeSet, exec_type: ExecType, run: &RunState) -> Result<()> {
        let record = TrackingRecord {
            key: changeset.key(),
            date_executed: Utc::now(),
            order_executed: run.order,
            exec_type,
            checksum: Some(changeset.checksum()?),
            description: changeset.description(),
            comments: changeset.comment.clone(),
            contexts: (!changeset.contexts.is_empty()).then(|| changeset.contexts.join(",")),
            deployment_id: Some(run.deployment_id.clone()),
            deployed_by: Some(run.deployed_by.clone()),
            tool_version: Some(TOOL_VERSION.to_string()),
        };
        self.tracking.append(&mut self.executor, &record).await
    }

    fn deployed_by(&self) -> String {
        self.config
            .deployed_by
            .clone()
            .unwrap_or_else(|| self.lock.locked_by().to_string())
    }

    /// The SQL an update would run, without running it or taking the lock.
    ///
    /// Reads still reach the database to classify changesets. Preconditions
    /// are not evaluated.
    pub async fn update_sql(&mut self, changesets: &[ChangeSet]) -> Result<Vec<String>> {
        let errors = validate_changesets(changesets);
        if !errors.is_empty() {
            return Err(ChangelogError::Validation(errors));
        }
        self.executor.set_dry_run(true);
        let result = self.capture_update(changesets).await;
        self.executor.set_dry_run(false);
        self.executor.set_changeset(None);
        let captured = self.executor.take_captured();
        result.map(|()| captured)
    }

    async fn capture_update(&mut self, changesets: &[ChangeSet]) -> Result<()> {
        let tracked = self.tracking.exists(&mut self.executor).await?;
        let mut run = RunState {
            order: if tracked {
                self.tracking.max_order(&mut self.executor).await?
            } else {
                0
            },
            deployment_id: deployment_id(),
            deployed_by: self.deployed_by(),
        };
        self.tracking.bootstrap(&mut self.executor).await?;

        for changeset in changesets {
            if self.filter(changeset).is_some() {
                continue;
            }
            let key = changeset.key();
            let record = if tracked {
                self.tracking.records_for(&mut self.executor, &key).await?
            } else {
                None
            };
            let classification =
                classify(changeset, record.as_ref(), self.config.ignore_checksum_mismatch)?;
            let exec_type = match classification {
                Classification::AlreadyRan | Classification::ChecksumUpgrade => continue,
                Classification::ChecksumMismatch { stored, current } => {
                    return Err(ChangelogError::ChecksumMismatch {
                        changeset: key,
                        stored: stored.to_string(),
                        current: current.to_string(),
                    });
                }
                Classification::Pending => ExecType::Executed,
                Classification::Rerun => ExecType::Reran,
            };
            self.executor.set_changeset(Some(key.clone()));
            self.executor.comment(&format!("Changeset {key}"));
            for statement in &changeset.statements {
                self.executor.execute(statement).await?;
            }
            run.order += 1;
            self.record(changeset, exec_type, &run).await?;
        }
        Ok(())
    }

    /// Classifies every changeset without executing anything.
    pub async fn status(&mut self, changesets: &[ChangeSet]) -> Result<Vec<ChangesetStatus>> {
        let tracked = self.tracking.exists(&mut self.executor).await?;
        let mut statuses = Vec::with_capacity(changesets.len());
        for changeset in changesets {
            let key = changeset.key();
            let record = if tracked {
                self.tracking.records_for(&mut self.executor, &key).await?
            } else {
                None
            };
            let skip = self.filter(changeset);
            statuses.push(ChangesetStatus {
                classification: classify(
                    changeset,
                    record.as_ref(),
                    self.config.ignore_checksum_mismatch,
                )?,
                key,
                skip,
            });
        }
        Ok(statuses)
    }

    /// Every tracking record in execution order.
    pub async fn history(&mut self) -> Result<Vec<TrackingRecord>> {
        if !self.tracking.exists(&mut self.executor).await? {
            return Ok(Vec::new());
        }
        self.tracking.all_records(&mut self.executor).await
    }

    /// Current lock holder, if any.
    pub async fn list_locks(&mut self) -> Result<Option<LockHolder>> {
        self.lock.holder(&mut self.executor).await
    }

    /// Clears the lock whoever holds it.
    pub async fn release_locks(&mut self) -> Result<()> {
        self.lock.force_release(&mut self.executor).await
    }

    /// Sets every stored checksum to NULL under the lock. The next update
    /// recomputes them.
    pub async fn clear_checksums(&mut self) -> Result<u64> {
        self.lock.acquire(&mut self.executor).await?;
        let cleared = match self.tracking.exists(&mut self.executor).await {
            Ok(true) => self.tracking.clear_checksums(&mut self.executor).await,
            Ok(false) => Ok(0),
            Err(e) => Err(e),
        };
        let released = self.lock.release(&mut self.executor).await;
        let cleared = cleared?;
        released?;
        Ok(cleared)
    }

    /// SQL of a changeset's rollback statements.
    pub fn render_rollback(&self, changeset: &ChangeSet) -> Result<Vec<String>> {
        render_rollback(self.executor.dialect(), changeset)
    }
}

/// Renders a changeset's rollback statements with `dialect`, without a
/// connection.
pub fn render_rollback(dialect: &dyn Dialect, changeset: &ChangeSet) -> Result<Vec<String>> {
    if changeset.rollback.is_empty() {
        return Err(ChangelogError::InvalidState(format!(
            "changeset {} declares no rollback statements",
            changeset.key()
        )));
    }
    let mut sql = Vec::new();
    for statement in &changeset.rollback {
        sql.extend(
            dialect
                .render(statement)
                .map_err(|source| ChangelogError::UnsupportedCapability {
                    changeset: changeset.key(),
                    source,
                })?,
        );
    }
    Ok(sql)
}

/// Ten digits derived from the current time.
fn deployment_id() -> String {
    format!("{:010}", Utc::now().timestamp_millis().rem_euclid(10_000_000_000))
}
