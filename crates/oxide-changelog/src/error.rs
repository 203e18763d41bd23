//! Error types for the changeset engine.

use oxide_changelog_core::{ChangesetKey, DialectError, ValidationError};

use crate::connection::DriverError;
use crate::lock::LockHolder;

/// Errors that can occur while running changesets.
#[derive(Debug, thiserror::Error)]
pub enum ChangelogError {
    /// The changeset sequence failed structural validation. Nothing was
    /// sent to the database.
    #[error("Validation failed:\n{}", .0.iter().map(|e| format!("  - {e}")).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<ValidationError>),

    /// A precondition evaluated to false under the HALT policy.
    #[error("Precondition failed for {changeset}: {message}")]
    PreconditionFailure {
        /// The gated changeset.
        changeset: ChangesetKey,
        /// Why the precondition failed.
        message: String,
    },

    /// A precondition could not be evaluated.
    #[error("Precondition error for {changeset}: {source}")]
    PreconditionError {
        /// The gated changeset.
        changeset: ChangesetKey,
        /// What went wrong while evaluating.
        source: Box<ChangelogError>,
    },

    /// An applied changeset changed since it ran.
    #[error("Checksum mismatch for {changeset}: recorded {stored}, now {current}")]
    ChecksumMismatch {
        /// The modified changeset.
        changeset: ChangesetKey,
        /// Checksum in the tracking table.
        stored: String,
        /// Checksum of the changeset as declared now.
        current: String,
    },

    /// The dialect cannot express a statement of the changeset.
    #[error("Unsupported statement in {changeset}: {source}")]
    UnsupportedCapability {
        /// The changeset containing the statement.
        changeset: ChangesetKey,
        /// The dialect's refusal.
        source: DialectError,
    },

    /// The database rejected a statement.
    #[error("Database error{} executing `{sql}`: {source}", .changeset.as_ref().map(|c| format!(" in {c}")).unwrap_or_default())]
    DatabaseExecution {
        /// The changeset being applied, if any.
        changeset: Option<ChangesetKey>,
        /// The rejected SQL.
        sql: String,
        /// The driver's error.
        source: DriverError,
    },

    /// A query returned something other than what the caller required.
    #[error("Unexpected result from `{sql}`: {message}")]
    UnexpectedResult {
        /// The query.
        sql: String,
        /// What was wrong with the result.
        message: String,
    },

    /// The lock could not be acquired before the wait timeout.
    #[error("Timed out waiting for the changelog lock{}", .holder.as_ref().map(|h| format!(" (held by {h})")).unwrap_or_default())]
    LockTimeout {
        /// The holder seen on the last attempt.
        holder: Option<LockHolder>,
    },

    /// The lock is held by another process.
    #[error("Changelog lock is held by {holder}")]
    LockContention {
        /// Current holder.
        holder: LockHolder,
    },

    /// The run was cancelled between changesets.
    #[error("Run cancelled before {next}")]
    Cancelled {
        /// The first changeset that was not started.
        next: ChangesetKey,
    },

    /// Dialect selection failed.
    #[error("Dialect error: {0}")]
    Dialect(#[from] DialectError),

    /// Connecting to the database failed.
    #[error("Connection error: {0}")]
    Connection(#[from] sqlx::Error),

    /// Encoding a changeset for checksumming or reading a changelog failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error (reading changelog files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Tracking or lock state is not what the engine expects.
    #[error("Invalid changelog state: {0}")]
    InvalidState(String),
}

impl ChangelogError {
    /// True for lock acquisition failures.
    #[must_use]
    pub const fn is_lock_error(&self) -> bool {
        matches!(self, Self::LockTimeout { .. } | Self::LockContention { .. })
    }

    /// True when retrying the same operation later may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::LockContention { .. })
    }
}

/// Result type for changeset operations.
pub type Result<T> = std::result::Result<T, ChangelogError>;
