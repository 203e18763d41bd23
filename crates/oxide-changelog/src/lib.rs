//! Changeset execution engine.
//!
//! `oxide-changelog` applies an ordered list of changesets to a live
//! database exactly once each:
//! - Applied changesets are recorded, with a checksum, in a tracking table
//!   inside the target database
//! - A lock row in the same database keeps concurrent runs apart
//! - Preconditions gate each changeset, with HALT, CONTINUE, MARK_RAN or
//!   WARN on failure
//! - SQL comes from the dialect providers of `oxide-changelog-core`
//!
//! # Architecture
//!
//! - **Connection** - `sqlx` connection plus product metadata
//! - **Executor** - The only component that sends SQL
//! - **Tracking store** - Reads and writes the tracking table
//! - **Lock service** - Conditional-update lock with polling backoff
//! - **Precondition evaluator** - Pass / Fail / Error checks
//! - **Engine** - Classifies, gates, applies and records changesets
//!
//! # Example
//!
//! ```rust,no_run
//! use oxide_changelog::prelude::*;
//! use oxide_changelog_core::statement::{ColumnDef, CreateTableBuilder};
//! use oxide_changelog_core::LogicalType;
//!
//! # async fn run() -> oxide_changelog::error::Result<()> {
//! let changesets = vec![ChangeSet::new("1", "alice", "db/changelog.json").statement(
//!     CreateTableBuilder::new("users")
//!         .column(ColumnDef::new("id", LogicalType::BigInt).primary_key().auto_increment())
//!         .column(ColumnDef::new("name", LogicalType::Varchar(255)).not_null())
//!         .build(),
//! )];
//!
//! let mut engine = ChangesetEngine::connect("sqlite:app.db?mode=rwc", EngineConfig::new(), None).await?;
//! let report = engine.update(&changesets).await?;
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Apply pending changesets
//! oxide-changelog --url sqlite:app.db --changelog changelog.json update
//!
//! # Print the SQL instead
//! oxide-changelog --url sqlite:app.db --changelog changelog.json update-sql
//!
//! # Show what would run
//! oxide-changelog --url sqlite:app.db --changelog changelog.json status
//! ```

pub mod config;
pub mod connection;
pub mod engine;
pub mod error;
pub mod executor;
pub mod history;
pub mod lock;
pub mod precondition;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{EngineConfig, LockConfig};
    pub use crate::connection::{Connection, Row, SqlxConnection};
    pub use crate::engine::{
        classify, AppliedChangeset, ChangesetEngine, ChangesetStatus, Classification, Halt,
        RunCounts, RunOutcome, RunReport, SkipReason,
    };
    pub use crate::error::{ChangelogError, Result};
    pub use crate::executor::StatementExecutor;
    pub use crate::history::{ExecType, TrackingRecord, TrackingStore};
    pub use crate::lock::{LockHolder, LockService, LockState};
    pub use crate::precondition::{PreconditionEvaluator, PreconditionResult};
    pub use oxide_changelog_core::{
        ChangeLog, ChangeSet, ChangesetKey, OnFail, Precondition, Preconditions, Statement,
    };
}
