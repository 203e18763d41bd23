//! Engine configuration.

use std::time::Duration;

use oxide_changelog_core::TableIdentifier;

/// Default name of the tracking table.
pub const DEFAULT_TRACKING_TABLE: &str = "oxide_changelog";

/// Default name of the lock table.
pub const DEFAULT_LOCK_TABLE: &str = "oxide_changelog_lock";

/// How the lock is waited for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockConfig {
    /// Give up after this long.
    pub wait_timeout: Duration,
    /// First pause between attempts.
    pub poll_interval: Duration,
    /// Upper bound for the backoff.
    pub max_poll_interval: Duration,
    /// Identity written to the lock row. Defaults to `<hostname> (<pid>)`.
    pub locked_by: Option<String>,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            wait_timeout: Duration::from_secs(5 * 60),
            poll_interval: Duration::from_millis(250),
            max_poll_interval: Duration::from_secs(5),
            locked_by: None,
        }
    }
}

impl LockConfig {
    /// Sets the wait timeout.
    #[must_use]
    pub const fn wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    /// Sets the first poll interval.
    #[must_use]
    pub const fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the backoff ceiling.
    #[must_use]
    pub const fn max_poll_interval(mut self, interval: Duration) -> Self {
        self.max_poll_interval = interval;
        self
    }

    /// Sets the identity written to the lock row.
    #[must_use]
    pub fn locked_by(mut self, locked_by: impl Into<String>) -> Self {
        self.locked_by = Some(locked_by.into());
        self
    }
}

/// Configuration for a [`ChangesetEngine`](crate::engine::ChangesetEngine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Where applied changesets are recorded.
    pub tracking_table: TableIdentifier,
    /// Where the lock row lives.
    pub lock_table: TableIdentifier,
    /// Lock waiting behaviour.
    pub lock: LockConfig,
    /// Active contexts. Empty runs every changeset.
    pub contexts: Vec<String>,
    /// Treat checksum mismatches as already ran for this run.
    pub ignore_checksum_mismatch: bool,
    /// Value of the `deployed_by` column. Defaults to the lock identity.
    pub deployed_by: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tracking_table: TableIdentifier::new(DEFAULT_TRACKING_TABLE),
            lock_table: TableIdentifier::new(DEFAULT_LOCK_TABLE),
            lock: LockConfig::default(),
            contexts: Vec::new(),
            ignore_checksum_mismatch: false,
            deployed_by: None,
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tracking table.
    #[must_use]
    pub fn tracking_table(mut self, table: impl Into<TableIdentifier>) -> Self {
        self.tracking_table = table.into();
        self
    }

    /// Sets the lock table.
    #[must_use]
    pub fn lock_table(mut self, table: impl Into<TableIdentifier>) -> Self {
        self.lock_table = table.into();
        self
    }

    /// Places both reserved tables in `schema`.
    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        let schema = schema.into();
        self.tracking_table.schema = Some(schema.clone());
        self.lock_table.schema = Some(schema);
        self
    }

    /// Sets the lock configuration.
    #[must_use]
    pub fn lock(mut self, lock: LockConfig) -> Self {
        self.lock = lock;
        self
    }

    /// Adds an active context.
    #[must_use]
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.contexts.push(context.into());
        self
    }

    /// Adds several active contexts.
    #[must_use]
    pub fn contexts<I, S>(mut self, contexts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contexts.extend(contexts.into_iter().map(Into::into));
        self
    }

    /// Accepts modified changesets instead of halting.
    #[must_use]
    pub const fn ignore_checksum_mismatch(mut self, ignore: bool) -> Self {
        self.ignore_checksum_mismatch = ignore;
        self
    }

    /// Sets the `deployed_by` value.
    #[must_use]
    pub fn deployed_by(mut self, deployed_by: impl Into<String>) -> Self {
        self.deployed_by = Some(deployed_by.into());
        self
    }
}
