//! Dialect selection from connection metadata.

use std::sync::Arc;

use super::{
    ConnectionMetadata, Dialect, DuckDbDialect, H2Dialect, MariaDbDialect, MssqlDialect,
    MySqlDialect, OracleDialect, PostgresDialect, SqliteDialect, XuguDialect,
};
use crate::error::DialectError;

/// The set of known dialects.
///
/// Exactly one dialect must claim a connection; [`DialectRegistry::detect`]
/// reports both "nobody" and "more than one" as errors rather than picking
/// by priority.
#[derive(Debug, Clone, Default)]
pub struct DialectRegistry {
    dialects: Vec<Arc<dyn Dialect>>,
}

impl DialectRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in dialect.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new()
            .with(PostgresDialect::new())
            .with(MySqlDialect::new())
            .with(MariaDbDialect::new())
            .with(SqliteDialect::new())
            .with(MssqlDialect::new())
            .with(OracleDialect::new())
            .with(H2Dialect::new())
            .with(DuckDbDialect::new())
            .with(XuguDialect::new())
    }

    /// Adds a dialect, builder style.
    #[must_use]
    pub fn with(mut self, dialect: impl Dialect + 'static) -> Self {
        self.register(Arc::new(dialect));
        self
    }

    /// Adds a dialect.
    pub fn register(&mut self, dialect: Arc<dyn Dialect>) {
        self.dialects.push(dialect);
    }

    /// Registered dialects in registration order.
    #[must_use]
    pub fn dialects(&self) -> &[Arc<dyn Dialect>] {
        &self.dialects
    }

    /// Looks a dialect up by its short name.
    ///
    /// # Errors
    ///
    /// Returns [`DialectError::UnknownDialect`] when nothing is registered
    /// under `name`.
    pub fn by_short_name(&self, name: &str) -> Result<Arc<dyn Dialect>, DialectError> {
        self.dialects
            .iter()
            .find(|d| d.short_name().eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| DialectError::UnknownDialect {
                name: name.to_string(),
            })
    }

    /// Picks the single dialect that identifies the connection.
    ///
    /// # Errors
    ///
    /// [`DialectError::UnknownDatabase`] when no dialect matches and
    /// [`DialectError::AmbiguousDialect`] when several do.
    pub fn detect(&self, metadata: &ConnectionMetadata) -> Result<Arc<dyn Dialect>, DialectError> {
        let mut matches = self.dialects.iter().filter(|d| d.identify(metadata));
        let first = matches.next().ok_or_else(|| DialectError::UnknownDatabase {
            product: metadata.product_name.clone(),
        })?;
        let others: Vec<&'static str> = matches.map(|d| d.short_name()).collect();
        if !others.is_empty() {
            let mut candidates = vec![first.short_name()];
            candidates.extend(others);
            return Err(DialectError::AmbiguousDialect {
                product: metadata.product_name.clone(),
                candidates,
            });
        }
        Ok(Arc::clone(first))
    }

    /// Checks that each sample connection is claimed by exactly one dialect.
    ///
    /// # Errors
    ///
    /// Returns the first detection failure.
    pub fn validate_exclusive(&self, samples: &[ConnectionMetadata]) -> Result<(), DialectError> {
        for sample in samples {
            self.detect(sample)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples() -> Vec<ConnectionMetadata> {
        vec![
            ConnectionMetadata::new("PostgreSQL", "16.2"),
            ConnectionMetadata::new("MySQL", "8.0.36"),
            ConnectionMetadata::new("MySQL", "10.11.6-MariaDB"),
            ConnectionMetadata::new("MariaDB", "11.2"),
            ConnectionMetadata::new("SQLite", "3.45.1"),
            ConnectionMetadata::new("Microsoft SQL Server", "16.00"),
            ConnectionMetadata::new("Microsoft SQL Server Express Edition", "16.00"),
            ConnectionMetadata::new("Oracle", "23c"),
            ConnectionMetadata::new("H2", "2.2.224"),
            ConnectionMetadata::new("DuckDB", "v1.0.0"),
            ConnectionMetadata::new("XuguDB", "12.0"),
        ]
    }

    #[test]
    fn test_every_sample_is_claimed_exactly_once() {
        let registry = DialectRegistry::with_defaults();
        registry.validate_exclusive(&samples()).unwrap();
    }

    #[test]
    fn test_detect_picks_expected_dialect() {
        let registry = DialectRegistry::with_defaults();
        let detected = |product: &str, version: &str| {
            registry
                .detect(&ConnectionMetadata::new(product, version))
                .unwrap()
                .short_name()
        };
        assert_eq!(detected("PostgreSQL", "16"), "postgresql");
        assert_eq!(detected("MySQL", "8.0.36"), "mysql");
        assert_eq!(detected("MySQL", "10.11.6-MariaDB"), "mariadb");
        assert_eq!(detected("xugudb", "12"), "xugu");
    }

    #[test]
    fn test_unknown_product() {
        let registry = DialectRegistry::with_defaults();
        let err = registry
            .detect(&ConnectionMetadata::new("Informix", "14"))
            .unwrap_err();
        assert_eq!(
            err,
            DialectError::UnknownDatabase {
                product: "Informix".into()
            }
        );
    }

    #[test]
    fn test_ambiguous_product() {
        let registry = DialectRegistry::with_defaults().with(PostgresDialect::new());
        let err = registry
            .detect(&ConnectionMetadata::new("PostgreSQL", "16"))
            .unwrap_err();
        assert!(matches!(
            err,
            DialectError::AmbiguousDialect { ref candidates, .. } if candidates == &["postgresql", "postgresql"]
        ));
    }

    #[test]
    fn test_by_short_name() {
        let registry = DialectRegistry::with_defaults();
        assert_eq!(registry.by_short_name("SQLite").unwrap().short_name(), "sqlite");
        assert!(registry.by_short_name("nope").is_err());
    }
}
