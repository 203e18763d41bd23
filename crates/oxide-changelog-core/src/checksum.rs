//! Versioned changeset checksums.
//!
//! A checksum is a SHA-256 over the canonical JSON encoding of a changeset's
//! normalized statements, rendered as `<version>:<hex>`. Only statements
//! contribute; comments, contexts, preconditions and rollback statements do
//! not.
//!
//! | Version | Normalization                                          |
//! |---------|--------------------------------------------------------|
//! | 1       | raw SQL trimmed                                        |
//! | 2       | raw SQL trimmed and internal whitespace collapsed      |

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::statement::{RawSqlStatement, Statement};

/// Checksum algorithm generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChecksumVersion {
    /// Raw SQL trimmed only.
    V1,
    /// Raw SQL whitespace-insensitive.
    V2,
}

impl ChecksumVersion {
    /// The version new checksums are computed with.
    pub const CURRENT: Self = Self::V2;

    /// Numeric form stored in the tracking table.
    #[must_use]
    pub const fn number(self) -> u8 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }

    /// Parses the numeric form.
    #[must_use]
    pub const fn from_number(number: i64) -> Option<Self> {
        match number {
            1 => Some(Self::V1),
            2 => Some(Self::V2),
            _ => None,
        }
    }

    fn normalize(self, statement: &Statement) -> Statement {
        match statement {
            Statement::RawSql(raw) => {
                let sql = match self {
                    Self::V1 => raw.sql.trim().to_string(),
                    Self::V2 => raw.sql.split_whitespace().collect::<Vec<_>>().join(" "),
                };
                Statement::RawSql(RawSqlStatement { sql })
            }
            other => other.clone(),
        }
    }
}

/// A checksum together with the algorithm version that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CheckSum {
    version: ChecksumVersion,
    value: String,
}

impl CheckSum {
    /// Computes the checksum of `statements` with the given algorithm.
    ///
    /// # Errors
    ///
    /// Returns an error if a statement cannot be encoded as JSON.
    pub fn compute(
        version: ChecksumVersion,
        statements: &[Statement],
    ) -> Result<Self, serde_json::Error> {
        let mut hasher = Sha256::new();
        for statement in statements {
            let encoded = serde_json::to_vec(&version.normalize(statement))?;
            hasher.update(&encoded);
            hasher.update(b"\n");
        }
        Ok(Self {
            version,
            value: hex::encode(hasher.finalize()),
        })
    }

    /// Algorithm version.
    #[must_use]
    pub const fn version(&self) -> ChecksumVersion {
        self.version
    }

    /// Hex digest without the version prefix.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Parses a stored checksum. A bare digest takes `fallback_version`.
    #[must_use]
    pub fn parse_stored(stored: &str, fallback_version: Option<ChecksumVersion>) -> Option<Self> {
        let stored = stored.trim();
        if stored.is_empty() {
            return None;
        }
        match stored.split_once(':') {
            Some(_) => stored.parse().ok(),
            None => Some(Self {
                version: fallback_version.unwrap_or(ChecksumVersion::V1),
                value: stored.to_ascii_lowercase(),
            }),
        }
    }
}

impl fmt::Display for CheckSum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.version.number(), self.value)
    }
}

/// Error parsing a `<version>:<hex>` checksum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid checksum '{0}'")]
pub struct ParseCheckSumError(String);

impl FromStr for CheckSum {
    type Err = ParseCheckSumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (version, value) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| ParseCheckSumError(s.to_string()))?;
        let version = version
            .parse::<i64>()
            .ok()
            .and_then(ChecksumVersion::from_number)
            .ok_or_else(|| ParseCheckSumError(s.to_string()))?;
        if value.is_empty() || !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseCheckSumError(s.to_string()));
        }
        Ok(Self {
            version,
            value: value.to_ascii_lowercase(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::CreateTableBuilder;

    fn raw(sql: &str) -> Vec<Statement> {
        vec![Statement::raw(sql)]
    }

    #[test]
    fn test_display_and_parse() {
        let sum = CheckSum::compute(ChecksumVersion::CURRENT, &raw("SELECT 1")).unwrap();
        let text = sum.to_string();
        assert!(text.starts_with("2:"));
        assert_eq!(text.len(), 2 + 64);
        assert_eq!(text.parse::<CheckSum>().unwrap(), sum);
    }

    #[test]
    fn test_whitespace_insensitive_in_current_version() {
        let a = CheckSum::compute(ChecksumVersion::V2, &raw("UPDATE t  SET a = 1\n WHERE b = 2")).unwrap();
        let b = CheckSum::compute(ChecksumVersion::V2, &raw("UPDATE t SET a = 1 WHERE b = 2;")).unwrap();
        let c = CheckSum::compute(ChecksumVersion::V2, &raw("UPDATE t SET a = 1 WHERE b = 2")).unwrap();
        assert_eq!(a, c);
        assert_ne!(b, c);
    }

    #[test]
    fn test_legacy_version_keeps_internal_whitespace() {
        let a = CheckSum::compute(ChecksumVersion::V1, &raw("SELECT  1")).unwrap();
        let b = CheckSum::compute(ChecksumVersion::V1, &raw("  SELECT  1  ")).unwrap();
        let c = CheckSum::compute(ChecksumVersion::V1, &raw("SELECT 1")).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_sensitive_to_semantic_change() {
        let a = CheckSum::compute(
            ChecksumVersion::CURRENT,
            &[CreateTableBuilder::new("users").build().into()],
        )
        .unwrap();
        let b = CheckSum::compute(
            ChecksumVersion::CURRENT,
            &[CreateTableBuilder::new("people").build().into()],
        )
        .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_statement_order_matters() {
        let forward = CheckSum::compute(ChecksumVersion::CURRENT, &[Statement::raw("A"), Statement::raw("B")]).unwrap();
        let reversed = CheckSum::compute(ChecksumVersion::CURRENT, &[Statement::raw("B"), Statement::raw("A")]).unwrap();
        assert_ne!(forward, reversed);
    }

    #[test]
    fn test_parse_stored_bare_digest() {
        let sum = CheckSum::parse_stored("ABCDEF", Some(ChecksumVersion::V1)).unwrap();
        assert_eq!(sum.version(), ChecksumVersion::V1);
        assert_eq!(sum.value(), "abcdef");
        assert!(CheckSum::parse_stored("  ", None).is_none());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("9:abc".parse::<CheckSum>().is_err());
        assert!("2:xyz".parse::<CheckSum>().is_err());
        assert!("abc".parse::<CheckSum>().is_err());
    }
}
