//! Error types shared by the statement model and the dialect providers.

use std::fmt;

/// Errors raised while selecting a dialect or rendering a statement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DialectError {
    /// The dialect cannot express the requested statement and no safe
    /// rewrite exists.
    #[error("{dialect} does not support {capability}")]
    Unsupported {
        /// Short name of the dialect that refused the statement.
        dialect: &'static str,
        /// Human readable description of the missing capability.
        capability: String,
    },

    /// No registered dialect recognises the connected database product.
    #[error("no dialect recognises database product '{product}'")]
    UnknownDatabase {
        /// Product name reported by the connection.
        product: String,
    },

    /// More than one dialect claims the connected database product.
    #[error("database product '{product}' is claimed by several dialects: {}", .candidates.join(", "))]
    AmbiguousDialect {
        /// Product name reported by the connection.
        product: String,
        /// Short names of every dialect that matched.
        candidates: Vec<&'static str>,
    },

    /// A dialect was requested by a name nobody registered.
    #[error("unknown dialect '{name}'")]
    UnknownDialect {
        /// The requested short name.
        name: String,
    },
}

/// A structural problem found before any database access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{subject}: {message}")]
pub struct ValidationError {
    /// What was being validated (changeset key, precondition, statement).
    pub subject: String,
    /// What is wrong with it.
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(subject: impl fmt::Display, message: impl Into<String>) -> Self {
        Self {
            subject: subject.to_string(),
            message: message.into(),
        }
    }
}
