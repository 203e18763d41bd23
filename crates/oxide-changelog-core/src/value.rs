//! Literal values carried by statements and returned by queries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A SQL value.
///
/// `Function` holds a database function call such as `CURRENT_TIMESTAMP(3)`;
/// dialects rewrite current-timestamp calls into their own convention and
/// pass every other function through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlValue {
    /// NULL.
    Null,
    /// Boolean.
    Boolean(bool),
    /// Integer.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Text(String),
    /// Database function call.
    Function(String),
}

impl SqlValue {
    /// Returns true for NULL.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Integer view of the value. Text is parsed, floats are truncated.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            Self::Float(v) => Some(*v as i64),
            Self::Boolean(v) => Some(i64::from(*v)),
            Self::Text(v) => v.trim().parse().ok(),
            Self::Null | Self::Function(_) => None,
        }
    }

    /// Text view of the value; NULL has none.
    #[must_use]
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Text(v) | Self::Function(v) => Some(v.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Boolean view of the value. Integers are true when non-zero.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            Self::Integer(v) => Some(*v != 0),
            Self::Text(v) => match v.trim().to_ascii_lowercase().as_str() {
                "true" | "t" | "1" | "y" | "yes" => Some(true),
                "false" | "f" | "0" | "n" | "no" => Some(false),
                _ => None,
            },
            Self::Null | Self::Float(_) | Self::Function(_) => None,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) | Self::Function(v) => f.write_str(v),
        }
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
