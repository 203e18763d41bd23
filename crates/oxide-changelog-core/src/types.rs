//! Logical column types.
//!
//! Statements describe columns with a [`LogicalType`]; each dialect maps it
//! to native type text through `Dialect::map_type`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Dialect-neutral column type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogicalType {
    /// Boolean.
    Boolean,
    /// 16-bit integer.
    SmallInt,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInt,
    /// Exact numeric with precision and scale.
    Decimal(u16, u16),
    /// Single precision float.
    Real,
    /// Double precision float.
    Double,
    /// Fixed-length character string.
    Char(u32),
    /// Variable-length character string with a maximum length.
    Varchar(u32),
    /// Unbounded text.
    Text,
    /// Calendar date.
    Date,
    /// Time of day.
    Time,
    /// Timestamp without time zone, optional fractional-second precision.
    Timestamp(Option<u8>),
    /// Timestamp with time zone, optional fractional-second precision.
    TimestampTz(Option<u8>),
    /// Binary large object.
    Blob,
    /// UUID.
    Uuid,
    /// JSON document.
    Json,
    /// Native type text passed through verbatim.
    Custom(String),
}

impl LogicalType {
    /// Returns true for the integer family.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Self::SmallInt | Self::Integer | Self::BigInt)
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => f.write_str("boolean"),
            Self::SmallInt => f.write_str("smallint"),
            Self::Integer => f.write_str("integer"),
            Self::BigInt => f.write_str("bigint"),
            Self::Decimal(p, s) => write!(f, "decimal({p}, {s})"),
            Self::Real => f.write_str("real"),
            Self::Double => f.write_str("double"),
            Self::Char(n) => write!(f, "char({n})"),
            Self::Varchar(n) => write!(f, "varchar({n})"),
            Self::Text => f.write_str("text"),
            Self::Date => f.write_str("date"),
            Self::Time => f.write_str("time"),
            Self::Timestamp(None) => f.write_str("timestamp"),
            Self::Timestamp(Some(p)) => write!(f, "timestamp({p})"),
            Self::TimestampTz(None) => f.write_str("timestamptz"),
            Self::TimestampTz(Some(p)) => write!(f, "timestamptz({p})"),
            Self::Blob => f.write_str("blob"),
            Self::Uuid => f.write_str("uuid"),
            Self::Json => f.write_str("json"),
            Self::Custom(native) => f.write_str(native),
        }
    }
}
