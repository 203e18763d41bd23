//! Column-level ALTER TABLE statements.

use serde::{Deserialize, Serialize};

use super::table::ColumnDef;
use crate::identifier::TableIdentifier;
use crate::types::LogicalType;

/// ALTER TABLE ... ADD column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddColumnStatement {
    pub table: TableIdentifier,
    pub column: ColumnDef,
}

/// ALTER TABLE ... DROP COLUMN.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropColumnStatement {
    pub table: TableIdentifier,
    pub column: String,
}

/// Rename a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameColumnStatement {
    pub table: TableIdentifier,
    pub old_name: String,
    pub new_name: String,
}

/// Change the type of an existing column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifyDataTypeStatement {
    pub table: TableIdentifier,
    pub column: String,
    pub new_type: LogicalType,
}

/// Add or drop a NOT NULL constraint.
///
/// Some dialects restate the whole column definition to change its
/// nullability and need `column_type` for that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetNullableStatement {
    pub table: TableIdentifier,
    pub column: String,
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_type: Option<LogicalType>,
}
