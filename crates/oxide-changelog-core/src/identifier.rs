//! Three-part object naming.
//!
//! Every table-scoped statement carries a [`TableIdentifier`] so that schema
//! and catalog qualification is computed in exactly one place: the dialect's
//! `escape_table_name`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Catalog, schema and table name of a database table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TableIdentifier {
    /// Catalog (database) name, if qualified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
    /// Schema name, if qualified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Table name.
    pub table: String,
}

impl TableIdentifier {
    /// Creates an unqualified table identifier.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            catalog: None,
            schema: None,
            table: table.into(),
        }
    }

    /// Sets the schema.
    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Sets the catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Schema name, treating empty strings as absent.
    #[must_use]
    pub fn schema_name(&self) -> Option<&str> {
        self.schema.as_deref().filter(|s| !s.is_empty())
    }

    /// Catalog name, treating empty strings as absent.
    #[must_use]
    pub fn catalog_name(&self) -> Option<&str> {
        self.catalog.as_deref().filter(|s| !s.is_empty())
    }

    /// Returns a sibling identifier in the same catalog and schema.
    #[must_use]
    pub fn sibling(&self, table: impl Into<String>) -> Self {
        Self {
            catalog: self.catalog.clone(),
            schema: self.schema.clone(),
            table: table.into(),
        }
    }
}

impl From<&str> for TableIdentifier {
    fn from(table: &str) -> Self {
        Self::new(table)
    }
}

impl From<String> for TableIdentifier {
    fn from(table: String) -> Self {
        Self::new(table)
    }
}

impl fmt::Display for TableIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(catalog) = self.catalog_name() {
            write!(f, "{catalog}.")?;
        }
        if let Some(schema) = self.schema_name() {
            write!(f, "{schema}.")?;
        }
        f.write_str(&self.table)
    }
}

/// Kind of database object an identifier names; quoting rules may differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Catalog.
    Catalog,
    /// Schema.
    Schema,
    /// Table.
    Table,
    /// Column.
    Column,
    /// Index.
    Index,
    /// Sequence.
    Sequence,
    /// Named constraint (primary key, unique, foreign key).
    Constraint,
}
