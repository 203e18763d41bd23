#![allow(dead_code)]

use std::sync::Arc;

use oxide_changelog_core::dialect::{Dialect, DialectRegistry};
use oxide_changelog_core::statement::{ColumnDef, CreateTableBuilder, CreateTableStatement, Statement};
use oxide_changelog_core::types::LogicalType;
use oxide_changelog_core::DialectError;

pub fn dialect(short_name: &str) -> Arc<dyn Dialect> {
    DialectRegistry::with_defaults()
        .by_short_name(short_name)
        .unwrap_or_else(|e| panic!("Missing dialect {short_name}: {e}"))
}

pub fn render(short_name: &str, statement: impl Into<Statement>) -> Vec<String> {
    let statement = statement.into();
    dialect(short_name)
        .render(&statement)
        .unwrap_or_else(|e| panic!("Failed to render {statement:?} for {short_name}: {e}"))
}

pub fn render_err(short_name: &str, statement: impl Into<Statement>) -> DialectError {
    let statement = statement.into();
    dialect(short_name)
        .render(&statement)
        .expect_err(&format!("Expected {short_name} to reject {statement:?}"))
}

/// `users(id BIGINT auto-increment primary key, name VARCHAR(255) NOT NULL, order INTEGER)`.
pub fn users_table() -> CreateTableStatement {
    CreateTableBuilder::new("users")
        .column(ColumnDef::new("id", LogicalType::BigInt).primary_key().auto_increment())
        .column(ColumnDef::new("name", LogicalType::Varchar(255)).not_null())
        .column(ColumnDef::new("order", LogicalType::Integer))
        .build()
}

/// `notes(description TEXT NOT NULL)`.
pub fn notes_table() -> CreateTableStatement {
    CreateTableBuilder::new("notes")
        .column(ColumnDef::new("description", LogicalType::Text).not_null())
        .build()
}

pub const ALL_DIALECTS: [&str; 9] = [
    "postgresql",
    "mysql",
    "mariadb",
    "sqlite",
    "mssql",
    "oracle",
    "h2",
    "duckdb",
    "xugu",
];
