#![allow(dead_code)]

use std::time::Duration;

use oxide_changelog::prelude::*;
use oxide_changelog_core::statement::{
    ColumnDef, CreateTableBuilder, InsertStatement, SelectStatement, TableExistsStatement,
};
use oxide_changelog_core::LogicalType;

pub const CHANGELOG: &str = "db/changelog.json";

/// Lock settings short enough for tests.
pub fn test_lock_config(name: &str) -> LockConfig {
    LockConfig::default()
        .locked_by(name)
        .wait_timeout(Duration::from_millis(300))
        .poll_interval(Duration::from_millis(10))
        .max_poll_interval(Duration::from_millis(50))
}

pub fn test_config() -> EngineConfig {
    EngineConfig::new().lock(test_lock_config("tester"))
}

pub async fn create_test_engine() -> ChangesetEngine {
    create_engine("sqlite::memory:", test_config()).await
}

pub async fn create_engine(url: &str, config: EngineConfig) -> ChangesetEngine {
    ChangesetEngine::connect(url, config, None)
        .await
        .unwrap_or_else(|e| panic!("Failed to connect to {url}: {e}"))
}

/// `CREATE TABLE <name>(id INTEGER PRIMARY KEY, name VARCHAR(100))`.
pub fn create_table(id: &str, table: &str) -> ChangeSet {
    ChangeSet::new(id, "alice", CHANGELOG).statement(
        CreateTableBuilder::new(table)
            .column(ColumnDef::new("id", LogicalType::Integer).primary_key())
            .column(ColumnDef::new("name", LogicalType::Varchar(100)))
            .build(),
    )
}

pub fn insert_row(id: &str, table: &str, row_id: i64, name: &str) -> ChangeSet {
    ChangeSet::new(id, "alice", CHANGELOG).statement(
        InsertStatement::new(table)
            .value("id", row_id)
            .value("name", name),
    )
}

pub fn raw(id: &str, sql: &str) -> ChangeSet {
    ChangeSet::new(id, "alice", CHANGELOG).statement(Statement::raw(sql))
}

pub async fn row_count(engine: &mut ChangesetEngine, table: &str) -> i64 {
    engine
        .executor()
        .query_for_long(&SelectStatement::count(table).into())
        .await
        .unwrap_or_else(|e| panic!("Failed to count {table}: {e}"))
}

pub async fn table_exists(engine: &mut ChangesetEngine, table: &str) -> bool {
    let statement = Statement::TableExists(TableExistsStatement {
        table: table.into(),
    });
    engine
        .executor()
        .query_for_long(&statement)
        .await
        .unwrap_or_else(|e| panic!("Failed to check {table}: {e}"))
        > 0
}

pub async fn history(engine: &mut ChangesetEngine) -> Vec<TrackingRecord> {
    engine.history().await.expect("Failed to read history")
}
