mod common;

use common::{
    create_table, create_test_engine, history, insert_row, raw, row_count, table_exists,
    test_config, CHANGELOG,
};
use oxide_changelog::prelude::*;
use oxide_changelog_core::statement::CreateSequenceStatement;
use oxide_changelog_core::{CheckSum, ChecksumVersion};

fn abc() -> Vec<ChangeSet> {
    vec![
        create_table("A", "people"),
        insert_row("B", "people", 1, "ada"),
        insert_row("C", "people", 2, "grace"),
    ]
}

#[tokio::test]
async fn test_fresh_database_applies_everything_in_order() {
    let mut engine = create_test_engine().await;
    let report = engine.update(&abc()).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.counts.executed, 3);
    assert_eq!(report.counts.total, 3);
    assert_eq!(row_count(&mut engine, "people").await, 2);

    let records = history(&mut engine).await;
    let orders: Vec<_> = records.iter().map(|r| (r.key.id.as_str(), r.order_executed)).collect();
    assert_eq!(orders, vec![("A", 1), ("B", 2), ("C", 3)]);
    assert!(records.iter().all(|r| r.exec_type == ExecType::Executed));
    assert!(records
        .iter()
        .all(|r| r.deployment_id.as_deref() == Some(report.deployment_id.as_str())));
    assert_eq!(records[0].deployed_by.as_deref(), Some("tester"));
}

#[tokio::test]
async fn test_second_run_is_a_no_op() {
    let mut engine = create_test_engine().await;
    engine.update(&abc()).await.unwrap();

    let report = engine.update(&abc()).await.unwrap();
    assert!(report.is_success());
    assert!(report.applied.is_empty());
    assert_eq!(report.counts.previously_ran, 3);
    assert_eq!(history(&mut engine).await.len(), 3);
    assert_eq!(row_count(&mut engine, "people").await, 2);
}

#[tokio::test]
async fn test_modified_changeset_halts_with_checksum_mismatch() {
    let mut engine = create_test_engine().await;
    engine.update(&abc()).await.unwrap();

    let mut changesets = abc();
    changesets[1] = insert_row("B", "people", 1, "lovelace");
    changesets.push(insert_row("D", "people", 3, "edsger"));

    let report = engine.update(&changesets).await.unwrap();
    let halt = match &report.outcome {
        RunOutcome::HaltedOnChecksumMismatch(halt) => halt,
        other => panic!("Expected checksum mismatch, got {other:?}"),
    };
    assert_eq!(halt.changeset.id, "B");
    assert!(matches!(halt.error, ChangelogError::ChecksumMismatch { .. }));
    assert_eq!(report.counts.previously_ran, 1);
    assert_eq!(report.counts.failed, 1);
    assert_eq!(history(&mut engine).await.len(), 3);
    assert_eq!(row_count(&mut engine, "people").await, 2);

    let err = report.into_result().unwrap_err();
    assert!(err.to_string().contains("db/changelog.json::B::alice"));
}

#[tokio::test]
async fn test_ignore_checksum_mismatch_carries_on() {
    let mut engine = create_test_engine().await;
    engine.update(&abc()).await.unwrap();

    let mut engine = create_engine_sharing(engine, test_config().ignore_checksum_mismatch(true));
    let mut changesets = abc();
    changesets[1] = insert_row("B", "people", 1, "lovelace");
    changesets.push(insert_row("D", "people", 3, "edsger"));

    let report = engine.update(&changesets).await.unwrap();
    assert!(report.is_success());
    assert_eq!(report.counts.executed, 1);
    assert_eq!(row_count(&mut engine, "people").await, 3);
}

/// Rebuilds an engine with a new configuration over the same connection.
fn create_engine_sharing(engine: ChangesetEngine, config: EngineConfig) -> ChangesetEngine {
    ChangesetEngine::new(engine.into_executor(), config)
}

#[tokio::test]
async fn test_whitespace_only_edit_is_already_ran() {
    let mut engine = create_test_engine().await;
    let before = vec![raw("1", "CREATE TABLE notes (id INTEGER, body TEXT)")];
    engine.update(&before).await.unwrap();

    let after = vec![raw("1", "  CREATE TABLE notes\n    (id INTEGER,   body TEXT)\n")];
    let report = engine.update(&after).await.unwrap();
    assert!(report.is_success());
    assert_eq!(report.counts.previously_ran, 1);
    assert!(report.applied.is_empty());
}

#[tokio::test]
async fn test_run_always_reruns_every_time() {
    let mut engine = create_test_engine().await;
    let changesets = vec![
        create_table("1", "audit"),
        ChangeSet::new("2", "alice", CHANGELOG)
            .statement(Statement::raw("INSERT INTO audit (name) VALUES ('run')"))
            .run_always(),
    ];
    engine.update(&changesets).await.unwrap();

    let report = engine.update(&changesets).await.unwrap();
    assert_eq!(report.counts.reran, 1);
    assert_eq!(report.counts.previously_ran, 1);
    assert_eq!(row_count(&mut engine, "audit").await, 2);

    let records = history(&mut engine).await;
    let last = records.last().unwrap();
    assert_eq!(last.key.id, "2");
    assert_eq!(last.exec_type, ExecType::Reran);
    assert_eq!(last.order_executed, 3);
}

#[tokio::test]
async fn test_run_on_change_reruns_modified_changeset() {
    let mut engine = create_test_engine().await;
    let view = |sql: &str| {
        ChangeSet::new("view", "alice", CHANGELOG)
            .statement(Statement::raw(sql))
            .run_on_change()
    };
    engine
        .update(&[create_table("1", "people"), view("CREATE VIEW v AS SELECT id FROM people")])
        .await
        .unwrap();

    let report = engine
        .update(&[
            create_table("1", "people"),
            ChangeSet::new("view", "alice", CHANGELOG)
                .statement(Statement::raw("DROP VIEW v"))
                .statement(Statement::raw("CREATE VIEW v AS SELECT id, name FROM people"))
                .run_on_change(),
        ])
        .await
        .unwrap();
    assert!(report.is_success());
    assert_eq!(report.counts.reran, 1);
}

#[tokio::test]
async fn test_checksum_upgrade_from_older_version() {
    let mut engine = create_test_engine().await;
    let changesets = abc();
    engine.update(&changesets).await.unwrap();

    let old = CheckSum::compute(ChecksumVersion::V1, &changesets[0].statements).unwrap();
    let tracking = engine.tracking().clone();
    tracking
        .update_checksum(engine.executor(), &changesets[0].key(), &old)
        .await
        .unwrap();

    let report = engine.update(&changesets).await.unwrap();
    assert!(report.is_success());
    assert_eq!(report.counts.previously_ran, 3);

    let records = history(&mut engine).await;
    assert_eq!(records[0].checksum, Some(changesets[0].checksum().unwrap()));
    assert_eq!(records.len(), 3);
}

#[tokio::test]
async fn test_cleared_checksums_are_recomputed() {
    let mut engine = create_test_engine().await;
    let changesets = abc();
    engine.update(&changesets).await.unwrap();

    assert_eq!(engine.clear_checksums().await.unwrap(), 3);
    assert!(history(&mut engine).await.iter().all(|r| r.checksum.is_none()));

    let report = engine.update(&changesets).await.unwrap();
    assert!(report.is_success());
    assert!(report.applied.is_empty());
    let records = history(&mut engine).await;
    for (record, changeset) in records.iter().zip(&changesets) {
        assert_eq!(record.checksum, Some(changeset.checksum().unwrap()));
    }
}

#[tokio::test]
async fn test_valid_checksum_accepts_modified_changeset() {
    let mut engine = create_test_engine().await;
    let original = abc();
    engine.update(&original).await.unwrap();

    let stored = original[1].checksum().unwrap().to_string();
    let mut changesets = abc();
    changesets[1] = insert_row("B", "people", 1, "lovelace").valid_checksum(stored);

    let report = engine.update(&changesets).await.unwrap();
    assert!(report.is_success());
    assert_eq!(report.counts.previously_ran, 3);
}

#[tokio::test]
async fn test_unsupported_statement_halts_run() {
    let mut engine = create_test_engine().await;
    let changesets = vec![
        create_table("1", "people"),
        ChangeSet::new("2", "alice", CHANGELOG).statement(CreateSequenceStatement::new("seq")),
        create_table("3", "pets"),
    ];

    let report = engine.update(&changesets).await.unwrap();
    let halt = match &report.outcome {
        RunOutcome::HaltedOnExecutionError(halt) => halt,
        other => panic!("Expected execution halt, got {other:?}"),
    };
    assert_eq!(halt.changeset.id, "2");
    assert_eq!(halt.statements_executed, 0);
    assert!(matches!(halt.error, ChangelogError::UnsupportedCapability { .. }));
    assert_eq!(report.counts.failed, 1);
    assert_eq!(history(&mut engine).await.len(), 1);
    assert!(!table_exists(&mut engine, "pets").await);
}

#[tokio::test]
async fn test_database_error_reports_statements_executed() {
    let mut engine = create_test_engine().await;
    let changesets = vec![ChangeSet::new("1", "alice", CHANGELOG)
        .statement(Statement::raw("CREATE TABLE first_table (id INTEGER)"))
        .statement(Statement::raw("CREATE TABLE first_table (id INTEGER)"))];

    let report = engine.update(&changesets).await.unwrap();
    let halt = report.halt().expect("run should halt");
    assert_eq!(halt.statements_executed, 1);
    match &halt.error {
        ChangelogError::DatabaseExecution { changeset, sql, .. } => {
            assert_eq!(changeset.as_ref().map(|c| c.id.as_str()), Some("1"));
            assert!(sql.contains("first_table"));
        }
        other => panic!("Unexpected error: {other}"),
    }
    assert!(history(&mut engine).await.is_empty());

    // The lock is free again.
    assert_eq!(engine.list_locks().await.unwrap(), None);
}

#[tokio::test]
async fn test_validation_fails_before_touching_database() {
    let mut engine = create_test_engine().await;
    let changesets = vec![create_table("1", "people"), create_table("1", "people")];

    let err = engine.update(&changesets).await.unwrap_err();
    assert!(matches!(err, ChangelogError::Validation(_)));
    assert!(!table_exists(&mut engine, "oxide_changelog").await);
    assert!(!table_exists(&mut engine, "oxide_changelog_lock").await);
}

#[tokio::test]
async fn test_contexts_and_dbms_filter_changesets() {
    let engine = create_test_engine().await;
    let mut engine = create_engine_sharing(engine, test_config().context("test"));
    let changesets = vec![
        create_table("1", "people"),
        insert_row("2", "people", 1, "fixture").context("test"),
        insert_row("3", "people", 2, "seed").context("prod"),
        raw("4", "CREATE SEQUENCE pg_only").dbms("postgresql"),
        raw("5", "CREATE TABLE not_on_sqlite (id INTEGER)").dbms("!sqlite"),
    ];

    let report = engine.update(&changesets).await.unwrap();
    assert!(report.is_success());
    assert_eq!(report.counts.executed, 2);
    assert_eq!(report.counts.skipped.get(&SkipReason::Context), Some(&1));
    assert_eq!(report.counts.skipped.get(&SkipReason::Dbms), Some(&2));
    assert_eq!(report.counts.skipped_total(), 3);
    assert_eq!(row_count(&mut engine, "people").await, 1);
}

#[tokio::test]
async fn test_update_sql_captures_without_applying() {
    let mut engine = create_test_engine().await;
    let sql = engine.update_sql(&abc()).await.unwrap();

    assert!(sql.iter().any(|s| s.starts_with("CREATE TABLE") && s.contains("oxide_changelog")));
    assert!(sql.iter().any(|s| s.contains("people")));
    assert!(sql.iter().any(|s| s.starts_with("-- Changeset db/changelog.json::A::alice")));
    assert!(!table_exists(&mut engine, "people").await);
    assert!(!table_exists(&mut engine, "oxide_changelog").await);
    assert!(!engine.executor().is_dry_run());
}

#[tokio::test]
async fn test_update_sql_skips_applied_changesets() {
    let mut engine = create_test_engine().await;
    let changesets = abc();
    engine.update(&changesets[..2]).await.unwrap();

    let sql = engine.update_sql(&changesets).await.unwrap();
    assert!(!sql.iter().any(|s| s.contains("::A::")));
    assert!(sql.iter().any(|s| s.contains("::C::")));
    assert!(sql.iter().any(|s| s.contains("grace")));
}

#[tokio::test]
async fn test_status_classifies_each_changeset() {
    let mut engine = create_test_engine().await;
    let changesets = abc();
    engine.update(&changesets[..1]).await.unwrap();

    let statuses = engine.status(&changesets).await.unwrap();
    let classifications: Vec<_> = statuses.iter().map(|s| s.classification.clone()).collect();
    assert_eq!(
        classifications,
        vec![
            Classification::AlreadyRan,
            Classification::Pending,
            Classification::Pending
        ]
    );
    assert!(statuses.iter().all(|s| s.skip.is_none()));
}

#[tokio::test]
async fn test_rollback_sql() {
    let engine = create_test_engine().await;
    let changeset = create_table("1", "people").rollback(Statement::raw("DROP TABLE people"));
    assert_eq!(engine.render_rollback(&changeset).unwrap(), vec!["DROP TABLE people"]);

    let err = engine.render_rollback(&create_table("2", "pets")).unwrap_err();
    assert!(matches!(err, ChangelogError::InvalidState(_)));
}
