mod common;

use common::{create_table, create_test_engine, history, insert_row, raw, row_count, CHANGELOG};
use oxide_changelog::prelude::*;

/// A changeset gated on a table that never exists.
fn gated(id: &str, on_fail: OnFail) -> ChangeSet {
    insert_row(id, "people", 10, id).preconditions(
        Preconditions::new(on_fail).condition(Precondition::TableExists {
            table: "missing".into(),
        }),
    )
}

fn with_gate(on_fail: OnFail) -> Vec<ChangeSet> {
    vec![
        create_table("1", "people"),
        gated("2", on_fail),
        insert_row("3", "people", 1, "after"),
    ]
}

#[tokio::test]
async fn test_halt_stops_the_run() {
    let mut engine = create_test_engine().await;
    let report = engine.update(&with_gate(OnFail::Halt)).await.unwrap();

    let halt = match &report.outcome {
        RunOutcome::HaltedOnPrecondition(halt) => halt,
        other => panic!("Expected precondition halt, got {other:?}"),
    };
    assert_eq!(halt.changeset.id, "2");
    assert_eq!(report.counts.failed, 1);
    assert_eq!(report.counts.executed, 1);
    match &halt.error {
        ChangelogError::PreconditionFailure { message, .. } => {
            assert_eq!(message, "Table missing does not exist");
        }
        other => panic!("Unexpected error: {other}"),
    }
    assert_eq!(history(&mut engine).await.len(), 1);
    assert_eq!(row_count(&mut engine, "people").await, 0);
}

#[tokio::test]
async fn test_continue_skips_and_retries_next_run() {
    let mut engine = create_test_engine().await;
    let report = engine.update(&with_gate(OnFail::Continue)).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.counts.executed, 2);
    assert_eq!(report.counts.skipped.get(&SkipReason::PreconditionFailed), Some(&1));
    assert!(report.warnings.is_empty());

    let ids: Vec<_> = history(&mut engine).await.into_iter().map(|r| r.key.id).collect();
    assert_eq!(ids, vec!["1", "3"]);

    // Still unrecorded, so evaluated again.
    let report = engine.update(&with_gate(OnFail::Continue)).await.unwrap();
    assert_eq!(report.counts.skipped.get(&SkipReason::PreconditionFailed), Some(&1));
}

#[tokio::test]
async fn test_mark_ran_records_without_executing() {
    let mut engine = create_test_engine().await;
    let report = engine.update(&with_gate(OnFail::MarkRan)).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.counts.mark_ran, 1);
    assert_eq!(report.counts.executed, 2);
    assert_eq!(row_count(&mut engine, "people").await, 1);

    let records = history(&mut engine).await;
    assert_eq!(records[1].key.id, "2");
    assert_eq!(records[1].exec_type, ExecType::MarkRan);
    assert_eq!(records[1].order_executed, 2);

    let report = engine.update(&with_gate(OnFail::MarkRan)).await.unwrap();
    assert_eq!(report.counts.previously_ran, 3);
}

#[tokio::test]
async fn test_warn_skips_with_warning() {
    let mut engine = create_test_engine().await;
    let report = engine.update(&with_gate(OnFail::Warn)).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.counts.skipped.get(&SkipReason::PreconditionWarned), Some(&1));
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("::2::alice"));
    assert!(report.warnings[0].contains("Table missing does not exist"));
    assert_eq!(history(&mut engine).await.len(), 2);
}

#[tokio::test]
async fn test_passing_preconditions_run_the_changeset() {
    let mut engine = create_test_engine().await;
    let changesets = vec![
        create_table("1", "people"),
        insert_row("2", "people", 1, "ada").preconditions(
            Preconditions::new(OnFail::Halt)
                .condition(Precondition::TableExists {
                    table: "people".into(),
                })
                .condition(Precondition::RowCount {
                    table: "people".into(),
                    expected_rows: Some(0),
                })
                .condition(Precondition::ChangesetExecuted {
                    id: "1".into(),
                    author: "alice".into(),
                    path: CHANGELOG.into(),
                })
                .condition(Precondition::Dbms {
                    dbms: "postgresql, sqlite".into(),
                }),
        ),
    ];

    let report = engine.update(&changesets).await.unwrap();
    assert!(report.is_success());
    assert_eq!(report.counts.executed, 2);
}

#[tokio::test]
async fn test_precondition_error_halts_even_under_continue() {
    let mut engine = create_test_engine().await;
    let changesets = vec![insert_row("1", "people", 1, "ada").preconditions(
        Preconditions::new(OnFail::Continue).condition(Precondition::RowCount {
            table: "people".into(),
            expected_rows: Some(0),
        }),
    )];

    let report = engine.update(&changesets).await.unwrap();
    let halt = match &report.outcome {
        RunOutcome::HaltedOnPrecondition(halt) => halt,
        other => panic!("Expected precondition halt, got {other:?}"),
    };
    assert!(matches!(halt.error, ChangelogError::PreconditionError { .. }));
    assert_eq!(report.counts.failed, 1);
    assert!(history(&mut engine).await.is_empty());
}

#[tokio::test]
async fn test_on_fail_message_replaces_reason() {
    let mut engine = create_test_engine().await;
    let changesets = vec![raw("1", "SELECT 1").preconditions(
        Preconditions::new(OnFail::Halt)
            .on_fail_message("people must be migrated first")
            .condition(Precondition::SqlCheck {
                sql: "SELECT 2".into(),
                expected_result: "3".into(),
            }),
    )];

    let report = engine.update(&changesets).await.unwrap();
    let err = report.into_result().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Precondition failed for db/changelog.json::1::alice: people must be migrated first"
    );
}
