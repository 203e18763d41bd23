//! Rendering of the statement model across every built-in dialect.

mod common;
use common::{dialect, notes_table, render, render_err, users_table, ALL_DIALECTS};

use oxide_changelog_core::dialect::{ConnectionMetadata, DialectRegistry, QuotingStrategy};
use oxide_changelog_core::dialect::{Dialect, PostgresDialect};
use oxide_changelog_core::identifier::{ObjectKind, TableIdentifier};
use oxide_changelog_core::statement::{
    ColumnDef, Condition, CreateIndexStatement, CreateSequenceStatement, CreateTableBuilder,
    DropIndexStatement, ForeignKeyConstraint, InsertStatement, ModifyDataTypeStatement,
    SelectStatement, UpdateStatement,
};
use oxide_changelog_core::types::LogicalType;
use oxide_changelog_core::{DialectError, SqlValue};

#[test]
fn create_table_per_dialect() {
    let expected = [
        (
            "postgresql",
            vec!["CREATE TABLE users (\n    id BIGINT GENERATED BY DEFAULT AS IDENTITY NOT NULL,\n    name VARCHAR(255) NOT NULL,\n    \"order\" INTEGER,\n    PRIMARY KEY (id)\n)"],
        ),
        (
            "mysql",
            vec!["CREATE TABLE users (\n    id BIGINT AUTO_INCREMENT NOT NULL,\n    name VARCHAR(255) NOT NULL,\n    `order` INTEGER,\n    PRIMARY KEY (id)\n)"],
        ),
        (
            "mariadb",
            vec!["CREATE TABLE users (\n    id BIGINT AUTO_INCREMENT NOT NULL,\n    name VARCHAR(255) NOT NULL,\n    `order` INTEGER,\n    PRIMARY KEY (id)\n)"],
        ),
        (
            "sqlite",
            vec!["CREATE TABLE users (\n    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,\n    name VARCHAR(255) NOT NULL,\n    \"order\" INTEGER\n)"],
        ),
        (
            "mssql",
            vec!["CREATE TABLE users (\n    id BIGINT IDENTITY NOT NULL,\n    name NVARCHAR(255) NOT NULL,\n    [order] INTEGER,\n    PRIMARY KEY (id)\n)"],
        ),
        (
            "oracle",
            vec!["CREATE TABLE users (\n    id NUMBER(19) GENERATED BY DEFAULT AS IDENTITY NOT NULL,\n    name VARCHAR2(255) NOT NULL,\n    \"order\" NUMBER(10),\n    PRIMARY KEY (id)\n)"],
        ),
        (
            "h2",
            vec!["CREATE TABLE users (\n    id BIGINT GENERATED BY DEFAULT AS IDENTITY NOT NULL,\n    name VARCHAR(255) NOT NULL,\n    \"order\" INTEGER,\n    PRIMARY KEY (id)\n)"],
        ),
        (
            "duckdb",
            vec![
                "CREATE SEQUENCE IF NOT EXISTS seq_users_id START 1 INCREMENT BY 1",
                "CREATE TABLE users (\n    id BIGINT DEFAULT nextval('seq_users_id') NOT NULL,\n    name VARCHAR NOT NULL,\n    \"order\" INTEGER,\n    PRIMARY KEY (id)\n)",
            ],
        ),
        (
            "xugu",
            vec!["CREATE TABLE users (\n    id BIGINT IDENTITY NOT NULL,\n    `name` VARCHAR(255) NOT NULL,\n    `order` INTEGER,\n    PRIMARY KEY (id)\n)"],
        ),
    ];
    for (dialect, sql) in expected {
        assert_eq!(render(dialect, users_table()), sql, "{dialect}");
    }
}

#[test]
fn unbounded_text_column_per_dialect() {
    let expected = [
        ("postgresql", "TEXT"),
        ("mysql", "LONGTEXT"),
        ("mariadb", "LONGTEXT"),
        ("sqlite", "TEXT"),
        ("mssql", "NVARCHAR(MAX)"),
        ("oracle", "CLOB"),
        ("h2", "CLOB"),
        ("duckdb", "VARCHAR"),
        ("xugu", "CLOB"),
    ];
    for (dialect, sql_type) in expected {
        assert_eq!(
            render(dialect, notes_table()),
            vec![format!("CREATE TABLE notes (\n    description {sql_type} NOT NULL\n)")],
            "{dialect}"
        );
    }
}

#[test]
fn rendering_is_deterministic() {
    for dialect in ALL_DIALECTS {
        assert_eq!(render(dialect, users_table()), render(dialect, users_table()));
    }
}

#[test]
fn current_timestamp_with_precision() {
    let expected = [
        ("postgresql", "CURRENT_TIMESTAMP(3)"),
        ("mysql", "NOW(3)"),
        ("mariadb", "NOW(3)"),
        ("sqlite", "strftime('%Y-%m-%d %H:%M:%f','now')"),
        ("mssql", "CAST(SYSDATETIME() AS DATETIME2(3))"),
        ("oracle", "CURRENT_TIMESTAMP(3)"),
        ("h2", "CURRENT_TIMESTAMP(3)"),
        ("duckdb", "CAST(NOW() AS TIMESTAMP_MS)"),
        ("xugu", "NOW(3)"),
    ];
    for (name, sql) in expected {
        let value = SqlValue::Function(String::from("CURRENT_TIMESTAMP(3)"));
        assert_eq!(dialect(name).value_literal(&value), sql, "{name}");
    }
}

#[test]
fn current_timestamp_without_precision() {
    let expected = [
        ("postgresql", "NOW()"),
        ("mysql", "NOW()"),
        ("sqlite", "CURRENT_TIMESTAMP"),
        ("mssql", "GETDATE()"),
        ("oracle", "SYSTIMESTAMP"),
        ("h2", "CURRENT_TIMESTAMP"),
        ("duckdb", "CURRENT_TIMESTAMP"),
        ("xugu", "NOW()"),
    ];
    for (name, sql) in expected {
        assert_eq!(dialect(name).format_current_timestamp("current_timestamp"), sql, "{name}");
    }
}

#[test]
fn on_update_expression_passes_through() {
    for name in ALL_DIALECTS {
        assert_eq!(
            dialect(name).format_current_timestamp("CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP"),
            "CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP",
            "{name}"
        );
    }
}

#[test]
fn default_value_uses_timestamp_translation() {
    let statement = CreateTableBuilder::new("events")
        .column(
            ColumnDef::new("created_at", LogicalType::Timestamp(Some(3)))
                .default_function("CURRENT_TIMESTAMP(3)"),
        )
        .build();
    assert_eq!(
        render("mysql", statement),
        vec!["CREATE TABLE events (\n    created_at DATETIME(3) DEFAULT NOW(3)\n)"]
    );
}

#[test]
fn quoting_strategies() {
    let legacy = PostgresDialect::new();
    assert_eq!(legacy.quote_identifier("users", ObjectKind::Table), "users");
    assert_eq!(legacy.quote_identifier("select", ObjectKind::Table), "\"select\"");
    assert_eq!(legacy.quote_identifier("my table", ObjectKind::Table), "\"my table\"");
    assert_eq!(legacy.quote_identifier("a\"b", ObjectKind::Column), "\"a\"\"b\"");

    let all = PostgresDialect::new().with_quoting(QuotingStrategy::QuoteAll);
    assert_eq!(all.quote_identifier("users", ObjectKind::Table), "\"users\"");
    assert_eq!(all.quote_identifier("lower(email)", ObjectKind::Column), "lower(email)");

    let reserved_only = PostgresDialect::new().with_quoting(QuotingStrategy::QuoteReservedOnly);
    assert_eq!(reserved_only.quote_identifier("my-table", ObjectKind::Table), "my-table");
    assert_eq!(reserved_only.quote_identifier("order", ObjectKind::Table), "\"order\"");
}

#[test]
fn schema_qualification() {
    let table = TableIdentifier::new("users").with_schema("app");
    let expected = [
        ("postgresql", "app.users"),
        ("mysql", "app.users"),
        ("mssql", "app.users"),
        ("oracle", "app.users"),
        ("xugu", "app.users"),
    ];
    for (name, sql) in expected {
        assert_eq!(dialect(name).escape_table_name(&table), sql, "{name}");
    }
    let with_catalog = table.clone().with_catalog("crm");
    assert_eq!(dialect("mysql").escape_table_name(&with_catalog), "crm.users");
    assert_eq!(dialect("mssql").escape_table_name(&with_catalog), "crm.app.users");
    assert_eq!(dialect("xugu").escape_table_name(&with_catalog), "app.users");
}

#[test]
fn data_statements() {
    let insert = InsertStatement::new("users")
        .value("name", "it's")
        .value("active", true)
        .value("manager_id", SqlValue::Null);
    assert_eq!(
        render("postgresql", insert.clone()),
        vec!["INSERT INTO users (name, active, manager_id) VALUES ('it''s', TRUE, NULL)"]
    );
    assert_eq!(
        render("sqlite", insert),
        vec!["INSERT INTO users (name, active, manager_id) VALUES ('it''s', 1, NULL)"]
    );

    let update = UpdateStatement::new("users")
        .set("name", "bob")
        .filter(Condition::eq("id", 7))
        .filter(Condition::is_null("deleted_at"));
    assert_eq!(
        render("postgresql", update),
        vec!["UPDATE users SET name = 'bob' WHERE id = 7 AND deleted_at IS NULL"]
    );

    let select = SelectStatement::columns("users", ["id", "order"])
        .filter(Condition::not_eq("id", 1))
        .order_by("order", true);
    assert_eq!(
        render("mysql", select),
        vec!["SELECT id, `order` FROM users WHERE id <> 1 ORDER BY `order` DESC"]
    );
}

#[test]
fn unsupported_combinations() {
    let sequence = CreateSequenceStatement::new("seq");
    for name in ["mysql", "sqlite", "xugu"] {
        assert!(
            matches!(render_err(name, sequence.clone()), DialectError::Unsupported { .. }),
            "{name}"
        );
    }

    let modify = ModifyDataTypeStatement {
        table: "users".into(),
        column: "age".into(),
        new_type: LogicalType::BigInt,
    };
    assert!(matches!(
        render_err("sqlite", modify),
        DialectError::Unsupported { dialect: "sqlite", .. }
    ));

    let deferred = CreateTableBuilder::new("child")
        .column(ColumnDef::new("parent_id", LogicalType::Integer))
        .foreign_key(ForeignKeyConstraint::new(["parent_id"], "parent", ["id"]).initially_deferred())
        .build();
    assert!(matches!(
        render_err("mysql", deferred.clone()),
        DialectError::Unsupported { dialect: "mysql", .. }
    ));
    assert!(render("postgresql", deferred)[0]
        .ends_with("REFERENCES parent (id) DEFERRABLE INITIALLY DEFERRED\n)"));

    let mut index = CreateIndexStatement::new("idx_users_name", "users", ["name"]);
    index.if_not_exists = true;
    for name in ["mysql", "oracle", "xugu"] {
        assert!(matches!(render_err(name, index.clone()), DialectError::Unsupported { .. }), "{name}");
    }
    assert_eq!(
        render("mssql", index),
        vec!["IF NOT EXISTS (SELECT 1 FROM sys.indexes WHERE name = N'idx_users_name' AND object_id = OBJECT_ID(N'users'))\nCREATE INDEX idx_users_name ON users (name)"]
    );
}

#[test]
fn drop_index_forms() {
    let statement = DropIndexStatement {
        name: "idx_email".into(),
        table: TableIdentifier::new("users").with_schema("app"),
    };
    let expected = [
        ("postgresql", "DROP INDEX app.idx_email"),
        ("mysql", "DROP INDEX idx_email ON app.users"),
        ("mssql", "DROP INDEX idx_email ON app.users"),
        ("xugu", "DROP INDEX app.users.idx_email"),
    ];
    for (name, sql) in expected {
        assert_eq!(render(name, statement.clone()), vec![sql], "{name}");
    }
}

#[test]
fn table_exists_queries_are_read_only_counts() {
    for name in ALL_DIALECTS {
        let sql = dialect(name).table_exists(&oxide_changelog_core::statement::TableExistsStatement {
            table: "oxide_changelog".into(),
        });
        assert!(sql.starts_with("SELECT COUNT(*) FROM"), "{name}: {sql}");
        assert!(sql.contains("'oxide_changelog'"), "{name}: {sql}");
    }
}

#[test]
fn registry_claims_each_product_exactly_once() {
    let registry = DialectRegistry::with_defaults();
    let samples = [
        ("PostgreSQL", "16.1", "postgresql"),
        ("MySQL", "8.4.0", "mysql"),
        ("MySQL", "5.5.5-10.6.12-MariaDB", "mariadb"),
        ("SQLite", "3.45.0", "sqlite"),
        ("Microsoft SQL Server", "16.0.1000", "mssql"),
        ("Oracle", "19c", "oracle"),
        ("H2", "2.2.224", "h2"),
        ("DuckDB", "1.1.0", "duckdb"),
        ("XuguDB", "12.0.0", "xugu"),
    ];
    for (product, version, short_name) in samples {
        let metadata = ConnectionMetadata::new(product, version);
        let matching: Vec<_> = registry
            .dialects()
            .iter()
            .filter(|d| d.identify(&metadata))
            .map(|d| d.short_name())
            .collect();
        assert_eq!(matching, vec![short_name], "{product} {version}");
    }
}
