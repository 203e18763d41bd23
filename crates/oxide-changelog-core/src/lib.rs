//! # oxide-changelog-core
//!
//! The pure half of a changeset execution engine: a dialect-neutral
//! statement model, changesets with checksums and preconditions, and the
//! dialect providers that turn statements into SQL for a given database.
//!
//! Nothing in this crate touches a database. The `oxide-changelog` crate
//! adds connections, the tracking table, the lock and the engine.
//!
//! ## Rendering a statement
//!
//! ```rust
//! use oxide_changelog_core::dialect::{Dialect, PostgresDialect, XuguDialect};
//! use oxide_changelog_core::statement::{ColumnDef, CreateTableBuilder, Statement};
//! use oxide_changelog_core::types::LogicalType;
//!
//! let statement = Statement::from(
//!     CreateTableBuilder::new("users")
//!         .column(ColumnDef::new("id", LogicalType::BigInt).primary_key().auto_increment())
//!         .column(ColumnDef::new("name", LogicalType::Varchar(255)).not_null())
//!         .build(),
//! );
//!
//! let sql = PostgresDialect::new().render(&statement).unwrap();
//! assert_eq!(
//!     sql[0],
//!     "CREATE TABLE users (\n    id BIGINT GENERATED BY DEFAULT AS IDENTITY NOT NULL,\n    name VARCHAR(255) NOT NULL,\n    PRIMARY KEY (id)\n)"
//! );
//!
//! // `name` is a reserved word on XuguDB and gets quoted there.
//! let sql = XuguDialect::new().render(&statement).unwrap();
//! assert!(sql[0].contains("`name` VARCHAR(255) NOT NULL"));
//! ```
//!
//! ## Changesets
//!
//! ```rust
//! use oxide_changelog_core::changeset::ChangeSet;
//! use oxide_changelog_core::statement::Statement;
//!
//! let changeset = ChangeSet::new("1", "alice", "db/changelog.json")
//!     .statement(Statement::raw("INSERT INTO settings (k, v) VALUES ('a', 'b')"));
//! assert_eq!(changeset.key().to_string(), "db/changelog.json::1::alice");
//! assert!(changeset.checksum().unwrap().to_string().starts_with("2:"));
//! ```

pub mod changeset;
pub mod checksum;
pub mod dialect;
pub mod error;
pub mod identifier;
pub mod precondition;
pub mod statement;
pub mod types;
pub mod value;

pub use changeset::{ChangeLog, ChangeSet, ChangesetKey};
pub use checksum::{CheckSum, ChecksumVersion};
pub use dialect::{ConnectionMetadata, Dialect, DialectRegistry, QuotingStrategy};
pub use error::{DialectError, ValidationError};
pub use identifier::{ObjectKind, TableIdentifier};
pub use precondition::{OnFail, Precondition, Preconditions};
pub use statement::Statement;
pub use types::LogicalType;
pub use value::SqlValue;
