//! SQLite storage bootstrap, schema migrations and units of work.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the catalog core.
//! - Apply schema migrations in deterministic order.
//! - Provide the transaction boundary used by every mutating operation.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write catalog data before migrations succeed.
//! - Returned connections enforce foreign keys.

use thiserror::Error;

pub mod migrations;
mod open;
pub mod unit_of_work;

pub use open::{open_db, open_db_in_memory};
pub use unit_of_work::{begin_read, run_in_unit_of_work, TxState, UnitOfWork};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}
