//! Explicit transaction handles for mutating operations.
//!
//! # Responsibility
//! - Group every validation read and write of one operation into a single
//!   atomic unit.
//! - Guarantee rollback on every error exit path.
//!
//! # Invariants
//! - A unit of work moves `Idle -> Began -> Committed | RolledBack` exactly once.
//! - Write units use `BEGIN IMMEDIATE`, so the write lock is held from the
//!   first uniqueness check to commit.
//! - A unit of work dropped without commit is rolled back by rusqlite.

use super::{DbError, DbResult};
use log::{debug, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::fmt::Display;
use std::ops::Deref;
use std::time::Instant;

/// Lifecycle state of one unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxState {
    /// No transaction has been opened yet.
    Idle,
    /// `BEGIN` succeeded; writes are pending.
    Began,
    /// All writes became visible atomically.
    Committed,
    /// No write of this unit is visible.
    RolledBack,
}

/// Open write transaction bound to one operation.
///
/// Dereferences to [`Connection`] so repository helpers can run statements
/// against it directly.
pub struct UnitOfWork<'conn> {
    tx: Transaction<'conn>,
    state: TxState,
    operation: &'static str,
    started_at: Instant,
}

impl<'conn> UnitOfWork<'conn> {
    /// Begins an immediate write transaction on a borrowed connection.
    pub fn begin(conn: &'conn Connection, operation: &'static str) -> DbResult<Self> {
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
        debug!("event=tx_begin module=db operation={operation}");
        Ok(Self {
            tx,
            state: TxState::Began,
            operation,
            started_at: Instant::now(),
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> TxState {
        self.state
    }

    /// Commits all pending writes.
    pub fn commit(self) -> DbResult<TxState> {
        let operation = self.operation;
        let started_at = self.started_at;
        self.tx.commit()?;
        debug!(
            "event=tx_commit module=db status=ok operation={} duration_ms={}",
            operation,
            started_at.elapsed().as_millis()
        );
        Ok(TxState::Committed)
    }

    /// Discards all pending writes.
    pub fn rollback(self) -> DbResult<TxState> {
        let operation = self.operation;
        let started_at = self.started_at;
        self.tx.rollback()?;
        debug!(
            "event=tx_rollback module=db status=ok operation={} duration_ms={}",
            operation,
            started_at.elapsed().as_millis()
        );
        Ok(TxState::RolledBack)
    }
}

impl Deref for UnitOfWork<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.tx
    }
}

/// Runs `work` inside one unit of work.
///
/// Commits when `work` returns `Ok`; rolls back before returning when it
/// returns `Err`. A failed rollback is logged and the original error wins.
pub fn run_in_unit_of_work<T, E, F>(
    conn: &Connection,
    operation: &'static str,
    work: F,
) -> Result<T, E>
where
    F: FnOnce(&UnitOfWork<'_>) -> Result<T, E>,
    E: From<DbError> + Display,
{
    let uow = UnitOfWork::begin(conn, operation)?;
    match work(&uow) {
        Ok(value) => {
            uow.commit()?;
            Ok(value)
        }
        Err(err) => {
            debug!("event=tx_abort module=db operation={operation} reason={err}");
            if let Err(rollback_err) = uow.rollback() {
                warn!(
                    "event=tx_rollback module=db status=error operation={operation} error={rollback_err}"
                );
            }
            Err(err)
        }
    }
}

/// Begins a deferred read transaction so a count and a windowed select
/// observe the same snapshot.
pub fn begin_read(conn: &Connection) -> DbResult<Transaction<'_>> {
    Ok(Transaction::new_unchecked(
        conn,
        TransactionBehavior::Deferred,
    )?)
}
