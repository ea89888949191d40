//! Database transaction seam.
//!
//! The core crate stays storage-agnostic except for this one seam: services
//! that must compose several repository calls into a single atomic unit are
//! generic over [`DbTransactionExecutor`], and repositories expose
//! `*_in_tx` methods taking the transaction's connection. Pool construction,
//! migrations, and PRAGMA tuning live in the storage crate.

use std::sync::Arc;

use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::sqlite::SqliteConnection;
use diesel::Connection;

use crate::errors::{DatabaseError, Error, Result};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Trait for executing database transactions.
///
/// Everything performed inside the closure commits or rolls back as one unit;
/// the closure's own error is preserved and returned after rollback, so typed
/// failures (`LedgerError` and friends) survive the transaction boundary.
pub trait DbTransactionExecutor {
    /// Execute operations within a transaction and return the result.
    fn execute<F, T, E>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut DbConnection) -> std::result::Result<T, E>,
        E: Into<Error>;
}

impl DbTransactionExecutor for DbPool {
    fn execute<F, T, E>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut DbConnection) -> std::result::Result<T, E>,
        E: Into<Error>,
    {
        let mut conn = self
            .get()
            .map_err(|e| Error::Database(DatabaseError::ConnectionFailed(e.to_string())))?;

        let mut captured: Option<Error> = None;
        let result = conn.transaction(|tx_conn| {
            f(tx_conn).map_err(|e| {
                captured = Some(e.into());
                diesel::result::Error::RollbackTransaction
            })
        });

        match result {
            Ok(value) => Ok(value),
            Err(rollback) => Err(captured.unwrap_or_else(|| {
                Error::Database(DatabaseError::TransactionFailed(rollback.to_string()))
            })),
        }
    }
}

impl DbTransactionExecutor for Arc<DbPool> {
    fn execute<F, T, E>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut DbConnection) -> std::result::Result<T, E>,
        E: Into<Error>,
    {
        (**self).execute(f)
    }
}
