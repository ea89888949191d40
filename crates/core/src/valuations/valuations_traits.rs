//! Valuation snapshot repository trait.

use crate::db::DbConnection;
use crate::errors::Result;

use super::valuations_model::{NewPositionValuation, PositionValuation};

/// Persistence contract for position valuation snapshots.
///
/// Snapshots are append-only; there is no update or delete.
pub trait PositionValuationRepositoryTrait: Send + Sync {
    /// Appends a snapshot inside the caller's transaction.
    fn insert_in_tx(
        &self,
        new_valuation: NewPositionValuation,
        conn: &mut DbConnection,
    ) -> Result<PositionValuation>;

    /// Lists snapshots for an account, newest first.
    fn list_by_account(&self, account_id: &str) -> Result<Vec<PositionValuation>>;
}
