//! Reconciliation repository and service traits.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::reconciliation_model::{
    BalanceAdjustment, NewBalanceAdjustment, ReconciliationPreview,
};
use crate::db::DbConnection;
use crate::errors::Result;

/// Persistence contract for balance adjustment audit rows. Append-only.
pub trait BalanceAdjustmentRepositoryTrait: Send + Sync {
    /// Appends an adjustment row inside the caller's transaction.
    fn insert_in_tx(
        &self,
        new_adjustment: NewBalanceAdjustment,
        conn: &mut DbConnection,
    ) -> Result<BalanceAdjustment>;

    /// Lists adjustments for an account, newest first.
    fn list_by_account(&self, account_id: &str) -> Result<Vec<BalanceAdjustment>>;
}

/// Business contract for quick-balance reconciliation.
#[async_trait]
pub trait ReconciliationServiceTrait: Send + Sync {
    /// Computes the correction that `execute` would apply, without mutating
    /// anything.
    fn preview(
        &self,
        user_id: &str,
        account_id: &str,
        actual_balance: Decimal,
    ) -> Result<ReconciliationPreview>;

    /// Applies the correction: replaces the stored balance with
    /// `actual_balance` and appends exactly one audit row, in one
    /// transaction. The difference is recomputed against the freshly-locked
    /// balance; an exactly-zero difference is rejected.
    async fn execute(
        &self,
        user_id: &str,
        account_id: &str,
        actual_balance: Decimal,
        note: Option<String>,
    ) -> Result<BalanceAdjustment>;

    /// Lists an account's adjustment history.
    fn list_adjustments(&self, user_id: &str, account_id: &str) -> Result<Vec<BalanceAdjustment>>;
}
