//! Transfer executor trait.

use async_trait::async_trait;

use super::transfers_model::{
    RepaymentRequest, SellOutcome, SellRequest, TransferOutcome, TransferRequest,
};
use crate::db::DbConnection;
use crate::errors::Result;
use crate::transactions::Transaction;

/// The single component allowed to move money between two accounts.
///
/// Investment buys, sells, repayments, and scheduled plan executions are all
/// instances of "debit A, credit B, optionally recompute derived fields"
/// through this executor. The `*_in_tx` forms participate in a caller's
/// transaction so outcome records can commit atomically with the move.
#[async_trait]
pub trait TransferExecutorTrait: Send + Sync {
    /// Moves money between two accounts in its own transaction.
    async fn transfer(&self, request: TransferRequest) -> Result<TransferOutcome>;

    /// Sells investment shares in its own transaction.
    async fn sell(&self, request: SellRequest) -> Result<SellOutcome>;

    /// Repays a credit account from a balance-backed account in its own
    /// transaction, returning the recorded repayment entry.
    async fn repay(&self, request: RepaymentRequest) -> Result<Transaction>;

    /// Transfer step inside the caller's transaction. Row loads follow
    /// ascending account-id order; any error leaves every touched row
    /// unchanged once the caller's transaction rolls back.
    fn execute_transfer_in_tx(
        &self,
        request: &TransferRequest,
        conn: &mut DbConnection,
    ) -> Result<TransferOutcome>;

    /// Sell step inside the caller's transaction.
    fn execute_sell_in_tx(
        &self,
        request: &SellRequest,
        conn: &mut DbConnection,
    ) -> Result<SellOutcome>;
}
