//! Transaction repository and service traits.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::transactions_model::{
    NewTransaction, RefundInput, Transaction, TransactionKind, TransactionUpdate,
};
use crate::db::DbConnection;
use crate::errors::Result;

/// Persistence contract for ledger transactions.
///
/// All mutations take the caller's transaction connection: the service layer
/// pairs every row change with its balance delta inside one database
/// transaction.
pub trait TransactionRepositoryTrait: Send + Sync {
    /// Persists a fully-built transaction row inside the caller's transaction.
    fn insert_in_tx(&self, transaction: Transaction, conn: &mut DbConnection)
        -> Result<Transaction>;

    /// Replaces an existing row inside the caller's transaction.
    fn update_in_tx(
        &self,
        transaction: &Transaction,
        conn: &mut DbConnection,
    ) -> Result<Transaction>;

    /// Deletes a row inside the caller's transaction.
    fn delete_in_tx(&self, transaction_id: &str, conn: &mut DbConnection) -> Result<usize>;

    /// Loads a user's transaction inside the caller's transaction.
    fn find_in_tx(
        &self,
        user_id: &str,
        transaction_id: &str,
        conn: &mut DbConnection,
    ) -> Result<Transaction>;

    /// Retrieves a user's transaction by ID.
    fn get_by_id(&self, user_id: &str, transaction_id: &str) -> Result<Transaction>;

    /// Lists a user's transactions, optionally filtered by account and
    /// date range, newest first.
    fn list(
        &self,
        user_id: &str,
        account_id: Option<&str>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>>;

    /// Sums the amounts of all of an account's transactions of one kind.
    ///
    /// The credit calculator derives outstanding balances from these sums;
    /// the result must be insertion-order independent.
    fn sum_amount_by_kind(&self, account_id: &str, kind: TransactionKind) -> Result<Decimal>;

    /// Sums all refunds linked to the given original transaction, inside the
    /// caller's transaction.
    fn sum_refunds_for_in_tx(
        &self,
        original_transaction_id: &str,
        conn: &mut DbConnection,
    ) -> Result<Decimal>;
}

/// Business contract for ledger transaction operations.
#[async_trait]
pub trait TransactionServiceTrait: Send + Sync {
    /// Creates an income/expense entry, applying its balance delta.
    async fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction>;

    /// Updates an entry, reversing the old balance delta and applying the new
    /// one in the same database transaction.
    async fn update_transaction(&self, update: TransactionUpdate) -> Result<Transaction>;

    /// Deletes an entry, reversing its balance effect.
    async fn delete_transaction(&self, user_id: &str, transaction_id: &str) -> Result<()>;

    /// Refunds (part of) an expense, linked to the original entry.
    async fn refund(&self, input: RefundInput) -> Result<Transaction>;

    /// Retrieves a transaction by ID.
    fn get_transaction(&self, user_id: &str, transaction_id: &str) -> Result<Transaction>;

    /// Lists transactions with optional account/date filters.
    fn list_transactions(
        &self,
        user_id: &str,
        account_id: Option<&str>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>>;
}
