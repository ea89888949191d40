//! Account repository and service traits.
//!
//! These traits define the contract for account operations without any
//! database-specific types beyond the transaction-connection seam, allowing
//! for different storage implementations.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::accounts_model::{Account, AccountUpdate, NewAccount};
use crate::db::DbConnection;
use crate::errors::Result;
use crate::valuations::PositionValuation;

/// Trait defining the contract for Account repository operations.
///
/// The `*_in_tx` methods participate in the caller's transaction and are the
/// only way balances are mutated; callers never assign balance fields
/// directly.
#[async_trait]
pub trait AccountRepositoryTrait: Send + Sync {
    /// Creates a new account.
    async fn create(&self, new_account: NewAccount) -> Result<Account>;

    /// Updates an existing account's metadata (never its balance).
    async fn update(&self, account_update: AccountUpdate) -> Result<Account>;

    /// Retrieves an account owned by the given user.
    fn get_by_id(&self, user_id: &str, account_id: &str) -> Result<Account>;

    /// Lists a user's accounts, optionally filtered by active status.
    fn list(&self, user_id: &str, is_active_filter: Option<bool>) -> Result<Vec<Account>>;

    /// Loads an account inside the caller's transaction for update.
    ///
    /// Operations touching two accounts must call this in ascending account-id
    /// order so concurrent transfers on overlapping pairs cannot deadlock.
    fn find_for_update(
        &self,
        user_id: &str,
        account_id: &str,
        conn: &mut DbConnection,
    ) -> Result<Account>;

    /// Atomically adds `delta` to the stored balance, inside the caller's
    /// transaction. Returns the account with the balance after the change.
    fn adjust_balance_in_tx(
        &self,
        account_id: &str,
        delta: Decimal,
        conn: &mut DbConnection,
    ) -> Result<Account>;

    /// Replaces the stored balance. Reserved for balance reconciliation;
    /// every other mutation goes through `adjust_balance_in_tx`.
    fn set_balance_in_tx(
        &self,
        account_id: &str,
        balance: Decimal,
        conn: &mut DbConnection,
    ) -> Result<()>;

    /// Updates an investment account's position fields and derived balance
    /// (`shares * net_value`), inside the caller's transaction.
    fn update_position_in_tx(
        &self,
        account_id: &str,
        shares: Decimal,
        cost_price: Decimal,
        net_value: Decimal,
        balance: Decimal,
        conn: &mut DbConnection,
    ) -> Result<()>;
}

/// Trait defining the contract for Account service operations.
#[async_trait]
pub trait AccountServiceTrait: Send + Sync {
    /// Creates a new account with business validation.
    async fn create_account(&self, new_account: NewAccount) -> Result<Account>;

    /// Updates an existing account with business validation.
    async fn update_account(&self, account_update: AccountUpdate) -> Result<Account>;

    /// Updates an investment account's per-share net value and recomputes its
    /// derived balance, appending a valuation snapshot in the same
    /// transaction.
    async fn update_net_value(
        &self,
        user_id: &str,
        account_id: &str,
        net_value: Decimal,
    ) -> Result<Account>;

    /// Retrieves an account by ID.
    fn get_account(&self, user_id: &str, account_id: &str) -> Result<Account>;

    /// Lists a user's accounts with optional active filtering.
    fn list_accounts(&self, user_id: &str, is_active_filter: Option<bool>)
        -> Result<Vec<Account>>;

    /// Lists only active accounts.
    fn get_active_accounts(&self, user_id: &str) -> Result<Vec<Account>>;

    /// Lists valuation snapshots for an investment account, newest first.
    fn get_valuation_history(
        &self,
        user_id: &str,
        account_id: &str,
    ) -> Result<Vec<PositionValuation>>;
}
