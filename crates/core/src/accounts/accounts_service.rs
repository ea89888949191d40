use log::debug;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::accounts_model::{Account, AccountUpdate, NewAccount};
use super::accounts_traits::{AccountRepositoryTrait, AccountServiceTrait};
use crate::db::DbTransactionExecutor;
use crate::errors::{LedgerError, Result};
use crate::ledger;
use crate::utils::Clock;
use crate::valuations::{NewPositionValuation, PositionValuation, PositionValuationRepositoryTrait};

/// Service for managing accounts (generic over the transaction executor).
pub struct AccountService<E: DbTransactionExecutor + Send + Sync + Clone> {
    repository: Arc<dyn AccountRepositoryTrait>,
    valuation_repository: Arc<dyn PositionValuationRepositoryTrait>,
    clock: Arc<dyn Clock>,
    transaction_executor: E,
}

impl<E: DbTransactionExecutor + Send + Sync + Clone> AccountService<E> {
    /// Creates a new AccountService instance.
    pub fn new(
        repository: Arc<dyn AccountRepositoryTrait>,
        valuation_repository: Arc<dyn PositionValuationRepositoryTrait>,
        clock: Arc<dyn Clock>,
        transaction_executor: E,
    ) -> Self {
        Self {
            repository,
            valuation_repository,
            clock,
            transaction_executor,
        }
    }
}

#[async_trait]
impl<E: DbTransactionExecutor + Send + Sync + Clone> AccountServiceTrait for AccountService<E> {
    async fn create_account(&self, new_account: NewAccount) -> Result<Account> {
        new_account.validate()?;
        debug!(
            "Creating account '{}' of kind {}",
            new_account.name, new_account.kind
        );
        self.repository.create(new_account).await
    }

    async fn update_account(&self, account_update: AccountUpdate) -> Result<Account> {
        account_update.validate()?;
        self.repository.update(account_update).await
    }

    async fn update_net_value(
        &self,
        user_id: &str,
        account_id: &str,
        net_value: Decimal,
    ) -> Result<Account> {
        if net_value <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "net value must be positive, got {net_value}"
            ))
            .into());
        }

        let repository = self.repository.clone();
        let valuation_repository = self.valuation_repository.clone();
        let user_id = user_id.to_string();
        let account_id = account_id.to_string();
        let now = self.clock.now();

        self.transaction_executor.execute(move |conn| {
            let account = repository.find_for_update(&user_id, &account_id, conn)?;
            if !account.kind.is_investment() {
                return Err::<_, crate::errors::Error>(LedgerError::InvalidAccountRole(format!(
                    "account {account_id} is not an investment account"
                ))
                .into());
            }

            let shares = account.shares_or_zero();
            let cost_price = account.cost_price_or_zero();
            let net_value = ledger::round_quantity(net_value);
            let balance = ledger::market_value(shares, net_value);

            repository.update_position_in_tx(
                &account_id,
                shares,
                cost_price,
                net_value,
                balance,
                conn,
            )?;
            valuation_repository.insert_in_tx(
                NewPositionValuation {
                    account_id: account_id.clone(),
                    shares,
                    cost_price,
                    net_value,
                    market_value: balance,
                    snapshot_at: now,
                },
                conn,
            )?;

            Ok(Account {
                balance,
                current_net_value: Some(net_value),
                updated_at: now,
                ..account
            })
        })
    }

    fn get_account(&self, user_id: &str, account_id: &str) -> Result<Account> {
        self.repository.get_by_id(user_id, account_id)
    }

    fn list_accounts(
        &self,
        user_id: &str,
        is_active_filter: Option<bool>,
    ) -> Result<Vec<Account>> {
        self.repository.list(user_id, is_active_filter)
    }

    fn get_active_accounts(&self, user_id: &str) -> Result<Vec<Account>> {
        self.list_accounts(user_id, Some(true))
    }

    fn get_valuation_history(
        &self,
        user_id: &str,
        account_id: &str,
    ) -> Result<Vec<PositionValuation>> {
        // Ownership check before touching the snapshot table.
        let account = self.repository.get_by_id(user_id, account_id)?;
        self.valuation_repository.list_by_account(&account.id)
    }
}
