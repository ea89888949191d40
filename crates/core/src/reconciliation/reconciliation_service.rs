use log::info;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::reconciliation_model::{
    calculate_difference, classify_difference, BalanceAdjustment, NewBalanceAdjustment,
    ReconciliationPreview,
};
use super::reconciliation_traits::{BalanceAdjustmentRepositoryTrait, ReconciliationServiceTrait};
use crate::accounts::AccountRepositoryTrait;
use crate::db::DbTransactionExecutor;
use crate::errors::{LedgerError, Result};
use crate::ledger::round_money;

/// Service applying manual corrections between a user-asserted actual
/// balance and the stored balance.
pub struct ReconciliationService<E: DbTransactionExecutor + Send + Sync + Clone> {
    account_repository: Arc<dyn AccountRepositoryTrait>,
    adjustment_repository: Arc<dyn BalanceAdjustmentRepositoryTrait>,
    transaction_executor: E,
}

impl<E: DbTransactionExecutor + Send + Sync + Clone> ReconciliationService<E> {
    pub fn new(
        account_repository: Arc<dyn AccountRepositoryTrait>,
        adjustment_repository: Arc<dyn BalanceAdjustmentRepositoryTrait>,
        transaction_executor: E,
    ) -> Self {
        Self {
            account_repository,
            adjustment_repository,
            transaction_executor,
        }
    }
}

#[async_trait]
impl<E: DbTransactionExecutor + Send + Sync + Clone> ReconciliationServiceTrait
    for ReconciliationService<E>
{
    fn preview(
        &self,
        user_id: &str,
        account_id: &str,
        actual_balance: Decimal,
    ) -> Result<ReconciliationPreview> {
        let account = self.account_repository.get_by_id(user_id, account_id)?;
        let actual_balance = round_money(actual_balance);
        let difference = calculate_difference(actual_balance, account.balance);
        Ok(ReconciliationPreview {
            account_id: account.id,
            current_balance: account.balance,
            actual_balance,
            difference,
            kind: classify_difference(difference),
        })
    }

    async fn execute(
        &self,
        user_id: &str,
        account_id: &str,
        actual_balance: Decimal,
        note: Option<String>,
    ) -> Result<BalanceAdjustment> {
        let account_repository = self.account_repository.clone();
        let adjustment_repository = self.adjustment_repository.clone();
        let user_id = user_id.to_string();
        let account_id = account_id.to_string();
        let actual_balance = round_money(actual_balance);

        self.transaction_executor.execute(move |conn| {
            let account = account_repository.find_for_update(&user_id, &account_id, conn)?;
            if !account.kind.has_stored_balance() {
                return Err::<_, crate::errors::Error>(LedgerError::InvalidAccountRole(format!(
                    "account {} has a derived balance and cannot be reconciled",
                    account.id
                ))
                .into());
            }

            // Recompute against the freshly-locked value, not whatever the
            // caller previewed earlier.
            let difference = calculate_difference(actual_balance, account.balance);
            if difference.is_zero() {
                return Err(LedgerError::NoAdjustmentNeeded.into());
            }

            account_repository.set_balance_in_tx(&account.id, actual_balance, conn)?;
            let adjustment = adjustment_repository.insert_in_tx(
                NewBalanceAdjustment {
                    account_id: account.id.clone(),
                    previous_balance: account.balance,
                    new_balance: actual_balance,
                    difference,
                    note,
                },
                conn,
            )?;
            info!(
                "Reconciled account {}: {} -> {} ({})",
                account.id, account.balance, actual_balance, difference
            );
            Ok(adjustment)
        })
    }

    fn list_adjustments(&self, user_id: &str, account_id: &str) -> Result<Vec<BalanceAdjustment>> {
        let account = self.account_repository.get_by_id(user_id, account_id)?;
        self.adjustment_repository.list_by_account(&account.id)
    }
}
