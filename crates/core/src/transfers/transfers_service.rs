use log::debug;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::transfers_model::{
    RepaymentRequest, SellOutcome, SellRequest, TransferOutcome, TransferRequest,
};
use super::transfers_traits::TransferExecutorTrait;
use crate::accounts::{Account, AccountRepositoryTrait};
use crate::db::{DbConnection, DbTransactionExecutor};
use crate::errors::{LedgerError, Result};
use crate::ledger;
use crate::transactions::{Transaction, TransactionKind, TransactionRepositoryTrait};
use crate::utils::Clock;
use crate::valuations::{NewPositionValuation, PositionValuationRepositoryTrait};

/// Performs transactional money moves between two accounts.
///
/// Both row loads happen in ascending account-id order, so two concurrent
/// transfers touching overlapping account pairs can never circular-wait on
/// each other's rows.
pub struct TransferExecutor<E: DbTransactionExecutor + Send + Sync + Clone> {
    account_repository: Arc<dyn AccountRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    valuation_repository: Arc<dyn PositionValuationRepositoryTrait>,
    clock: Arc<dyn Clock>,
    transaction_executor: E,
}

impl<E: DbTransactionExecutor + Send + Sync + Clone> TransferExecutor<E> {
    pub fn new(
        account_repository: Arc<dyn AccountRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        valuation_repository: Arc<dyn PositionValuationRepositoryTrait>,
        clock: Arc<dyn Clock>,
        transaction_executor: E,
    ) -> Self {
        Self {
            account_repository,
            transaction_repository,
            valuation_repository,
            clock,
            transaction_executor,
        }
    }

    /// Loads both accounts for update in ascending id order, returning them
    /// in (source, target) role order.
    fn load_pair_for_update(
        &self,
        user_id: &str,
        source_id: &str,
        target_id: &str,
        conn: &mut DbConnection,
    ) -> Result<(Account, Account)> {
        if source_id <= target_id {
            let source = self
                .account_repository
                .find_for_update(user_id, source_id, conn)?;
            let target = self
                .account_repository
                .find_for_update(user_id, target_id, conn)?;
            Ok((source, target))
        } else {
            let target = self
                .account_repository
                .find_for_update(user_id, target_id, conn)?;
            let source = self
                .account_repository
                .find_for_update(user_id, source_id, conn)?;
            Ok((source, target))
        }
    }

    /// Role and sufficiency checks for a transfer origin. Pure checks; the
    /// debit itself is applied separately so every validation can run before
    /// the first mutation.
    fn check_source(source: &Account, debit_amount: Decimal) -> Result<()> {
        if source.kind.is_credit() {
            return Err(LedgerError::InvalidAccountRole(format!(
                "credit account {} cannot originate a transfer",
                source.id
            ))
            .into());
        }
        if source.kind.is_investment() {
            return Err(LedgerError::InvalidAccountRole(format!(
                "investment account {} cannot originate a transfer; use sell",
                source.id
            ))
            .into());
        }
        if source.balance < debit_amount {
            return Err(LedgerError::InsufficientBalance {
                account_id: source.id.clone(),
                available: source.balance,
                required: debit_amount,
            }
            .into());
        }
        Ok(())
    }

    fn snapshot_position(
        &self,
        account_id: &str,
        shares: Decimal,
        cost_price: Decimal,
        net_value: Decimal,
        market_value: Decimal,
        conn: &mut DbConnection,
    ) -> Result<()> {
        self.valuation_repository.insert_in_tx(
            NewPositionValuation {
                account_id: account_id.to_string(),
                shares,
                cost_price,
                net_value,
                market_value,
                snapshot_at: self.clock.now(),
            },
            conn,
        )?;
        Ok(())
    }
}

#[async_trait]
impl<E: DbTransactionExecutor + Send + Sync + Clone> TransferExecutorTrait for TransferExecutor<E> {
    async fn transfer(&self, request: TransferRequest) -> Result<TransferOutcome> {
        self.transaction_executor
            .execute(|conn| self.execute_transfer_in_tx(&request, conn))
    }

    async fn sell(&self, request: SellRequest) -> Result<SellOutcome> {
        self.transaction_executor
            .execute(|conn| self.execute_sell_in_tx(&request, conn))
    }

    async fn repay(&self, request: RepaymentRequest) -> Result<Transaction> {
        request.validate()?;
        let now = self.clock.now();

        self.transaction_executor.execute(|conn| {
            let (source, credit) = self.load_pair_for_update(
                &request.user_id,
                &request.source_account_id,
                &request.credit_account_id,
                conn,
            )?;
            if !credit.kind.is_credit() {
                return Err(LedgerError::InvalidAccountRole(format!(
                    "repayment target {} is not a credit account",
                    credit.id
                ))
                .into());
            }
            Self::check_source(&source, request.amount)?;
            self.account_repository
                .adjust_balance_in_tx(&source.id, -request.amount, conn)?;

            // The credit side is log-only: outstanding balance is derived
            // from the transaction history, never stored.
            let repayment = Transaction {
                id: Uuid::new_v4().to_string(),
                user_id: request.user_id.clone(),
                account_id: credit.id.clone(),
                category_id: None,
                kind: TransactionKind::Repayment,
                amount: request.amount,
                date: request.date,
                source_account_id: Some(source.id.clone()),
                original_transaction_id: None,
                note: request.note.clone(),
                created_at: now,
                updated_at: now,
            };
            self.transaction_repository.insert_in_tx(repayment, conn)
        })
    }

    fn execute_transfer_in_tx(
        &self,
        request: &TransferRequest,
        conn: &mut DbConnection,
    ) -> Result<TransferOutcome> {
        request.validate()?;

        let (source, target) = self.load_pair_for_update(
            &request.user_id,
            &request.source_account_id,
            &request.target_account_id,
            conn,
        )?;

        Self::check_source(&source, request.debit_amount)?;
        if target.kind.is_credit() {
            return Err(LedgerError::InvalidAccountRole(format!(
                "credit account {} cannot receive a transfer; use repay",
                target.id
            ))
            .into());
        }
        if target.kind.is_investment() && target.net_value_or_zero() <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "investment account {} has no positive net value",
                target.id
            ))
            .into());
        }

        let source_balance_after = self
            .account_repository
            .adjust_balance_in_tx(&source.id, -request.debit_amount, conn)?
            .balance;

        if target.kind.is_investment() {
            let net_value = target.net_value_or_zero();
            let held = target.shares_or_zero();
            let shares_acquired = ledger::share_count(request.credit_amount, net_value);
            let total_shares = held + shares_acquired;
            let cost_price_after = ledger::weighted_average_cost(
                held,
                target.cost_price_or_zero(),
                shares_acquired,
                net_value,
            );
            let target_balance_after = ledger::market_value(total_shares, net_value);

            self.account_repository.update_position_in_tx(
                &target.id,
                total_shares,
                cost_price_after,
                net_value,
                target_balance_after,
                conn,
            )?;
            self.snapshot_position(
                &target.id,
                total_shares,
                cost_price_after,
                net_value,
                target_balance_after,
                conn,
            )?;

            debug!(
                "Transfer {} -> {} bought {} shares at {}",
                source.id, target.id, shares_acquired, net_value
            );
            return Ok(TransferOutcome {
                source_account_id: source.id,
                target_account_id: target.id,
                source_balance_after,
                target_balance_after,
                invested: true,
                shares_acquired,
                total_shares,
                cost_price_after,
                net_value,
                discount_rate: ledger::discount_rate(request.debit_amount, request.credit_amount),
            });
        }

        let target_after =
            self.account_repository
                .adjust_balance_in_tx(&target.id, request.credit_amount, conn)?;

        Ok(TransferOutcome {
            source_account_id: source.id,
            target_account_id: target.id,
            source_balance_after,
            target_balance_after: target_after.balance,
            invested: false,
            shares_acquired: Decimal::ZERO,
            total_shares: Decimal::ZERO,
            cost_price_after: Decimal::ZERO,
            net_value: Decimal::ZERO,
            discount_rate: ledger::discount_rate(request.debit_amount, request.credit_amount),
        })
    }

    fn execute_sell_in_tx(
        &self,
        request: &SellRequest,
        conn: &mut DbConnection,
    ) -> Result<SellOutcome> {
        request.validate()?;

        let (source, target) = self.load_pair_for_update(
            &request.user_id,
            &request.source_account_id,
            &request.target_account_id,
            conn,
        )?;

        if !source.kind.is_investment() {
            return Err(LedgerError::InvalidAccountRole(format!(
                "sell requires an investment source, got {}",
                source.kind
            ))
            .into());
        }
        if !target.kind.has_stored_balance() {
            return Err(LedgerError::InvalidAccountRole(format!(
                "sell proceeds cannot target a {} account",
                target.kind
            ))
            .into());
        }

        let held = source.shares_or_zero();
        if request.shares > held {
            return Err(LedgerError::InsufficientBalance {
                account_id: source.id.clone(),
                available: held,
                required: request.shares,
            }
            .into());
        }
        let net_value = source.net_value_or_zero();
        if net_value <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "investment account {} has no positive net value",
                source.id
            ))
            .into());
        }

        let proceeds = ledger::market_value(request.shares, net_value);
        let realized_profit =
            ledger::realized_profit(request.shares, net_value, source.cost_price_or_zero());
        let shares_remaining = held - request.shares;
        // Selling the whole position resets the cost basis.
        let cost_price_after = if shares_remaining.is_zero() {
            Decimal::ZERO
        } else {
            source.cost_price_or_zero()
        };
        let source_balance_after = ledger::market_value(shares_remaining, net_value);

        self.account_repository.update_position_in_tx(
            &source.id,
            shares_remaining,
            cost_price_after,
            net_value,
            source_balance_after,
            conn,
        )?;
        self.snapshot_position(
            &source.id,
            shares_remaining,
            cost_price_after,
            net_value,
            source_balance_after,
            conn,
        )?;

        let target_after = self
            .account_repository
            .adjust_balance_in_tx(&target.id, proceeds, conn)?;

        debug!(
            "Sold {} shares of {} for {} (realized {})",
            request.shares, source.id, proceeds, realized_profit
        );
        Ok(SellOutcome {
            source_account_id: source.id,
            target_account_id: target.id,
            proceeds,
            realized_profit,
            shares_sold: request.shares,
            shares_remaining,
            cost_price_after,
            net_value,
            target_balance_after: target_after.balance,
        })
    }
}
