use log::debug;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::transactions_model::{
    balance_effect, NewTransaction, RefundInput, Transaction, TransactionKind, TransactionUpdate,
};
use super::transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};
use crate::accounts::AccountRepositoryTrait;
use crate::db::DbTransactionExecutor;
use crate::errors::{Error, LedgerError, Result, ValidationError};
use crate::utils::Clock;

/// Service owning the only mutation path for ledger entries.
pub struct TransactionService<E: DbTransactionExecutor + Send + Sync + Clone> {
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    account_repository: Arc<dyn AccountRepositoryTrait>,
    clock: Arc<dyn Clock>,
    transaction_executor: E,
}

impl<E: DbTransactionExecutor + Send + Sync + Clone> TransactionService<E> {
    pub fn new(
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        account_repository: Arc<dyn AccountRepositoryTrait>,
        clock: Arc<dyn Clock>,
        transaction_executor: E,
    ) -> Self {
        Self {
            transaction_repository,
            account_repository,
            clock,
            transaction_executor,
        }
    }
}

#[async_trait]
impl<E: DbTransactionExecutor + Send + Sync + Clone> TransactionServiceTrait
    for TransactionService<E>
{
    async fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        new_transaction.validate()?;

        let now = self.clock.now();
        let transaction = Transaction {
            id: new_transaction
                .id
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            user_id: new_transaction.user_id,
            account_id: new_transaction.account_id,
            category_id: new_transaction.category_id,
            kind: new_transaction.kind,
            amount: new_transaction.amount,
            date: new_transaction.date,
            source_account_id: None,
            original_transaction_id: None,
            note: new_transaction.note,
            created_at: now,
            updated_at: now,
        };

        let transaction_repository = self.transaction_repository.clone();
        let account_repository = self.account_repository.clone();

        self.transaction_executor.execute(move |conn| {
            let account = account_repository.find_for_update(
                &transaction.user_id,
                &transaction.account_id,
                conn,
            )?;
            if account.kind.is_investment() {
                return Err(LedgerError::InvalidAccountRole(format!(
                    "account {} is an investment account; use buy/sell",
                    account.id
                ))
                .into());
            }
            if account.kind.is_credit() && transaction.kind == TransactionKind::Income {
                return Err(LedgerError::InvalidAccountRole(format!(
                    "income cannot target credit account {}",
                    account.id
                ))
                .into());
            }

            if let Some(delta) = balance_effect(account.kind, transaction.kind, transaction.amount)
            {
                account_repository.adjust_balance_in_tx(&transaction.account_id, delta, conn)?;
            }
            transaction_repository.insert_in_tx(transaction, conn)
        })
    }

    async fn update_transaction(&self, update: TransactionUpdate) -> Result<Transaction> {
        update.validate()?;

        let now = self.clock.now();
        let transaction_repository = self.transaction_repository.clone();
        let account_repository = self.account_repository.clone();

        self.transaction_executor.execute(move |conn| {
            let existing = transaction_repository.find_in_tx(&update.user_id, &update.id, conn)?;

            match existing.kind {
                TransactionKind::Repayment => {
                    // A repayment's stored-balance effect lives on its source
                    // account: shrinking the repayment returns money there,
                    // growing it debits more.
                    if let Some(source_account_id) = existing.source_account_id.as_deref() {
                        account_repository.find_for_update(
                            &update.user_id,
                            source_account_id,
                            conn,
                        )?;
                        let delta = existing.amount - update.amount;
                        if !delta.is_zero() {
                            account_repository.adjust_balance_in_tx(
                                source_account_id,
                                delta,
                                conn,
                            )?;
                        }
                    }
                }
                _ => {
                    let account = account_repository.find_for_update(
                        &update.user_id,
                        &existing.account_id,
                        conn,
                    )?;
                    let old_delta = balance_effect(account.kind, existing.kind, existing.amount)
                        .unwrap_or(Decimal::ZERO);
                    let new_delta = balance_effect(account.kind, existing.kind, update.amount)
                        .unwrap_or(Decimal::ZERO);
                    let net = new_delta - old_delta;
                    if !net.is_zero() {
                        account_repository.adjust_balance_in_tx(&existing.account_id, net, conn)?;
                    }
                }
            }

            let updated = Transaction {
                category_id: update.category_id.clone(),
                amount: update.amount,
                date: update.date,
                note: update.note.clone(),
                updated_at: now,
                ..existing
            };
            transaction_repository.update_in_tx(&updated, conn)
        })
    }

    async fn delete_transaction(&self, user_id: &str, transaction_id: &str) -> Result<()> {
        let user_id = user_id.to_string();
        let transaction_id = transaction_id.to_string();
        let transaction_repository = self.transaction_repository.clone();
        let account_repository = self.account_repository.clone();

        self.transaction_executor.execute(move |conn| {
            let existing = transaction_repository.find_in_tx(&user_id, &transaction_id, conn)?;

            match existing.kind {
                TransactionKind::Repayment => {
                    if let Some(source_account_id) = existing.source_account_id.as_deref() {
                        account_repository.find_for_update(&user_id, source_account_id, conn)?;
                        account_repository.adjust_balance_in_tx(
                            source_account_id,
                            existing.amount,
                            conn,
                        )?;
                    }
                }
                _ => {
                    let account =
                        account_repository.find_for_update(&user_id, &existing.account_id, conn)?;
                    if let Some(delta) =
                        balance_effect(account.kind, existing.kind, existing.amount)
                    {
                        account_repository.adjust_balance_in_tx(
                            &existing.account_id,
                            -delta,
                            conn,
                        )?;
                    }
                }
            }

            debug!("Deleting transaction {transaction_id}");
            transaction_repository.delete_in_tx(&transaction_id, conn)?;
            Ok::<(), Error>(())
        })
    }

    async fn refund(&self, input: RefundInput) -> Result<Transaction> {
        input.validate()?;

        let now = self.clock.now();
        let refund_id = Uuid::new_v4().to_string();
        let transaction_repository = self.transaction_repository.clone();
        let account_repository = self.account_repository.clone();

        self.transaction_executor.execute(move |conn| {
            let original = transaction_repository.find_in_tx(
                &input.user_id,
                &input.original_transaction_id,
                conn,
            )?;
            if original.kind != TransactionKind::Expense {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "only expense transactions can be refunded".to_string(),
                )));
            }

            let refunded =
                transaction_repository.sum_refunds_for_in_tx(&original.id, conn)?;
            let refundable = original.amount - refunded;
            if refundable <= Decimal::ZERO {
                return Err(LedgerError::AlreadyFullyRefunded(original.id.clone()).into());
            }
            if input.amount > refundable {
                return Err(LedgerError::RefundExceedsRefundable {
                    requested: input.amount,
                    refundable,
                }
                .into());
            }

            let account =
                account_repository.find_for_update(&input.user_id, &original.account_id, conn)?;
            if let Some(delta) = balance_effect(account.kind, TransactionKind::Refund, input.amount)
            {
                account_repository.adjust_balance_in_tx(&original.account_id, delta, conn)?;
            }

            let refund = Transaction {
                id: refund_id,
                user_id: input.user_id.clone(),
                account_id: original.account_id.clone(),
                category_id: original.category_id.clone(),
                kind: TransactionKind::Refund,
                amount: input.amount,
                date: input.date,
                source_account_id: None,
                original_transaction_id: Some(original.id.clone()),
                note: input.note.clone(),
                created_at: now,
                updated_at: now,
            };
            transaction_repository.insert_in_tx(refund, conn)
        })
    }

    fn get_transaction(&self, user_id: &str, transaction_id: &str) -> Result<Transaction> {
        self.transaction_repository.get_by_id(user_id, transaction_id)
    }

    fn list_transactions(
        &self,
        user_id: &str,
        account_id: Option<&str>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>> {
        self.transaction_repository.list(user_id, account_id, from, to)
    }
}
