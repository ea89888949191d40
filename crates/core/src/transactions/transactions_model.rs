//! Ledger transaction domain models.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::accounts::AccountKind;
use crate::errors::{Error, LedgerError, Result, ValidationError};

/// Ledger entry category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Income,
    Expense,
    Repayment,
    Refund,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "INCOME",
            TransactionKind::Expense => "EXPENSE",
            TransactionKind::Repayment => "REPAYMENT",
            TransactionKind::Refund => "REFUND",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "INCOME" => Ok(TransactionKind::Income),
            "EXPENSE" => Ok(TransactionKind::Expense),
            "REPAYMENT" => Ok(TransactionKind::Repayment),
            "REFUND" => Ok(TransactionKind::Refund),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown transaction kind: {other}"
            )))),
        }
    }
}

/// Domain model representing one immutable ledger entry.
///
/// Rows are only ever changed through the transaction service's own update
/// path, which re-derives and re-applies balance deltas; deleting a row
/// reverses its balance effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub account_id: String,
    pub category_id: Option<String>,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub date: NaiveDate,
    /// For repayments: the account the money was taken from.
    pub source_account_id: Option<String>,
    /// For refunds: the expense being refunded.
    pub original_transaction_id: Option<String>,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Effect of a transaction row on its own account's *stored* balance.
///
/// Credit accounts derive their outstanding figure from the transaction log
/// and investment accounts derive balance from the position, so neither is
/// ever adjusted here. Repayment rows live on the credit account; their
/// stored-balance effect is on the repayment's source account and is applied
/// by the repayment flow, not derived from the row's own account.
pub fn balance_effect(
    account_kind: AccountKind,
    transaction_kind: TransactionKind,
    amount: Decimal,
) -> Option<Decimal> {
    if !account_kind.has_stored_balance() {
        return None;
    }
    match transaction_kind {
        TransactionKind::Income | TransactionKind::Refund => Some(amount),
        TransactionKind::Expense => Some(-amount),
        TransactionKind::Repayment => None,
    }
}

/// Input model for creating a new income/expense entry.
///
/// Repayments and refunds have dedicated flows (`TransferExecutor::repay`,
/// `TransactionService::refund`) because they carry cross-account or
/// cross-transaction semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub account_id: String,
    pub category_id: Option<String>,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub note: Option<String>,
}

impl NewTransaction {
    /// Validates the new transaction data.
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "userId".to_string(),
            )));
        }
        if self.account_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "accountId".to_string(),
            )));
        }
        if !matches!(
            self.kind,
            TransactionKind::Income | TransactionKind::Expense
        ) {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "{} entries must go through their dedicated flow",
                self.kind
            ))));
        }
        if self.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "transaction amount must be positive, got {}",
                self.amount
            ))
            .into());
        }
        Ok(())
    }
}

/// Input model for updating an existing transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    pub id: String,
    pub user_id: String,
    pub category_id: Option<String>,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub note: Option<String>,
}

impl TransactionUpdate {
    /// Validates the transaction update data.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "id".to_string(),
            )));
        }
        if self.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "transaction amount must be positive, got {}",
                self.amount
            ))
            .into());
        }
        Ok(())
    }
}

/// Input model for refunding (part of) an expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundInput {
    pub user_id: String,
    pub original_transaction_id: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub note: Option<String>,
}

impl RefundInput {
    pub fn validate(&self) -> Result<()> {
        if self.original_transaction_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "originalTransactionId".to_string(),
            )));
        }
        if self.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "refund amount must be positive, got {}",
                self.amount
            ))
            .into());
        }
        Ok(())
    }
}
