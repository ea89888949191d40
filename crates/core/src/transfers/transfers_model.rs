//! Transfer executor request/outcome models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, LedgerError, Result, ValidationError};

/// A single transactional move of money between two accounts.
///
/// `debit_amount` and `credit_amount` may differ: a discounted one-off buy
/// pays `debit_amount` for `credit_amount` worth of investment value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub user_id: String,
    pub source_account_id: String,
    pub target_account_id: String,
    pub debit_amount: Decimal,
    pub credit_amount: Decimal,
}

impl TransferRequest {
    pub fn validate(&self) -> Result<()> {
        if self.source_account_id == self.target_account_id {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "source and target accounts must differ".to_string(),
            )));
        }
        if self.debit_amount <= Decimal::ZERO || self.credit_amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "transfer amounts must be positive, got debit {} / credit {}",
                self.debit_amount, self.credit_amount
            ))
            .into());
        }
        Ok(())
    }
}

/// Committed result of a transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferOutcome {
    pub source_account_id: String,
    pub target_account_id: String,
    pub source_balance_after: Decimal,
    pub target_balance_after: Decimal,
    /// Whether the target was an investment account.
    pub invested: bool,
    /// Shares acquired by this transfer; zero for plain targets.
    pub shares_acquired: Decimal,
    pub total_shares: Decimal,
    pub cost_price_after: Decimal,
    /// Net value used for the buy; zero for plain targets.
    pub net_value: Decimal,
    /// `debit_amount / credit_amount`; exactly 1 for even transfers.
    pub discount_rate: Decimal,
}

/// A sale of investment shares, crediting proceeds to a cash-like account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellRequest {
    pub user_id: String,
    /// The investment account being reduced.
    pub source_account_id: String,
    /// The balance-backed account receiving the proceeds.
    pub target_account_id: String,
    pub shares: Decimal,
}

impl SellRequest {
    pub fn validate(&self) -> Result<()> {
        if self.source_account_id == self.target_account_id {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "source and target accounts must differ".to_string(),
            )));
        }
        if self.shares <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "sell share count must be positive, got {}",
                self.shares
            ))
            .into());
        }
        Ok(())
    }
}

/// Committed result of a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellOutcome {
    pub source_account_id: String,
    pub target_account_id: String,
    pub proceeds: Decimal,
    pub realized_profit: Decimal,
    pub shares_sold: Decimal,
    pub shares_remaining: Decimal,
    pub cost_price_after: Decimal,
    pub net_value: Decimal,
    pub target_balance_after: Decimal,
}

/// A credit-card repayment: debit a balance-backed account, record the
/// repayment against the credit account's transaction log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepaymentRequest {
    pub user_id: String,
    pub source_account_id: String,
    pub credit_account_id: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub note: Option<String>,
}

impl RepaymentRequest {
    pub fn validate(&self) -> Result<()> {
        if self.source_account_id == self.credit_account_id {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "repayment source and credit account must differ".to_string(),
            )));
        }
        if self.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "repayment amount must be positive, got {}",
                self.amount
            ))
            .into());
        }
        Ok(())
    }
}
