//! Execution record domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, LedgerError, Result, ValidationError};

/// Outcome of one attempted transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionStatus {
    Success,
    Failed,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Success => "SUCCESS",
            ExecutionStatus::Failed => "FAILED",
        }
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "SUCCESS" => Ok(ExecutionStatus::Success),
            "FAILED" => Ok(ExecutionStatus::Failed),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown execution status: {other}"
            )))),
        }
    }
}

/// Immutable, append-only log entry describing one attempted transfer,
/// scheduled or one-off. Never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub id: String,
    pub user_id: String,
    /// Absent for one-off discounted buys.
    pub plan_id: Option<String>,
    pub source_account_id: String,
    pub target_account_id: String,
    pub paid_amount: Decimal,
    pub invested_amount: Decimal,
    pub discount_rate: Decimal,
    pub shares: Decimal,
    pub net_value: Decimal,
    pub status: ExecutionStatus,
    pub fail_reason: Option<String>,
    pub executed_at: NaiveDateTime,
}

/// Input model for appending an execution record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExecutionRecord {
    pub user_id: String,
    pub plan_id: Option<String>,
    pub source_account_id: String,
    pub target_account_id: String,
    pub paid_amount: Decimal,
    pub invested_amount: Decimal,
    pub discount_rate: Decimal,
    pub shares: Decimal,
    pub net_value: Decimal,
    pub status: ExecutionStatus,
    pub fail_reason: Option<String>,
    pub executed_at: NaiveDateTime,
}

/// Input model for a one-off discounted buy.
///
/// `paid_amount` leaves the source account; `invested_amount` worth of
/// investment value lands in the target. The two differ for promotional
/// purchases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneTimeBuyInput {
    pub user_id: String,
    pub source_account_id: String,
    pub target_account_id: String,
    pub paid_amount: Decimal,
    pub invested_amount: Decimal,
}

impl OneTimeBuyInput {
    pub fn validate(&self) -> Result<()> {
        if self.source_account_id == self.target_account_id {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "source and target accounts must differ".to_string(),
            )));
        }
        if self.paid_amount <= Decimal::ZERO || self.invested_amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "buy amounts must be positive, got paid {} / invested {}",
                self.paid_amount, self.invested_amount
            ))
            .into());
        }
        Ok(())
    }
}

/// Counters from one pass over the due plans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepSummary {
    /// Plans whose transfer committed.
    pub executed: usize,
    /// Plans recorded as failed (insufficient balance or otherwise).
    pub failed: usize,
    /// Plans due today but ahead of their execution time at this tick.
    pub skipped: usize,
    /// Plans whose failure bookkeeping itself errored.
    pub errors: usize,
}
