//! Investment reminder domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, Result, ValidationError};

/// Why a reminder was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderKind {
    /// A scheduled plan execution failed.
    ExecutionFailed,
    /// A plan due tomorrow has an underfunded source account.
    InsufficientBalance,
}

impl ReminderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReminderKind::ExecutionFailed => "EXECUTION_FAILED",
            ReminderKind::InsufficientBalance => "INSUFFICIENT_BALANCE",
        }
    }
}

impl fmt::Display for ReminderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReminderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "EXECUTION_FAILED" => Ok(ReminderKind::ExecutionFailed),
            "INSUFFICIENT_BALANCE" => Ok(ReminderKind::InsufficientBalance),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown reminder kind: {other}"
            )))),
        }
    }
}

/// A notification raised by the execution engine or the balance sweep.
/// Mutated only by `mark_read`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentReminder {
    pub id: String,
    pub user_id: String,
    pub plan_id: String,
    pub kind: ReminderKind,
    pub message: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}

/// Input model for raising a reminder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInvestmentReminder {
    pub user_id: String,
    pub plan_id: String,
    pub kind: ReminderKind,
    pub message: String,
}
