//! Auto-investment plan domain models.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, LedgerError, Result, ValidationError};

/// How often a plan fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown frequency: {other}"
            )))),
        }
    }
}

/// Plan lifecycle state.
///
/// `Active` and `Paused` toggle through pause/resume; `Deleted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    Active,
    Paused,
    Deleted,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Active => "ACTIVE",
            PlanStatus::Paused => "PAUSED",
            PlanStatus::Deleted => "DELETED",
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ACTIVE" => Ok(PlanStatus::Active),
            "PAUSED" => Ok(PlanStatus::Paused),
            "DELETED" => Ok(PlanStatus::Deleted),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown plan status: {other}"
            )))),
        }
    }
}

/// Validates the frequency/execution-day pairing.
///
/// Daily plans must not carry an execution day; weekly plans need an ISO
/// weekday (1 = Monday .. 7 = Sunday); monthly plans need a day of month
/// (1..31, clamped to short months at scheduling time).
pub fn validate_frequency_config(frequency: Frequency, execution_day: Option<u32>) -> Result<()> {
    match (frequency, execution_day) {
        (Frequency::Daily, Some(_)) => Err(LedgerError::InvalidFrequencyConfig(
            "daily plans do not take an execution day".to_string(),
        )
        .into()),
        (Frequency::Daily, None) => Ok(()),
        (Frequency::Weekly, Some(day)) if (1..=7).contains(&day) => Ok(()),
        (Frequency::Weekly, _) => Err(LedgerError::InvalidFrequencyConfig(
            "weekly plans require an execution day between 1 and 7".to_string(),
        )
        .into()),
        (Frequency::Monthly, Some(day)) if (1..=31).contains(&day) => Ok(()),
        (Frequency::Monthly, _) => Err(LedgerError::InvalidFrequencyConfig(
            "monthly plans require an execution day between 1 and 31".to_string(),
        )
        .into()),
    }
}

/// A recurring instruction to transfer a fixed amount from one account to
/// another on a calendar schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoInvestmentPlan {
    pub id: String,
    pub user_id: String,
    pub source_account_id: String,
    pub target_account_id: String,
    pub amount: Decimal,
    pub frequency: Frequency,
    pub execution_day: Option<u32>,
    pub execution_time: NaiveTime,
    pub status: PlanStatus,
    pub next_execution_date: NaiveDate,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlan {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub source_account_id: String,
    pub target_account_id: String,
    pub amount: Decimal,
    pub frequency: Frequency,
    pub execution_day: Option<u32>,
    pub execution_time: NaiveTime,
}

impl NewPlan {
    /// Validates the new plan data.
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "userId".to_string(),
            )));
        }
        if self.source_account_id == self.target_account_id {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "source and target accounts must differ".to_string(),
            )));
        }
        if self.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "plan amount must be positive, got {}",
                self.amount
            ))
            .into());
        }
        validate_frequency_config(self.frequency, self.execution_day)
    }
}

/// Input model for updating a plan's schedule or amount.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanUpdate {
    pub id: String,
    pub user_id: String,
    pub amount: Decimal,
    pub frequency: Frequency,
    pub execution_day: Option<u32>,
    pub execution_time: NaiveTime,
}

impl PlanUpdate {
    /// Validates the plan update data.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "id".to_string(),
            )));
        }
        if self.amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidAmount(format!(
                "plan amount must be positive, got {}",
                self.amount
            ))
            .into());
        }
        validate_frequency_config(self.frequency, self.execution_day)
    }
}
