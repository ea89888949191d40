//! Account domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, Result, ValidationError};

/// Account category, determining how the balance is maintained.
///
/// `balance` is authoritative only for the balance-backed kinds; credit
/// accounts derive their outstanding figure from the transaction log, and
/// investment accounts derive `balance` as `shares * current_net_value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountKind {
    Cash,
    Bank,
    Alipay,
    Wechat,
    Credit,
    Investment,
    Other,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Cash => "CASH",
            AccountKind::Bank => "BANK",
            AccountKind::Alipay => "ALIPAY",
            AccountKind::Wechat => "WECHAT",
            AccountKind::Credit => "CREDIT",
            AccountKind::Investment => "INVESTMENT",
            AccountKind::Other => "OTHER",
        }
    }

    pub fn is_credit(&self) -> bool {
        matches!(self, AccountKind::Credit)
    }

    pub fn is_investment(&self) -> bool {
        matches!(self, AccountKind::Investment)
    }

    /// Whether the stored `balance` column is the authoritative balance.
    pub fn has_stored_balance(&self) -> bool {
        !self.is_credit() && !self.is_investment()
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "CASH" => Ok(AccountKind::Cash),
            "BANK" => Ok(AccountKind::Bank),
            "ALIPAY" => Ok(AccountKind::Alipay),
            "WECHAT" => Ok(AccountKind::Wechat),
            "CREDIT" => Ok(AccountKind::Credit),
            "INVESTMENT" => Ok(AccountKind::Investment),
            "OTHER" => Ok(AccountKind::Other),
            other => Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Unknown account kind: {other}"
            )))),
        }
    }
}

/// Domain model representing an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub kind: AccountKind,
    pub balance: Decimal,
    /// Credit accounts only.
    pub credit_limit: Option<Decimal>,
    /// Day of month the credit statement is issued (credit accounts only).
    pub billing_day: Option<u32>,
    /// Day of month the credit repayment is due (credit accounts only).
    pub due_day: Option<u32>,
    /// Investment accounts only.
    pub shares: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    pub current_net_value: Option<Decimal>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Account {
    /// Share count, zero when not an investment account or not yet set.
    pub fn shares_or_zero(&self) -> Decimal {
        self.shares.unwrap_or(Decimal::ZERO)
    }

    /// Weighted-average cost price, zero when not set.
    pub fn cost_price_or_zero(&self) -> Decimal {
        self.cost_price.unwrap_or(Decimal::ZERO)
    }

    /// Current per-share net value, zero when not set.
    pub fn net_value_or_zero(&self) -> Decimal {
        self.current_net_value.unwrap_or(Decimal::ZERO)
    }

    /// Credit limit, zero when not set.
    pub fn credit_limit_or_zero(&self) -> Decimal {
        self.credit_limit.unwrap_or(Decimal::ZERO)
    }
}

/// Input model for creating a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub name: String,
    pub kind: AccountKind,
    /// Opening balance; ignored for credit accounts.
    pub balance: Option<Decimal>,
    pub credit_limit: Option<Decimal>,
    pub billing_day: Option<u32>,
    pub due_day: Option<u32>,
    pub current_net_value: Option<Decimal>,
    pub is_active: bool,
}

impl NewAccount {
    /// Validates the new account data.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Account name cannot be empty".to_string(),
            )));
        }
        if self.user_id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "userId".to_string(),
            )));
        }
        if let Some(limit) = self.credit_limit {
            if limit < Decimal::ZERO {
                return Err(Error::Validation(ValidationError::InvalidInput(
                    "Credit limit cannot be negative".to_string(),
                )));
            }
        }
        for (field, day) in [("billingDay", self.billing_day), ("dueDay", self.due_day)] {
            if let Some(day) = day {
                if !(1..=31).contains(&day) {
                    return Err(Error::Validation(ValidationError::InvalidInput(format!(
                        "{field} must be between 1 and 31"
                    ))));
                }
            }
        }
        Ok(())
    }
}

/// Input model for updating an existing account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountUpdate {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub credit_limit: Option<Decimal>,
    pub billing_day: Option<u32>,
    pub due_day: Option<u32>,
    pub is_active: bool,
}

impl AccountUpdate {
    /// Validates the account update data.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "id".to_string(),
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Account name cannot be empty".to_string(),
            )));
        }
        for (field, day) in [("billingDay", self.billing_day), ("dueDay", self.due_day)] {
            if let Some(day) = day {
                if !(1..=31).contains(&day) {
                    return Err(Error::Validation(ValidationError::InvalidInput(format!(
                        "{field} must be between 1 and 31"
                    ))));
                }
            }
        }
        Ok(())
    }
}
