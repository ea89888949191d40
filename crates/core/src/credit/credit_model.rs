//! Derived credit-account figures.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Point-in-time derived view of a credit account.
///
/// Nothing here is persisted: outstanding balance and available credit are
/// recomputed from the transaction log on every read, so they are
/// automatically consistent with transaction create/update/delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCardStatus {
    pub account_id: String,
    pub account_name: String,
    pub credit_limit: Decimal,
    pub outstanding_balance: Decimal,
    pub available_credit: Decimal,
    /// Days until the next due day; absent when the account has no due day.
    pub days_until_due: Option<i64>,
    pub is_overdue: bool,
}
