//! Credit calculator service trait.

use rust_decimal::Decimal;

use super::credit_model::CreditCardStatus;
use crate::errors::Result;

/// Derived-figure queries over credit accounts.
pub trait CreditServiceTrait: Send + Sync {
    /// Amount currently owed: `max(0, Σexpense − Σrepayment − Σrefund)`,
    /// always recomputed from the transaction log.
    fn outstanding_balance(&self, user_id: &str, account_id: &str) -> Result<Decimal>;

    /// Credit limit minus outstanding balance.
    fn available_credit(&self, user_id: &str, account_id: &str) -> Result<Decimal>;

    /// Whether charging `additional_amount` would exceed the credit limit.
    fn is_over_limit(
        &self,
        user_id: &str,
        account_id: &str,
        additional_amount: Decimal,
    ) -> Result<bool>;

    /// Full derived view of one credit account.
    fn card_status(&self, user_id: &str, account_id: &str) -> Result<CreditCardStatus>;

    /// Credit accounts worth reminding about: outstanding balance above zero
    /// and due within `threshold_days` (default
    /// [`crate::constants::DUE_SOON_THRESHOLD_DAYS`]) or already overdue.
    /// Sorted overdue-first, then by ascending days until due.
    fn list_due_soon(
        &self,
        user_id: &str,
        threshold_days: Option<i64>,
    ) -> Result<Vec<CreditCardStatus>>;
}
