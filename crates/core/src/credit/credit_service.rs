use std::cmp::max;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::credit_model::CreditCardStatus;
use super::credit_traits::CreditServiceTrait;
use crate::accounts::AccountRepositoryTrait;
use crate::constants::DUE_SOON_THRESHOLD_DAYS;
use crate::errors::{LedgerError, Result};
use crate::ledger::round_money;
use crate::transactions::{TransactionKind, TransactionRepositoryTrait};
use crate::utils::time_utils::{clamped_date, following_month};
use crate::utils::Clock;

/// Days from `today` to the next occurrence of `due_day`.
///
/// When today's day-of-month is past the due day, the target is the due day
/// of the following month (clamped to that month's length); otherwise it is
/// this month's.
pub fn days_until_due(due_day: u32, today: NaiveDate) -> i64 {
    let target = if today.day() > due_day {
        let (year, month) = following_month(today);
        clamped_date(year, month, due_day)
    } else {
        clamped_date(today.year(), today.month(), due_day)
    };
    (target - today).num_days()
}

/// Whether the due day of the current month has already passed.
pub fn is_overdue(due_day: u32, today: NaiveDate) -> bool {
    today.day() > due_day
}

/// Service deriving credit-account figures from the transaction log.
pub struct CreditService {
    account_repository: Arc<dyn AccountRepositoryTrait>,
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    clock: Arc<dyn Clock>,
}

impl CreditService {
    pub fn new(
        account_repository: Arc<dyn AccountRepositoryTrait>,
        transaction_repository: Arc<dyn TransactionRepositoryTrait>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            account_repository,
            transaction_repository,
            clock,
        }
    }

    fn outstanding_for(&self, account_id: &str) -> Result<Decimal> {
        let expenses = self
            .transaction_repository
            .sum_amount_by_kind(account_id, TransactionKind::Expense)?;
        let repayments = self
            .transaction_repository
            .sum_amount_by_kind(account_id, TransactionKind::Repayment)?;
        let refunds = self
            .transaction_repository
            .sum_amount_by_kind(account_id, TransactionKind::Refund)?;
        Ok(max(
            Decimal::ZERO,
            round_money(expenses - repayments - refunds),
        ))
    }

    fn status_for(
        &self,
        account: &crate::accounts::Account,
        today: NaiveDate,
    ) -> Result<CreditCardStatus> {
        let outstanding = self.outstanding_for(&account.id)?;
        let credit_limit = account.credit_limit_or_zero();
        Ok(CreditCardStatus {
            account_id: account.id.clone(),
            account_name: account.name.clone(),
            credit_limit,
            outstanding_balance: outstanding,
            available_credit: round_money(credit_limit - outstanding),
            days_until_due: account.due_day.map(|day| days_until_due(day, today)),
            is_overdue: account
                .due_day
                .map(|day| is_overdue(day, today))
                .unwrap_or(false),
        })
    }

    fn credit_account(&self, user_id: &str, account_id: &str) -> Result<crate::accounts::Account> {
        let account = self.account_repository.get_by_id(user_id, account_id)?;
        if !account.kind.is_credit() {
            return Err(LedgerError::InvalidAccountRole(format!(
                "account {account_id} is not a credit account"
            ))
            .into());
        }
        Ok(account)
    }
}

impl CreditServiceTrait for CreditService {
    fn outstanding_balance(&self, user_id: &str, account_id: &str) -> Result<Decimal> {
        self.credit_account(user_id, account_id)?;
        self.outstanding_for(account_id)
    }

    fn available_credit(&self, user_id: &str, account_id: &str) -> Result<Decimal> {
        let account = self.credit_account(user_id, account_id)?;
        let outstanding = self.outstanding_for(account_id)?;
        Ok(round_money(account.credit_limit_or_zero() - outstanding))
    }

    fn is_over_limit(
        &self,
        user_id: &str,
        account_id: &str,
        additional_amount: Decimal,
    ) -> Result<bool> {
        let account = self.credit_account(user_id, account_id)?;
        let outstanding = self.outstanding_for(account_id)?;
        Ok(outstanding + additional_amount > account.credit_limit_or_zero())
    }

    fn card_status(&self, user_id: &str, account_id: &str) -> Result<CreditCardStatus> {
        let account = self.credit_account(user_id, account_id)?;
        self.status_for(&account, self.clock.today())
    }

    fn list_due_soon(
        &self,
        user_id: &str,
        threshold_days: Option<i64>,
    ) -> Result<Vec<CreditCardStatus>> {
        let threshold_days = threshold_days.unwrap_or(DUE_SOON_THRESHOLD_DAYS);
        let today = self.clock.today();
        let mut due_soon = Vec::new();
        for account in self
            .account_repository
            .list(user_id, Some(true))?
            .iter()
            .filter(|a| a.kind.is_credit())
        {
            let status = self.status_for(account, today)?;
            if status.outstanding_balance <= Decimal::ZERO {
                continue;
            }
            let within_threshold = status
                .days_until_due
                .map(|days| days <= threshold_days)
                .unwrap_or(false);
            if status.is_overdue || within_threshold {
                due_soon.push(status);
            }
        }
        due_soon.sort_by_key(|s| (!s.is_overdue, s.days_until_due.unwrap_or(i64::MAX)));
        Ok(due_soon)
    }
}
