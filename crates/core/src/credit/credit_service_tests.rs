use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::accounts::{Account, AccountKind, AccountRepositoryTrait, AccountUpdate, NewAccount};
use crate::credit::{CreditService, CreditServiceTrait};
use crate::db::DbConnection;
use crate::errors::{Error, LedgerError, Result};
use crate::transactions::{Transaction, TransactionKind, TransactionRepositoryTrait};
use crate::utils::FixedClock;

fn test_clock() -> Arc<FixedClock> {
    // The 10th: due day 12 is two days out, due day 8 is overdue
    Arc::new(FixedClock::new(
        NaiveDate::from_ymd_opt(2025, 3, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap(),
    ))
}

fn card(id: &str, limit: Decimal, due_day: Option<u32>) -> Account {
    Account {
        id: id.to_string(),
        user_id: "user-1".to_string(),
        name: id.to_string(),
        kind: AccountKind::Credit,
        balance: Decimal::ZERO,
        credit_limit: Some(limit),
        billing_day: Some(1),
        due_day,
        shares: None,
        cost_price: None,
        current_net_value: None,
        is_active: true,
        created_at: NaiveDateTime::default(),
        updated_at: NaiveDateTime::default(),
    }
}

// --- Mock AccountRepository (reads only) ---
#[derive(Clone, Default)]
struct MockAccountRepository {
    accounts: Arc<Mutex<HashMap<String, Account>>>,
}

impl MockAccountRepository {
    fn with_accounts(accounts: Vec<Account>) -> Self {
        Self {
            accounts: Arc::new(Mutex::new(
                accounts.into_iter().map(|a| (a.id.clone(), a)).collect(),
            )),
        }
    }
}

#[async_trait]
impl AccountRepositoryTrait for MockAccountRepository {
    async fn create(&self, _new_account: NewAccount) -> Result<Account> {
        unimplemented!()
    }

    async fn update(&self, _account_update: AccountUpdate) -> Result<Account> {
        unimplemented!()
    }

    fn get_by_id(&self, user_id: &str, account_id: &str) -> Result<Account> {
        self.accounts
            .lock()
            .unwrap()
            .get(account_id)
            .filter(|a| a.user_id == user_id)
            .cloned()
            .ok_or_else(|| {
                Error::Ledger(LedgerError::NotFound {
                    entity: "account",
                    id: account_id.to_string(),
                })
            })
    }

    fn list(&self, user_id: &str, _is_active_filter: Option<bool>) -> Result<Vec<Account>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    fn find_for_update(
        &self,
        _user_id: &str,
        _account_id: &str,
        _conn: &mut DbConnection,
    ) -> Result<Account> {
        unimplemented!()
    }

    fn adjust_balance_in_tx(
        &self,
        _account_id: &str,
        _delta: Decimal,
        _conn: &mut DbConnection,
    ) -> Result<Account> {
        unimplemented!()
    }

    fn set_balance_in_tx(
        &self,
        _account_id: &str,
        _balance: Decimal,
        _conn: &mut DbConnection,
    ) -> Result<()> {
        unimplemented!()
    }

    fn update_position_in_tx(
        &self,
        _account_id: &str,
        _shares: Decimal,
        _cost_price: Decimal,
        _net_value: Decimal,
        _balance: Decimal,
        _conn: &mut DbConnection,
    ) -> Result<()> {
        unimplemented!()
    }
}

// --- Mock TransactionRepository (sums only) ---
#[derive(Clone, Default)]
struct MockTransactionRepository {
    transactions: Arc<Mutex<Vec<Transaction>>>,
}

impl MockTransactionRepository {
    fn seed(&self, account_id: &str, kind: TransactionKind, amount: Decimal) {
        let mut transactions = self.transactions.lock().unwrap();
        let now = NaiveDateTime::default();
        let id = format!("tx-{}", transactions.len() + 1);
        transactions.push(Transaction {
            id,
            user_id: "user-1".to_string(),
            account_id: account_id.to_string(),
            category_id: None,
            kind,
            amount,
            date: now.date(),
            source_account_id: None,
            original_transaction_id: None,
            note: None,
            created_at: now,
            updated_at: now,
        });
    }
}

impl TransactionRepositoryTrait for MockTransactionRepository {
    fn insert_in_tx(
        &self,
        _transaction: Transaction,
        _conn: &mut DbConnection,
    ) -> Result<Transaction> {
        unimplemented!()
    }

    fn update_in_tx(
        &self,
        _transaction: &Transaction,
        _conn: &mut DbConnection,
    ) -> Result<Transaction> {
        unimplemented!()
    }

    fn delete_in_tx(&self, _transaction_id: &str, _conn: &mut DbConnection) -> Result<usize> {
        unimplemented!()
    }

    fn find_in_tx(
        &self,
        _user_id: &str,
        _transaction_id: &str,
        _conn: &mut DbConnection,
    ) -> Result<Transaction> {
        unimplemented!()
    }

    fn get_by_id(&self, _user_id: &str, _transaction_id: &str) -> Result<Transaction> {
        unimplemented!()
    }

    fn list(
        &self,
        _user_id: &str,
        _account_id: Option<&str>,
        _from: Option<NaiveDate>,
        _to: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>> {
        unimplemented!()
    }

    fn sum_amount_by_kind(&self, account_id: &str, kind: TransactionKind) -> Result<Decimal> {
        Ok(self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.account_id == account_id && t.kind == kind)
            .map(|t| t.amount)
            .sum())
    }

    fn sum_refunds_for_in_tx(
        &self,
        _original_transaction_id: &str,
        _conn: &mut DbConnection,
    ) -> Result<Decimal> {
        unimplemented!()
    }
}

fn service(accounts: Vec<Account>) -> (CreditService, MockTransactionRepository) {
    let transaction_repository = MockTransactionRepository::default();
    let service = CreditService::new(
        Arc::new(MockAccountRepository::with_accounts(accounts)),
        Arc::new(transaction_repository.clone()),
        test_clock(),
    );
    (service, transaction_repository)
}

#[test]
fn outstanding_nets_expenses_repayments_and_refunds() {
    let (service, transactions) = service(vec![card("visa", dec!(5000), Some(20))]);
    transactions.seed("visa", TransactionKind::Expense, dec!(800));
    transactions.seed("visa", TransactionKind::Expense, dec!(200));
    transactions.seed("visa", TransactionKind::Repayment, dec!(300));
    transactions.seed("visa", TransactionKind::Refund, dec!(100));

    assert_eq!(
        service.outstanding_balance("user-1", "visa").unwrap(),
        dec!(600)
    );
    assert_eq!(
        service.available_credit("user-1", "visa").unwrap(),
        dec!(4400)
    );
}

#[test]
fn outstanding_never_goes_negative() {
    let (service, transactions) = service(vec![card("visa", dec!(5000), Some(20))]);
    transactions.seed("visa", TransactionKind::Expense, dec!(100));
    transactions.seed("visa", TransactionKind::Repayment, dec!(250));

    assert_eq!(
        service.outstanding_balance("user-1", "visa").unwrap(),
        Decimal::ZERO
    );
}

#[test]
fn over_limit_check_includes_the_additional_charge() {
    let (service, transactions) = service(vec![card("visa", dec!(1000), Some(20))]);
    transactions.seed("visa", TransactionKind::Expense, dec!(900));

    assert!(!service.is_over_limit("user-1", "visa", dec!(100)).unwrap());
    assert!(service.is_over_limit("user-1", "visa", dec!(100.01)).unwrap());
}

#[test]
fn non_credit_accounts_are_rejected() {
    let (service, _) = service(vec![Account {
        kind: AccountKind::Bank,
        ..card("bank", Decimal::ZERO, None)
    }]);

    let err = service.outstanding_balance("user-1", "bank").unwrap_err();
    assert!(matches!(
        err,
        Error::Ledger(LedgerError::InvalidAccountRole(_))
    ));
}

#[test]
fn due_soon_selects_and_sorts_overdue_first() {
    // Today is 2025-03-10
    let (service, transactions) = service(vec![
        card("due-in-2", dec!(1000), Some(12)),
        card("overdue", dec!(1000), Some(8)),
        card("far-off", dec!(1000), Some(25)),
        card("paid-off", dec!(1000), Some(11)),
    ]);
    for id in ["due-in-2", "overdue", "far-off"] {
        transactions.seed(id, TransactionKind::Expense, dec!(400));
    }

    let due_soon = service.list_due_soon("user-1", None).unwrap();
    let ids: Vec<&str> = due_soon.iter().map(|s| s.account_id.as_str()).collect();
    // Overdue card first, then ascending days until due; the far-off card
    // misses the threshold and the paid-off card has nothing outstanding.
    assert_eq!(ids, vec!["overdue", "due-in-2"]);
    assert!(due_soon[0].is_overdue);
    assert_eq!(due_soon[1].days_until_due, Some(2));
}

#[test]
fn due_soon_threshold_is_configurable() {
    let (service, transactions) = service(vec![card("far-off", dec!(1000), Some(25))]);
    transactions.seed("far-off", TransactionKind::Expense, dec!(400));

    assert!(service.list_due_soon("user-1", None).unwrap().is_empty());
    assert_eq!(
        service.list_due_soon("user-1", Some(15)).unwrap().len(),
        1
    );
}
