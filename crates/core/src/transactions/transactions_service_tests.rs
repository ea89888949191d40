use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use diesel::r2d2::ConnectionManager;
use diesel::sqlite::SqliteConnection;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::accounts::{Account, AccountKind, AccountRepositoryTrait, AccountUpdate, NewAccount};
use crate::db::{DbConnection, DbPool};
use crate::errors::{Error, LedgerError, Result};
use crate::transactions::{
    NewTransaction, RefundInput, Transaction, TransactionKind, TransactionRepositoryTrait,
    TransactionService, TransactionServiceTrait, TransactionUpdate,
};
use crate::utils::{Clock, FixedClock};

fn test_executor() -> DbPool {
    let manager = ConnectionManager::<SqliteConnection>::new(":memory:");
    diesel::r2d2::Pool::builder()
        .max_size(1)
        .build(manager)
        .expect("in-memory pool")
}

fn test_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap(),
    ))
}

fn account(id: &str, kind: AccountKind, balance: Decimal) -> Account {
    Account {
        id: id.to_string(),
        user_id: "user-1".to_string(),
        name: id.to_string(),
        kind,
        balance,
        credit_limit: None,
        billing_day: None,
        due_day: None,
        shares: None,
        cost_price: None,
        current_net_value: None,
        is_active: true,
        created_at: NaiveDateTime::default(),
        updated_at: NaiveDateTime::default(),
    }
}

// --- Mock AccountRepository ---
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

    fn balance_of(&self, account_id: &str) -> Decimal {
        self.accounts.lock().unwrap()[account_id].balance
    }

    fn lookup(&self, user_id: &str, account_id: &str) -> Result<Account> {
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
        self.lookup(user_id, account_id)
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
        user_id: &str,
        account_id: &str,
        _conn: &mut DbConnection,
    ) -> Result<Account> {
        self.lookup(user_id, account_id)
    }

    fn adjust_balance_in_tx(
        &self,
        account_id: &str,
        delta: Decimal,
        _conn: &mut DbConnection,
    ) -> Result<Account> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts.get_mut(account_id).ok_or_else(|| {
            Error::Ledger(LedgerError::NotFound {
                entity: "account",
                id: account_id.to_string(),
            })
        })?;
        account.balance += delta;
        Ok(account.clone())
    }

    fn set_balance_in_tx(
        &self,
        account_id: &str,
        balance: Decimal,
        _conn: &mut DbConnection,
    ) -> Result<()> {
        self.accounts
            .lock()
            .unwrap()
            .get_mut(account_id)
            .expect("account exists")
            .balance = balance;
        Ok(())
    }

    fn update_position_in_tx(
        &self,
        account_id: &str,
        shares: Decimal,
        cost_price: Decimal,
        net_value: Decimal,
        balance: Decimal,
        _conn: &mut DbConnection,
    ) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts.get_mut(account_id).expect("account exists");
        account.shares = Some(shares);
        account.cost_price = Some(cost_price);
        account.current_net_value = Some(net_value);
        account.balance = balance;
        Ok(())
    }
}

// --- Mock TransactionRepository ---
#[derive(Clone, Default)]
struct MockTransactionRepository {
    transactions: Arc<Mutex<Vec<Transaction>>>,
}

impl MockTransactionRepository {
    fn all(&self) -> Vec<Transaction> {
        self.transactions.lock().unwrap().clone()
    }

    fn seed(&self, transaction: Transaction) {
        self.transactions.lock().unwrap().push(transaction);
    }
}

impl TransactionRepositoryTrait for MockTransactionRepository {
    fn insert_in_tx(
        &self,
        transaction: Transaction,
        _conn: &mut DbConnection,
    ) -> Result<Transaction> {
        self.transactions.lock().unwrap().push(transaction.clone());
        Ok(transaction)
    }

    fn update_in_tx(
        &self,
        transaction: &Transaction,
        _conn: &mut DbConnection,
    ) -> Result<Transaction> {
        let mut transactions = self.transactions.lock().unwrap();
        let slot = transactions
            .iter_mut()
            .find(|t| t.id == transaction.id)
            .ok_or_else(|| {
                Error::Ledger(LedgerError::NotFound {
                    entity: "transaction",
                    id: transaction.id.clone(),
                })
            })?;
        *slot = transaction.clone();
        Ok(transaction.clone())
    }

    fn delete_in_tx(&self, transaction_id: &str, _conn: &mut DbConnection) -> Result<usize> {
        let mut transactions = self.transactions.lock().unwrap();
        let before = transactions.len();
        transactions.retain(|t| t.id != transaction_id);
        Ok(before - transactions.len())
    }

    fn find_in_tx(
        &self,
        user_id: &str,
        transaction_id: &str,
        _conn: &mut DbConnection,
    ) -> Result<Transaction> {
        self.get_by_id(user_id, transaction_id)
    }

    fn get_by_id(&self, user_id: &str, transaction_id: &str) -> Result<Transaction> {
        self.transactions
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == transaction_id && t.user_id == user_id)
            .cloned()
            .ok_or_else(|| {
                Error::Ledger(LedgerError::NotFound {
                    entity: "transaction",
                    id: transaction_id.to_string(),
                })
            })
    }

    fn list(
        &self,
        user_id: &str,
        account_id: Option<&str>,
        _from: Option<NaiveDate>,
        _to: Option<NaiveDate>,
    ) -> Result<Vec<Transaction>> {
        Ok(self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.user_id == user_id)
            .filter(|t| account_id.map(|id| t.account_id == id).unwrap_or(true))
            .cloned()
            .collect())
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
        original_transaction_id: &str,
        _conn: &mut DbConnection,
    ) -> Result<Decimal> {
        Ok(self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|t| {
                t.kind == TransactionKind::Refund
                    && t.original_transaction_id.as_deref() == Some(original_transaction_id)
            })
            .map(|t| t.amount)
            .sum())
    }
}

fn service(
    accounts: Vec<Account>,
) -> (
    TransactionService<DbPool>,
    MockAccountRepository,
    MockTransactionRepository,
) {
    let account_repository = MockAccountRepository::with_accounts(accounts);
    let transaction_repository = MockTransactionRepository::default();
    let service = TransactionService::new(
        Arc::new(transaction_repository.clone()),
        Arc::new(account_repository.clone()),
        test_clock(),
        test_executor(),
    );
    (service, account_repository, transaction_repository)
}

fn new_transaction(account_id: &str, kind: TransactionKind, amount: Decimal) -> NewTransaction {
    NewTransaction {
        id: None,
        user_id: "user-1".to_string(),
        account_id: account_id.to_string(),
        category_id: Some("cat-1".to_string()),
        kind,
        amount,
        date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        note: None,
    }
}

#[tokio::test]
async fn income_and_expense_adjust_cash_balance() {
    let (service, accounts, _) = service(vec![account("cash", AccountKind::Cash, dec!(100))]);

    service
        .create_transaction(new_transaction("cash", TransactionKind::Income, dec!(50)))
        .await
        .unwrap();
    assert_eq!(accounts.balance_of("cash"), dec!(150));

    service
        .create_transaction(new_transaction("cash", TransactionKind::Expense, dec!(30)))
        .await
        .unwrap();
    assert_eq!(accounts.balance_of("cash"), dec!(120));
}

#[tokio::test]
async fn credit_expense_never_touches_stored_balance() {
    let (service, accounts, transactions) =
        service(vec![account("card", AccountKind::Credit, Decimal::ZERO)]);

    service
        .create_transaction(new_transaction("card", TransactionKind::Expense, dec!(75)))
        .await
        .unwrap();

    assert_eq!(accounts.balance_of("card"), Decimal::ZERO);
    assert_eq!(transactions.all().len(), 1);
}

#[tokio::test]
async fn income_on_credit_account_is_rejected() {
    let (service, _, transactions) =
        service(vec![account("card", AccountKind::Credit, Decimal::ZERO)]);

    let err = service
        .create_transaction(new_transaction("card", TransactionKind::Income, dec!(10)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Ledger(LedgerError::InvalidAccountRole(_))
    ));
    assert!(transactions.all().is_empty());
}

#[tokio::test]
async fn investment_account_rejects_ordinary_transactions() {
    let (service, _, _) = service(vec![account("fund", AccountKind::Investment, dec!(0))]);

    let err = service
        .create_transaction(new_transaction("fund", TransactionKind::Expense, dec!(10)))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Ledger(LedgerError::InvalidAccountRole(_))
    ));
}

#[tokio::test]
async fn non_positive_amount_is_rejected() {
    let (service, _, _) = service(vec![account("cash", AccountKind::Cash, dec!(100))]);

    let err = service
        .create_transaction(new_transaction("cash", TransactionKind::Expense, dec!(0)))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Ledger(LedgerError::InvalidAmount(_))));
}

#[tokio::test]
async fn update_rederives_the_balance_delta() {
    let (service, accounts, _) = service(vec![account("cash", AccountKind::Cash, dec!(100))]);

    let created = service
        .create_transaction(new_transaction("cash", TransactionKind::Expense, dec!(50)))
        .await
        .unwrap();
    assert_eq!(accounts.balance_of("cash"), dec!(50));

    service
        .update_transaction(TransactionUpdate {
            id: created.id.clone(),
            user_id: "user-1".to_string(),
            category_id: created.category_id.clone(),
            amount: dec!(80),
            date: created.date,
            note: None,
        })
        .await
        .unwrap();
    // Old -50 reversed, new -80 applied.
    assert_eq!(accounts.balance_of("cash"), dec!(20));
}

#[tokio::test]
async fn delete_reverses_the_balance_effect() {
    let (service, accounts, transactions) =
        service(vec![account("cash", AccountKind::Cash, dec!(100))]);

    let created = service
        .create_transaction(new_transaction("cash", TransactionKind::Income, dec!(40)))
        .await
        .unwrap();
    assert_eq!(accounts.balance_of("cash"), dec!(140));

    service
        .delete_transaction("user-1", &created.id)
        .await
        .unwrap();
    assert_eq!(accounts.balance_of("cash"), dec!(100));
    assert!(transactions.all().is_empty());
}

#[tokio::test]
async fn deleting_a_repayment_restores_the_source_account() {
    let (service, accounts, transactions) = service(vec![
        account("bank", AccountKind::Bank, dec!(500)),
        account("card", AccountKind::Credit, Decimal::ZERO),
    ]);

    let now = test_clock().now();
    transactions.seed(Transaction {
        id: "rep-1".to_string(),
        user_id: "user-1".to_string(),
        account_id: "card".to_string(),
        category_id: None,
        kind: TransactionKind::Repayment,
        amount: dec!(200),
        date: now.date(),
        source_account_id: Some("bank".to_string()),
        original_transaction_id: None,
        note: None,
        created_at: now,
        updated_at: now,
    });

    service.delete_transaction("user-1", "rep-1").await.unwrap();
    assert_eq!(accounts.balance_of("bank"), dec!(700));
}

#[tokio::test]
async fn refund_credits_the_account_and_links_the_original() {
    let (service, accounts, transactions) =
        service(vec![account("cash", AccountKind::Cash, dec!(100))]);

    let expense = service
        .create_transaction(new_transaction("cash", TransactionKind::Expense, dec!(60)))
        .await
        .unwrap();
    assert_eq!(accounts.balance_of("cash"), dec!(40));

    let refund = service
        .refund(RefundInput {
            user_id: "user-1".to_string(),
            original_transaction_id: expense.id.clone(),
            amount: dec!(25),
            date: expense.date,
            note: None,
        })
        .await
        .unwrap();

    assert_eq!(accounts.balance_of("cash"), dec!(65));
    assert_eq!(refund.kind, TransactionKind::Refund);
    assert_eq!(refund.original_transaction_id.as_deref(), Some(expense.id.as_str()));
    assert_eq!(transactions.all().len(), 2);
}

#[tokio::test]
async fn refund_beyond_the_refundable_remainder_is_rejected() {
    let (service, _, _) = service(vec![account("cash", AccountKind::Cash, dec!(100))]);

    let expense = service
        .create_transaction(new_transaction("cash", TransactionKind::Expense, dec!(60)))
        .await
        .unwrap();

    let refund = |amount| RefundInput {
        user_id: "user-1".to_string(),
        original_transaction_id: expense.id.clone(),
        amount,
        date: expense.date,
        note: None,
    };

    let err = service.refund(refund(dec!(61))).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Ledger(LedgerError::RefundExceedsRefundable { .. })
    ));

    service.refund(refund(dec!(60))).await.unwrap();
    let err = service.refund(refund(dec!(1))).await.unwrap_err();
    assert!(matches!(
        err,
        Error::Ledger(LedgerError::AlreadyFullyRefunded(_))
    ));
}

#[tokio::test]
async fn refunding_an_income_is_rejected() {
    let (service, _, _) = service(vec![account("cash", AccountKind::Cash, dec!(100))]);

    let income = service
        .create_transaction(new_transaction("cash", TransactionKind::Income, dec!(60)))
        .await
        .unwrap();

    let err = service
        .refund(RefundInput {
            user_id: "user-1".to_string(),
            original_transaction_id: income.id,
            amount: dec!(10),
            date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            note: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}
