//! End-to-end tests over a real SQLite database: core services wired to the
//! concrete repositories, exercising commit and rollback behavior that the
//! in-crate mock tests cannot observe.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use kakebo_core::accounts::{Account, AccountKind, AccountRepositoryTrait, NewAccount};
use kakebo_core::credit::{CreditService, CreditServiceTrait};
use kakebo_core::db::{DbPool, DbTransactionExecutor};
use kakebo_core::errors::{Error, LedgerError};
use kakebo_core::executions::{ExecutionEngine, ExecutionEngineTrait, ExecutionStatus};
use kakebo_core::plans::{Frequency, NewPlan, PlanService, PlanServiceTrait};
use kakebo_core::reconciliation::{ReconciliationService, ReconciliationServiceTrait};
use kakebo_core::reminders::{InvestmentReminderRepositoryTrait, ReminderKind};
use kakebo_core::transactions::{
    NewTransaction, TransactionKind, TransactionService, TransactionServiceTrait,
};
use kakebo_core::transfers::{
    RepaymentRequest, SellRequest, TransferExecutor, TransferExecutorTrait, TransferRequest,
};
use kakebo_core::utils::{Clock, FixedClock};
use kakebo_core::valuations::PositionValuationRepositoryTrait;

use kakebo_storage_sqlite::accounts::AccountRepository;
use kakebo_storage_sqlite::db::{create_pool, run_migrations, spawn_writer, WriteHandle};
use kakebo_storage_sqlite::executions::ExecutionRecordRepository;
use kakebo_storage_sqlite::plans::PlanRepository;
use kakebo_storage_sqlite::reconciliation::BalanceAdjustmentRepository;
use kakebo_storage_sqlite::reminders::InvestmentReminderRepository;
use kakebo_storage_sqlite::transactions::TransactionRepository;
use kakebo_storage_sqlite::valuations::PositionValuationRepository;

struct TestDb {
    pool: Arc<DbPool>,
    writer: WriteHandle,
    clock: Arc<FixedClock>,
    // Kept alive so the database file outlives the test body.
    _dir: tempfile::TempDir,
}

fn setup() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("kakebo.db");
    let pool = create_pool(db_path.to_str().unwrap()).expect("pool");
    run_migrations(&pool).expect("migrations");
    let writer = spawn_writer((*pool).clone());
    let clock = Arc::new(FixedClock::new(
        NaiveDate::from_ymd_opt(2025, 6, 10)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap(),
    ));
    TestDb {
        pool,
        writer,
        clock,
        _dir: dir,
    }
}

impl TestDb {
    fn account_repository(&self) -> Arc<AccountRepository> {
        Arc::new(AccountRepository::new(
            self.pool.clone(),
            self.writer.clone(),
        ))
    }

    fn transfer_executor(&self) -> TransferExecutor<Arc<DbPool>> {
        TransferExecutor::new(
            self.account_repository(),
            Arc::new(TransactionRepository::new(self.pool.clone())),
            Arc::new(PositionValuationRepository::new(self.pool.clone())),
            self.clock.clone(),
            self.pool.clone(),
        )
    }

    async fn create_account(&self, new_account: NewAccount) -> Account {
        self.account_repository()
            .create(new_account)
            .await
            .expect("create account")
    }

    async fn bank(&self, name: &str, balance: Decimal) -> Account {
        self.create_account(NewAccount {
            id: None,
            user_id: "user-1".to_string(),
            name: name.to_string(),
            kind: AccountKind::Bank,
            balance: Some(balance),
            credit_limit: None,
            billing_day: None,
            due_day: None,
            current_net_value: None,
            is_active: true,
        })
        .await
    }

    async fn credit_card(&self, name: &str, limit: Decimal) -> Account {
        self.create_account(NewAccount {
            id: None,
            user_id: "user-1".to_string(),
            name: name.to_string(),
            kind: AccountKind::Credit,
            balance: None,
            credit_limit: Some(limit),
            billing_day: Some(5),
            due_day: Some(20),
            current_net_value: None,
            is_active: true,
        })
        .await
    }

    async fn fund(&self, name: &str, net_value: Decimal) -> Account {
        self.create_account(NewAccount {
            id: None,
            user_id: "user-1".to_string(),
            name: name.to_string(),
            kind: AccountKind::Investment,
            balance: None,
            credit_limit: None,
            billing_day: None,
            due_day: None,
            current_net_value: Some(net_value),
            is_active: true,
        })
        .await
    }

    fn balance_of(&self, account_id: &str) -> Decimal {
        self.account_repository()
            .get_by_id("user-1", account_id)
            .expect("account")
            .balance
    }
}

#[tokio::test]
async fn transfer_commits_exact_balance_deltas() {
    let db = setup();
    let source = db.bank("source", dec!(500)).await;
    let target = db.bank("target", dec!(50)).await;

    let executor = db.transfer_executor();
    let outcome = executor
        .transfer(TransferRequest {
            user_id: "user-1".to_string(),
            source_account_id: source.id.clone(),
            target_account_id: target.id.clone(),
            debit_amount: dec!(120),
            credit_amount: dec!(120),
        })
        .await
        .unwrap();

    assert_eq!(outcome.source_balance_after, dec!(380));
    assert_eq!(outcome.target_balance_after, dec!(170));
    // Evaluated strictly after commit
    assert_eq!(db.balance_of(&source.id), dec!(380));
    assert_eq!(db.balance_of(&target.id), dec!(170));
}

#[tokio::test]
async fn aborted_transaction_rolls_back_every_mutation() {
    let db = setup();
    let account = db.bank("rollback", dec!(100)).await;
    let repository = db.account_repository();

    let result = db.pool.execute(|conn| {
        repository.adjust_balance_in_tx(&account.id, dec!(75), conn)?;
        // Induced failure after the mutation: the whole transaction must
        // roll back and surface the original error.
        Err::<(), Error>(LedgerError::InvalidAmount("induced".to_string()).into())
    });

    assert!(matches!(
        result,
        Err(Error::Ledger(LedgerError::InvalidAmount(_)))
    ));
    assert_eq!(db.balance_of(&account.id), dec!(100));
}

#[tokio::test]
async fn insufficient_balance_aborts_before_any_effect() {
    let db = setup();
    let source = db.bank("thin", dec!(100)).await;
    let target = db.bank("fat", dec!(0)).await;

    let executor = db.transfer_executor();
    let err = executor
        .transfer(TransferRequest {
            user_id: "user-1".to_string(),
            source_account_id: source.id.clone(),
            target_account_id: target.id.clone(),
            debit_amount: dec!(100.01),
            credit_amount: dec!(100.01),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Ledger(LedgerError::InsufficientBalance { .. })
    ));
    assert_eq!(db.balance_of(&source.id), dec!(100));
    assert_eq!(db.balance_of(&target.id), dec!(0));
}

#[tokio::test]
async fn buy_and_sell_maintain_the_position() {
    let db = setup();
    let bank = db.bank("funding", dec!(1000)).await;
    let fund = db.fund("index", dec!(2)).await;
    let executor = db.transfer_executor();

    let outcome = executor
        .transfer(TransferRequest {
            user_id: "user-1".to_string(),
            source_account_id: bank.id.clone(),
            target_account_id: fund.id.clone(),
            debit_amount: dec!(400),
            credit_amount: dec!(400),
        })
        .await
        .unwrap();
    assert!(outcome.invested);
    assert_eq!(outcome.shares_acquired, dec!(200));
    assert_eq!(outcome.cost_price_after, dec!(2));

    let sell = executor
        .sell(SellRequest {
            user_id: "user-1".to_string(),
            source_account_id: fund.id.clone(),
            target_account_id: bank.id.clone(),
            shares: dec!(50),
        })
        .await
        .unwrap();
    assert_eq!(sell.proceeds, dec!(100));
    assert_eq!(sell.shares_remaining, dec!(150));

    let fund = db
        .account_repository()
        .get_by_id("user-1", &fund.id)
        .unwrap();
    assert_eq!(fund.shares, Some(dec!(150)));
    assert_eq!(fund.balance, dec!(300));
    assert_eq!(db.balance_of(&bank.id), dec!(700));

    let valuations = PositionValuationRepository::new(db.pool.clone())
        .list_by_account(&fund.id)
        .unwrap();
    assert_eq!(valuations.len(), 2);
}

#[tokio::test]
async fn credit_outstanding_is_derived_from_the_log() {
    let db = setup();
    let bank = db.bank("checking", dec!(1000)).await;
    let card = db.credit_card("visa", dec!(5000)).await;

    let account_repository = db.account_repository();
    let transaction_repository = Arc::new(TransactionRepository::new(db.pool.clone()));
    let transaction_service = TransactionService::new(
        transaction_repository.clone(),
        account_repository.clone(),
        db.clock.clone(),
        db.pool.clone(),
    );
    let credit_service = CreditService::new(
        account_repository.clone(),
        transaction_repository.clone(),
        db.clock.clone(),
    );

    transaction_service
        .create_transaction(NewTransaction {
            id: None,
            user_id: "user-1".to_string(),
            account_id: card.id.clone(),
            category_id: Some("groceries".to_string()),
            kind: TransactionKind::Expense,
            amount: dec!(600),
            date: db.clock.today(),
            note: None,
        })
        .await
        .unwrap();

    // Expenses on the card never touch its stored balance
    assert_eq!(db.balance_of(&card.id), Decimal::ZERO);
    assert_eq!(
        credit_service
            .outstanding_balance("user-1", &card.id)
            .unwrap(),
        dec!(600)
    );

    let executor = db.transfer_executor();
    executor
        .repay(RepaymentRequest {
            user_id: "user-1".to_string(),
            source_account_id: bank.id.clone(),
            credit_account_id: card.id.clone(),
            amount: dec!(250),
            date: db.clock.today(),
            note: None,
        })
        .await
        .unwrap();

    assert_eq!(db.balance_of(&bank.id), dec!(750));
    assert_eq!(
        credit_service
            .outstanding_balance("user-1", &card.id)
            .unwrap(),
        dec!(350)
    );
    assert_eq!(
        credit_service.available_credit("user-1", &card.id).unwrap(),
        dec!(4650)
    );
    assert!(credit_service
        .is_over_limit("user-1", &card.id, dec!(4651))
        .unwrap());
}

#[tokio::test]
async fn reconciliation_sets_the_balance_and_audits_once() {
    let db = setup();
    let account = db.bank("wallet", dec!(100)).await;

    let service = ReconciliationService::new(
        db.account_repository(),
        Arc::new(BalanceAdjustmentRepository::new(db.pool.clone())),
        db.pool.clone(),
    );

    let adjustment = service
        .execute("user-1", &account.id, dec!(120.55), None)
        .await
        .unwrap();
    assert_eq!(adjustment.previous_balance, dec!(100));
    assert_eq!(adjustment.new_balance, dec!(120.55));
    assert_eq!(adjustment.difference, dec!(20.55));
    assert_eq!(db.balance_of(&account.id), dec!(120.55));

    // The stored balance now matches: a second run is a rejected no-op.
    let err = service
        .execute("user-1", &account.id, dec!(120.55), None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Ledger(LedgerError::NoAdjustmentNeeded)
    ));
    assert_eq!(
        service.list_adjustments("user-1", &account.id).unwrap().len(),
        1
    );
}

#[tokio::test]
async fn scheduled_plans_execute_against_the_real_store() {
    let db = setup();
    let bank = db.bank("funding", dec!(1000)).await;
    let fund = db.fund("index", dec!(1)).await;

    let account_repository = db.account_repository();
    let plan_repository = Arc::new(PlanRepository::new(db.pool.clone(), db.writer.clone()));
    let plan_service = PlanService::new(
        plan_repository.clone(),
        account_repository.clone(),
        db.clock.clone(),
    );

    let plan = plan_service
        .create_plan(NewPlan {
            id: None,
            user_id: "user-1".to_string(),
            source_account_id: bank.id.clone(),
            target_account_id: fund.id.clone(),
            amount: dec!(500),
            frequency: Frequency::Daily,
            execution_day: None,
            execution_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        })
        .await
        .unwrap();
    // Created on 2025-06-10: first due on the 11th
    assert_eq!(
        plan.next_execution_date,
        NaiveDate::from_ymd_opt(2025, 6, 11).unwrap()
    );

    let reminder_repository = Arc::new(InvestmentReminderRepository::new(
        db.pool.clone(),
        db.writer.clone(),
    ));
    let engine = ExecutionEngine::new(
        plan_repository.clone(),
        account_repository.clone(),
        Arc::new(ExecutionRecordRepository::new(db.pool.clone())),
        reminder_repository.clone(),
        Arc::new(db.transfer_executor()),
        db.clock.clone(),
        db.pool.clone(),
    );

    // Advance to the due date, past the execution time
    db.clock.advance(Duration::days(1) + Duration::hours(2));
    let summary = engine.run_due_plans().await.unwrap();
    assert_eq!(summary.executed, 1);

    assert_eq!(db.balance_of(&bank.id), dec!(500));
    assert_eq!(db.balance_of(&fund.id), dec!(500));

    let records = engine.list_records("user-1", Some(&plan.id)).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, ExecutionStatus::Success);
    assert_eq!(records[0].shares, dec!(500));

    let plan = plan_service.get_plan("user-1", &plan.id).unwrap();
    assert_eq!(
        plan.next_execution_date,
        NaiveDate::from_ymd_opt(2025, 6, 12).unwrap()
    );

    // Drain the funding account, then let the next run fail into a record
    db.clock.advance(Duration::days(1));
    let summary = engine.run_due_plans().await.unwrap();
    assert_eq!(summary.executed, 1); // 2025-06-12 execution drains to 0

    db.clock.advance(Duration::days(1));
    let summary = engine.run_due_plans().await.unwrap();
    assert_eq!(summary.failed, 1);

    let records = engine.list_records("user-1", Some(&plan.id)).unwrap();
    assert_eq!(records.len(), 3);
    assert!(records
        .iter()
        .any(|r| r.status == ExecutionStatus::Failed && r.fail_reason.is_some()));

    let reminders = reminder_repository.list("user-1", true).unwrap();
    assert_eq!(reminders.len(), 1);
    assert_eq!(reminders[0].kind, ReminderKind::ExecutionFailed);
}
