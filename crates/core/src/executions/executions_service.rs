use log::{error, info, warn};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};
use rust_decimal::Decimal;

use super::executions_model::{
    ExecutionRecord, ExecutionStatus, NewExecutionRecord, OneTimeBuyInput, SweepSummary,
};
use super::executions_traits::{ExecutionEngineTrait, ExecutionRecordRepositoryTrait};
use crate::accounts::AccountRepositoryTrait;
use crate::db::DbTransactionExecutor;
use crate::errors::{Error, LedgerError, Result};
use crate::plans::{next_execution_date, AutoInvestmentPlan, PlanRepositoryTrait};
use crate::reminders::{InvestmentReminderRepositoryTrait, NewInvestmentReminder, ReminderKind};
use crate::transfers::{TransferExecutorTrait, TransferOutcome, TransferRequest};
use crate::utils::Clock;

/// Drives scheduled plan executions and one-off buys.
pub struct ExecutionEngine<E: DbTransactionExecutor + Send + Sync + Clone> {
    plan_repository: Arc<dyn PlanRepositoryTrait>,
    account_repository: Arc<dyn AccountRepositoryTrait>,
    execution_repository: Arc<dyn ExecutionRecordRepositoryTrait>,
    reminder_repository: Arc<dyn InvestmentReminderRepositoryTrait>,
    transfer_executor: Arc<dyn TransferExecutorTrait>,
    clock: Arc<dyn Clock>,
    transaction_executor: E,
}

impl<E: DbTransactionExecutor + Send + Sync + Clone> ExecutionEngine<E> {
    pub fn new(
        plan_repository: Arc<dyn PlanRepositoryTrait>,
        account_repository: Arc<dyn AccountRepositoryTrait>,
        execution_repository: Arc<dyn ExecutionRecordRepositoryTrait>,
        reminder_repository: Arc<dyn InvestmentReminderRepositoryTrait>,
        transfer_executor: Arc<dyn TransferExecutorTrait>,
        clock: Arc<dyn Clock>,
        transaction_executor: E,
    ) -> Self {
        Self {
            plan_repository,
            account_repository,
            execution_repository,
            reminder_repository,
            transfer_executor,
            clock,
            transaction_executor,
        }
    }

    fn success_record(
        plan: &AutoInvestmentPlan,
        outcome: &TransferOutcome,
        executed_at: NaiveDateTime,
    ) -> NewExecutionRecord {
        NewExecutionRecord {
            user_id: plan.user_id.clone(),
            plan_id: Some(plan.id.clone()),
            source_account_id: plan.source_account_id.clone(),
            target_account_id: plan.target_account_id.clone(),
            paid_amount: plan.amount,
            invested_amount: plan.amount,
            discount_rate: outcome.discount_rate,
            shares: outcome.shares_acquired,
            net_value: outcome.net_value,
            status: ExecutionStatus::Success,
            fail_reason: None,
            executed_at,
        }
    }

    fn failed_record(
        plan: &AutoInvestmentPlan,
        err: &Error,
        executed_at: NaiveDateTime,
    ) -> NewExecutionRecord {
        NewExecutionRecord {
            user_id: plan.user_id.clone(),
            plan_id: Some(plan.id.clone()),
            source_account_id: plan.source_account_id.clone(),
            target_account_id: plan.target_account_id.clone(),
            paid_amount: plan.amount,
            invested_amount: plan.amount,
            discount_rate: Decimal::ONE,
            shares: Decimal::ZERO,
            net_value: Decimal::ZERO,
            status: ExecutionStatus::Failed,
            fail_reason: Some(err.to_string()),
            executed_at,
        }
    }

    /// Attempts one plan's transfer.
    ///
    /// Success commits the transfer, the record, and the schedule advancement
    /// in one transaction. Failure rolls the transfer back, then commits a
    /// failed record, the schedule advancement (so the same date is never
    /// retried indefinitely), and a reminder in a second transaction.
    fn execute_plan(&self, plan: &AutoInvestmentPlan, now: NaiveDateTime) -> Result<ExecutionRecord> {
        let request = TransferRequest {
            user_id: plan.user_id.clone(),
            source_account_id: plan.source_account_id.clone(),
            target_account_id: plan.target_account_id.clone(),
            debit_amount: plan.amount,
            credit_amount: plan.amount,
        };
        // Advance from today, not the (possibly stale) due date, so a plan
        // that sat overdue does not immediately re-fire.
        let next = next_execution_date(plan.frequency, plan.execution_day, now.date());

        let attempt = self.transaction_executor.execute(|conn| {
            let outcome = self
                .transfer_executor
                .execute_transfer_in_tx(&request, conn)?;
            let record = self
                .execution_repository
                .insert_in_tx(Self::success_record(plan, &outcome, now), conn)?;
            self.plan_repository
                .set_next_execution_date_in_tx(&plan.id, next, conn)?;
            Ok::<_, Error>(record)
        });

        match attempt {
            Ok(record) => {
                info!(
                    "Executed plan {}: {} from {} to {}",
                    plan.id, plan.amount, plan.source_account_id, plan.target_account_id
                );
                Ok(record)
            }
            Err(err) => {
                warn!("Scheduled execution of plan {} failed: {err}", plan.id);
                self.transaction_executor.execute(|conn| {
                    let record = self
                        .execution_repository
                        .insert_in_tx(Self::failed_record(plan, &err, now), conn)?;
                    self.plan_repository
                        .set_next_execution_date_in_tx(&plan.id, next, conn)?;
                    self.reminder_repository.insert_in_tx(
                        NewInvestmentReminder {
                            user_id: plan.user_id.clone(),
                            plan_id: plan.id.clone(),
                            kind: ReminderKind::ExecutionFailed,
                            message: format!(
                                "Scheduled transfer of {} from account {} failed: {err}",
                                plan.amount, plan.source_account_id
                            ),
                        },
                        conn,
                    )?;
                    Ok::<_, Error>(record)
                })
            }
        }
    }
}

#[async_trait]
impl<E: DbTransactionExecutor + Send + Sync + Clone> ExecutionEngineTrait for ExecutionEngine<E> {
    async fn run_due_plans(&self) -> Result<SweepSummary> {
        let now = self.clock.now();
        let today = now.date();
        let due_plans = self.plan_repository.list_due(today)?;

        let mut summary = SweepSummary::default();
        for plan in &due_plans {
            // A plan due today waits for its execution time; overdue dates
            // fire regardless so a missed tick cannot strand them.
            if plan.next_execution_date == today && plan.execution_time > now.time() {
                summary.skipped += 1;
                continue;
            }
            match self.execute_plan(plan, now) {
                Ok(record) if record.status == ExecutionStatus::Success => summary.executed += 1,
                Ok(_) => summary.failed += 1,
                Err(err) => {
                    // Even the failure bookkeeping failed; leave the plan for
                    // the next tick rather than aborting the whole pass.
                    error!("Recording outcome for plan {} failed: {err}", plan.id);
                    summary.errors += 1;
                }
            }
        }
        if !due_plans.is_empty() {
            info!(
                "Plan sweep: {} executed, {} failed, {} skipped, {} errors",
                summary.executed, summary.failed, summary.skipped, summary.errors
            );
        }
        Ok(summary)
    }

    async fn execute_one_time_buy(&self, input: OneTimeBuyInput) -> Result<ExecutionRecord> {
        input.validate()?;

        let target = self
            .account_repository
            .get_by_id(&input.user_id, &input.target_account_id)?;
        if !target.kind.is_investment() {
            return Err(LedgerError::InvalidAccountRole(format!(
                "one-off buy target {} must be an investment account",
                target.id
            ))
            .into());
        }

        let now = self.clock.now();
        let request = TransferRequest {
            user_id: input.user_id.clone(),
            source_account_id: input.source_account_id.clone(),
            target_account_id: input.target_account_id.clone(),
            debit_amount: input.paid_amount,
            credit_amount: input.invested_amount,
        };

        // No plan, no retry to protect: a failure aborts the transaction and
        // propagates without leaving a record.
        self.transaction_executor.execute(|conn| {
            let outcome = self
                .transfer_executor
                .execute_transfer_in_tx(&request, conn)?;
            let record = NewExecutionRecord {
                user_id: input.user_id.clone(),
                plan_id: None,
                source_account_id: input.source_account_id.clone(),
                target_account_id: input.target_account_id.clone(),
                paid_amount: input.paid_amount,
                invested_amount: input.invested_amount,
                discount_rate: outcome.discount_rate,
                shares: outcome.shares_acquired,
                net_value: outcome.net_value,
                status: ExecutionStatus::Success,
                fail_reason: None,
                executed_at: now,
            };
            self.execution_repository.insert_in_tx(record, conn)
        })
    }

    async fn sweep_insufficient_balance(&self) -> Result<usize> {
        let tomorrow = self.clock.today() + Duration::days(1);
        let plans = self.plan_repository.list_active_due_on(tomorrow)?;

        let mut raised = 0;
        for plan in plans {
            let source = match self
                .account_repository
                .get_by_id(&plan.user_id, &plan.source_account_id)
            {
                Ok(account) => account,
                Err(err) => {
                    warn!(
                        "Balance sweep could not load account {} for plan {}: {err}",
                        plan.source_account_id, plan.id
                    );
                    continue;
                }
            };
            if source.balance >= plan.amount {
                continue;
            }
            if self
                .reminder_repository
                .has_unread(&plan.id, ReminderKind::InsufficientBalance)?
            {
                continue;
            }

            self.reminder_repository
                .create(NewInvestmentReminder {
                    user_id: plan.user_id.clone(),
                    plan_id: plan.id.clone(),
                    kind: ReminderKind::InsufficientBalance,
                    message: format!(
                        "Account {} holds {} but plan {} needs {} tomorrow",
                        plan.source_account_id, source.balance, plan.id, plan.amount
                    ),
                })
                .await?;
            raised += 1;
        }
        Ok(raised)
    }

    fn list_records(&self, user_id: &str, plan_id: Option<&str>) -> Result<Vec<ExecutionRecord>> {
        self.execution_repository.list(user_id, plan_id)
    }
}
