use log::debug;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use super::plans_model::{AutoInvestmentPlan, NewPlan, PlanStatus, PlanUpdate};
use super::plans_traits::{PlanRepositoryTrait, PlanServiceTrait};
use super::schedule::next_execution_date;
use crate::accounts::AccountRepositoryTrait;
use crate::errors::{Error, LedgerError, Result, ValidationError};
use crate::utils::Clock;

/// Service owning plan lifecycle and schedule recomputation.
pub struct PlanService {
    plan_repository: Arc<dyn PlanRepositoryTrait>,
    account_repository: Arc<dyn AccountRepositoryTrait>,
    clock: Arc<dyn Clock>,
}

impl PlanService {
    pub fn new(
        plan_repository: Arc<dyn PlanRepositoryTrait>,
        account_repository: Arc<dyn AccountRepositoryTrait>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            plan_repository,
            account_repository,
            clock,
        }
    }

    /// Loads a plan and rejects any operation on a deleted one.
    fn live_plan(&self, user_id: &str, plan_id: &str) -> Result<AutoInvestmentPlan> {
        let plan = self.plan_repository.get_by_id(user_id, plan_id)?;
        if plan.status == PlanStatus::Deleted {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "plan {plan_id} is deleted"
            ))));
        }
        Ok(plan)
    }

    /// Checks the transfer roles of the plan's two accounts up front, so a
    /// misconfigured plan fails at creation instead of at its first
    /// execution.
    fn check_accounts(&self, user_id: &str, source_id: &str, target_id: &str) -> Result<()> {
        let source = self.account_repository.get_by_id(user_id, source_id)?;
        if !source.kind.has_stored_balance() {
            return Err(LedgerError::InvalidAccountRole(format!(
                "plan source {} must be a balance-backed account",
                source.id
            ))
            .into());
        }
        let target = self.account_repository.get_by_id(user_id, target_id)?;
        if target.kind.is_credit() {
            return Err(LedgerError::InvalidAccountRole(format!(
                "plan target {} cannot be a credit account",
                target.id
            ))
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl PlanServiceTrait for PlanService {
    async fn create_plan(&self, new_plan: NewPlan) -> Result<AutoInvestmentPlan> {
        new_plan.validate()?;
        self.check_accounts(
            &new_plan.user_id,
            &new_plan.source_account_id,
            &new_plan.target_account_id,
        )?;

        let now = self.clock.now();
        let plan = AutoInvestmentPlan {
            id: new_plan.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            user_id: new_plan.user_id,
            source_account_id: new_plan.source_account_id,
            target_account_id: new_plan.target_account_id,
            amount: new_plan.amount,
            frequency: new_plan.frequency,
            execution_day: new_plan.execution_day,
            execution_time: new_plan.execution_time,
            status: PlanStatus::Active,
            next_execution_date: next_execution_date(
                new_plan.frequency,
                new_plan.execution_day,
                now.date(),
            ),
            created_at: now,
            updated_at: now,
        };
        debug!(
            "Creating {} plan {} ({} -> {})",
            plan.frequency, plan.id, plan.source_account_id, plan.target_account_id
        );
        self.plan_repository.create(plan).await
    }

    async fn update_plan(&self, update: PlanUpdate) -> Result<AutoInvestmentPlan> {
        update.validate()?;
        let existing = self.live_plan(&update.user_id, &update.id)?;

        let schedule_changed = existing.frequency != update.frequency
            || existing.execution_day != update.execution_day;
        let next = if schedule_changed {
            next_execution_date(update.frequency, update.execution_day, self.clock.today())
        } else {
            existing.next_execution_date
        };

        let updated = AutoInvestmentPlan {
            amount: update.amount,
            frequency: update.frequency,
            execution_day: update.execution_day,
            execution_time: update.execution_time,
            next_execution_date: next,
            updated_at: self.clock.now(),
            ..existing
        };
        self.plan_repository.update(&updated).await
    }

    async fn pause_plan(&self, user_id: &str, plan_id: &str) -> Result<AutoInvestmentPlan> {
        let plan = self.live_plan(user_id, plan_id)?;
        if plan.status != PlanStatus::Active {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "plan {plan_id} is not active"
            ))));
        }
        let paused = AutoInvestmentPlan {
            status: PlanStatus::Paused,
            updated_at: self.clock.now(),
            ..plan
        };
        self.plan_repository.update(&paused).await
    }

    async fn resume_plan(&self, user_id: &str, plan_id: &str) -> Result<AutoInvestmentPlan> {
        let plan = self.live_plan(user_id, plan_id)?;
        if plan.status != PlanStatus::Paused {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "plan {plan_id} is not paused"
            ))));
        }
        // A plan may have sat paused past its scheduled date; recompute so it
        // does not fire immediately for a stale date.
        let resumed = AutoInvestmentPlan {
            status: PlanStatus::Active,
            next_execution_date: next_execution_date(
                plan.frequency,
                plan.execution_day,
                self.clock.today(),
            ),
            updated_at: self.clock.now(),
            ..plan
        };
        self.plan_repository.update(&resumed).await
    }

    async fn delete_plan(&self, user_id: &str, plan_id: &str) -> Result<()> {
        let plan = self.live_plan(user_id, plan_id)?;
        let deleted = AutoInvestmentPlan {
            status: PlanStatus::Deleted,
            updated_at: self.clock.now(),
            ..plan
        };
        self.plan_repository.update(&deleted).await?;
        debug!("Deleted plan {plan_id}");
        Ok(())
    }

    fn get_plan(&self, user_id: &str, plan_id: &str) -> Result<AutoInvestmentPlan> {
        self.plan_repository.get_by_id(user_id, plan_id)
    }

    fn list_plans(&self, user_id: &str) -> Result<Vec<AutoInvestmentPlan>> {
        self.plan_repository.list(user_id, false)
    }
}
