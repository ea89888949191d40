//! Plan repository and service traits.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::plans_model::{AutoInvestmentPlan, NewPlan, PlanUpdate};
use crate::db::DbConnection;
use crate::errors::Result;

/// Persistence contract for auto-investment plans.
#[async_trait]
pub trait PlanRepositoryTrait: Send + Sync {
    /// Persists a fully-built plan.
    async fn create(&self, plan: AutoInvestmentPlan) -> Result<AutoInvestmentPlan>;

    /// Replaces an existing plan row.
    async fn update(&self, plan: &AutoInvestmentPlan) -> Result<AutoInvestmentPlan>;

    /// Retrieves a user's plan by ID.
    fn get_by_id(&self, user_id: &str, plan_id: &str) -> Result<AutoInvestmentPlan>;

    /// Lists a user's plans; deleted plans are excluded unless requested.
    fn list(&self, user_id: &str, include_deleted: bool) -> Result<Vec<AutoInvestmentPlan>>;

    /// Lists all active plans (across users) whose next execution date is on
    /// or before `date`, ordered by next execution date then id. Used by the
    /// execution engine's sweep.
    fn list_due(&self, date: NaiveDate) -> Result<Vec<AutoInvestmentPlan>>;

    /// Lists all active plans whose next execution date is exactly `date`.
    /// Used by the balance-sufficiency sweep.
    fn list_active_due_on(&self, date: NaiveDate) -> Result<Vec<AutoInvestmentPlan>>;

    /// Advances a plan's next execution date inside the caller's transaction,
    /// so the advancement commits atomically with the execution outcome.
    fn set_next_execution_date_in_tx(
        &self,
        plan_id: &str,
        next_execution_date: NaiveDate,
        conn: &mut DbConnection,
    ) -> Result<()>;
}

/// Business contract for plan lifecycle operations.
#[async_trait]
pub trait PlanServiceTrait: Send + Sync {
    /// Creates a plan in the active state with its first execution date
    /// computed.
    async fn create_plan(&self, new_plan: NewPlan) -> Result<AutoInvestmentPlan>;

    /// Updates a plan's amount/schedule; the next execution date is
    /// recomputed only when the frequency or execution day changed.
    async fn update_plan(&self, update: PlanUpdate) -> Result<AutoInvestmentPlan>;

    /// Pauses an active plan. Pausing a plan in any other state is rejected.
    async fn pause_plan(&self, user_id: &str, plan_id: &str) -> Result<AutoInvestmentPlan>;

    /// Resumes a paused plan, recomputing its next execution date. Resuming
    /// a plan in any other state is rejected.
    async fn resume_plan(&self, user_id: &str, plan_id: &str) -> Result<AutoInvestmentPlan>;

    /// Deletes a plan. One-way: a deleted plan never leaves the deleted
    /// state.
    async fn delete_plan(&self, user_id: &str, plan_id: &str) -> Result<()>;

    /// Retrieves a plan by ID.
    fn get_plan(&self, user_id: &str, plan_id: &str) -> Result<AutoInvestmentPlan>;

    /// Lists a user's non-deleted plans.
    fn list_plans(&self, user_id: &str) -> Result<Vec<AutoInvestmentPlan>>;
}
