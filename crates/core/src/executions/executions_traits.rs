//! Execution record repository and engine traits.

use async_trait::async_trait;

use super::executions_model::{ExecutionRecord, NewExecutionRecord, OneTimeBuyInput, SweepSummary};
use crate::db::DbConnection;
use crate::errors::Result;

/// Persistence contract for execution records. Append-only.
pub trait ExecutionRecordRepositoryTrait: Send + Sync {
    /// Appends a record inside the caller's transaction, so the outcome
    /// commits atomically with the transfer (or with the schedule
    /// advancement, for failures).
    fn insert_in_tx(
        &self,
        new_record: NewExecutionRecord,
        conn: &mut DbConnection,
    ) -> Result<ExecutionRecord>;

    /// Lists a user's records, optionally for one plan, newest first.
    fn list(&self, user_id: &str, plan_id: Option<&str>) -> Result<Vec<ExecutionRecord>>;
}

/// The component that turns due plans into transfers and outcomes.
#[async_trait]
pub trait ExecutionEngineTrait: Send + Sync {
    /// Executes every due plan sequentially, each in its own transaction.
    ///
    /// A plan failure is converted into a failed execution record plus a
    /// reminder; it never aborts the pass or another plan's execution.
    async fn run_due_plans(&self) -> Result<SweepSummary>;

    /// Performs a one-off (possibly discounted) buy through the same
    /// transactional path. Not driven by the scheduler: failures propagate to
    /// the caller synchronously and leave no record.
    async fn execute_one_time_buy(&self, input: OneTimeBuyInput) -> Result<ExecutionRecord>;

    /// Daily sweep raising `InsufficientBalance` reminders for active plans
    /// due tomorrow whose source account cannot cover them. Duplicate unread
    /// reminders are suppressed. Returns how many reminders were raised.
    async fn sweep_insufficient_balance(&self) -> Result<usize>;

    /// Lists execution records for the caller.
    fn list_records(&self, user_id: &str, plan_id: Option<&str>) -> Result<Vec<ExecutionRecord>>;
}
