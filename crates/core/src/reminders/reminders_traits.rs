//! Reminder repository and service traits.

use async_trait::async_trait;

use super::reminders_model::{InvestmentReminder, NewInvestmentReminder, ReminderKind};
use crate::db::DbConnection;
use crate::errors::Result;

/// Persistence contract for investment reminders.
#[async_trait]
pub trait InvestmentReminderRepositoryTrait: Send + Sync {
    /// Raises a reminder in its own write.
    async fn create(&self, new_reminder: NewInvestmentReminder) -> Result<InvestmentReminder>;

    /// Raises a reminder inside the caller's transaction (used by the
    /// execution engine so the reminder commits with the failed record).
    fn insert_in_tx(
        &self,
        new_reminder: NewInvestmentReminder,
        conn: &mut DbConnection,
    ) -> Result<InvestmentReminder>;

    /// Whether an unread reminder of this kind already exists for the plan.
    fn has_unread(&self, plan_id: &str, kind: ReminderKind) -> Result<bool>;

    /// Marks a reminder as read.
    async fn mark_read(&self, user_id: &str, reminder_id: &str) -> Result<InvestmentReminder>;

    /// Lists a user's reminders, newest first.
    fn list(&self, user_id: &str, unread_only: bool) -> Result<Vec<InvestmentReminder>>;
}

/// Business contract for reminder queries and acknowledgement.
#[async_trait]
pub trait ReminderServiceTrait: Send + Sync {
    /// Lists a user's reminders.
    fn list_reminders(&self, user_id: &str, unread_only: bool) -> Result<Vec<InvestmentReminder>>;

    /// Acknowledges a reminder.
    async fn mark_read(&self, user_id: &str, reminder_id: &str) -> Result<InvestmentReminder>;
}
