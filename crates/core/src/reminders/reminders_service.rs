use std::sync::Arc;

use async_trait::async_trait;

use super::reminders_model::InvestmentReminder;
use super::reminders_traits::{InvestmentReminderRepositoryTrait, ReminderServiceTrait};
use crate::errors::Result;

/// Service for reading and acknowledging reminders.
pub struct ReminderService {
    repository: Arc<dyn InvestmentReminderRepositoryTrait>,
}

impl ReminderService {
    pub fn new(repository: Arc<dyn InvestmentReminderRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ReminderServiceTrait for ReminderService {
    fn list_reminders(&self, user_id: &str, unread_only: bool) -> Result<Vec<InvestmentReminder>> {
        self.repository.list(user_id, unread_only)
    }

    async fn mark_read(&self, user_id: &str, reminder_id: &str) -> Result<InvestmentReminder> {
        self.repository.mark_read(user_id, reminder_id).await
    }
}
