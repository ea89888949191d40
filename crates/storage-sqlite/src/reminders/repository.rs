use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;

use kakebo_core::db::{DbConnection, DbPool};
use kakebo_core::errors::{Error, LedgerError, Result};
use kakebo_core::reminders::{
    InvestmentReminder, InvestmentReminderRepositoryTrait, NewInvestmentReminder, ReminderKind,
};

use crate::db::{get_connection, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::investment_reminders;

use super::model::InvestmentReminderDB;

/// Repository for managing investment reminders in the database.
pub struct InvestmentReminderRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl InvestmentReminderRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl InvestmentReminderRepositoryTrait for InvestmentReminderRepository {
    async fn create(&self, new_reminder: NewInvestmentReminder) -> Result<InvestmentReminder> {
        self.writer
            .exec(move |conn| {
                let row =
                    InvestmentReminderDB::from_new(uuid::Uuid::new_v4().to_string(), new_reminder);
                diesel::insert_into(investment_reminders::table)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;
                row.try_into()
            })
            .await
    }

    fn insert_in_tx(
        &self,
        new_reminder: NewInvestmentReminder,
        conn: &mut DbConnection,
    ) -> Result<InvestmentReminder> {
        let row = InvestmentReminderDB::from_new(uuid::Uuid::new_v4().to_string(), new_reminder);
        diesel::insert_into(investment_reminders::table)
            .values(&row)
            .execute(conn)
            .into_core()?;
        row.try_into()
    }

    fn has_unread(&self, plan_id: &str, kind: ReminderKind) -> Result<bool> {
        use diesel::dsl::count_star;

        let mut conn = get_connection(&self.pool)?;
        let count: i64 = investment_reminders::table
            .filter(investment_reminders::plan_id.eq(plan_id))
            .filter(investment_reminders::kind.eq(kind.as_str()))
            .filter(investment_reminders::is_read.eq(false))
            .select(count_star())
            .first(&mut conn)
            .into_core()?;
        Ok(count > 0)
    }

    async fn mark_read(&self, user_id: &str, reminder_id: &str) -> Result<InvestmentReminder> {
        let user_id = user_id.to_string();
        let reminder_id = reminder_id.to_string();

        self.writer
            .exec(move |conn| {
                let mut row = investment_reminders::table
                    .filter(investment_reminders::id.eq(&reminder_id))
                    .filter(investment_reminders::user_id.eq(&user_id))
                    .select(InvestmentReminderDB::as_select())
                    .first::<InvestmentReminderDB>(conn)
                    .optional()
                    .into_core()?
                    .ok_or_else(|| {
                        Error::Ledger(LedgerError::NotFound {
                            entity: "reminder",
                            id: reminder_id.clone(),
                        })
                    })?;

                row.is_read = true;
                diesel::update(investment_reminders::table.find(&row.id))
                    .set(investment_reminders::is_read.eq(true))
                    .execute(conn)
                    .into_core()?;

                row.try_into()
            })
            .await
    }

    fn list(&self, user_id: &str, unread_only: bool) -> Result<Vec<InvestmentReminder>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = investment_reminders::table
            .filter(investment_reminders::user_id.eq(user_id))
            .into_boxed();
        if unread_only {
            query = query.filter(investment_reminders::is_read.eq(false));
        }

        let rows = query
            .select(InvestmentReminderDB::as_select())
            .order(investment_reminders::created_at.desc())
            .load::<InvestmentReminderDB>(&mut conn)
            .into_core()?;

        rows.into_iter().map(InvestmentReminder::try_from).collect()
    }
}
