//! Database model for investment reminders.

use std::str::FromStr;

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use kakebo_core::errors::{Error, Result};
use kakebo_core::reminders::{InvestmentReminder, NewInvestmentReminder, ReminderKind};

use crate::utils::{format_datetime, parse_datetime};

/// Database model for investment reminders.
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::investment_reminders)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InvestmentReminderDB {
    pub id: String,
    pub user_id: String,
    pub plan_id: String,
    pub kind: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: String,
}

impl TryFrom<InvestmentReminderDB> for InvestmentReminder {
    type Error = Error;

    fn try_from(db: InvestmentReminderDB) -> Result<InvestmentReminder> {
        Ok(InvestmentReminder {
            kind: ReminderKind::from_str(&db.kind)?,
            created_at: parse_datetime(&db.created_at, "reminder.createdAt"),
            id: db.id,
            user_id: db.user_id,
            plan_id: db.plan_id,
            message: db.message,
            is_read: db.is_read,
        })
    }
}

impl InvestmentReminderDB {
    /// Builds an insertable row from the input model, assigning the id and
    /// creation time.
    pub fn from_new(id: String, new_reminder: NewInvestmentReminder) -> Self {
        Self {
            id,
            user_id: new_reminder.user_id,
            plan_id: new_reminder.plan_id,
            kind: new_reminder.kind.as_str().to_string(),
            message: new_reminder.message,
            is_read: false,
            created_at: format_datetime(chrono::Utc::now().naive_utc()),
        }
    }
}
