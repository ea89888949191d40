//! Database model for balance adjustment audit rows.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use kakebo_core::errors::{Error, Result};
use kakebo_core::reconciliation::{BalanceAdjustment, NewBalanceAdjustment};

use crate::utils::{format_datetime, parse_datetime, parse_decimal};

/// Database model for balance adjustments.
#[derive(
    Queryable, Identifiable, Insertable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::balance_adjustments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BalanceAdjustmentDB {
    pub id: String,
    pub account_id: String,
    pub previous_balance: String,
    pub new_balance: String,
    pub difference: String,
    pub note: Option<String>,
    pub created_at: String,
}

impl TryFrom<BalanceAdjustmentDB> for BalanceAdjustment {
    type Error = Error;

    fn try_from(db: BalanceAdjustmentDB) -> Result<BalanceAdjustment> {
        Ok(BalanceAdjustment {
            previous_balance: parse_decimal(&db.previous_balance, "adjustment.previousBalance"),
            new_balance: parse_decimal(&db.new_balance, "adjustment.newBalance"),
            difference: parse_decimal(&db.difference, "adjustment.difference"),
            created_at: parse_datetime(&db.created_at, "adjustment.createdAt"),
            id: db.id,
            account_id: db.account_id,
            note: db.note,
        })
    }
}

impl BalanceAdjustmentDB {
    /// Builds an insertable row from the input model, assigning the id and
    /// creation time.
    pub fn from_new(id: String, new_adjustment: NewBalanceAdjustment) -> Self {
        Self {
            id,
            account_id: new_adjustment.account_id,
            previous_balance: new_adjustment.previous_balance.to_string(),
            new_balance: new_adjustment.new_balance.to_string(),
            difference: new_adjustment.difference.to_string(),
            note: new_adjustment.note,
            created_at: format_datetime(chrono::Utc::now().naive_utc()),
        }
    }
}
