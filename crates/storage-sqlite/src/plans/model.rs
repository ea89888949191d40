//! Database model for auto-investment plans.

use std::str::FromStr;

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use kakebo_core::errors::{Error, Result};
use kakebo_core::plans::{AutoInvestmentPlan, Frequency, PlanStatus};

use crate::utils::{
    format_date, format_datetime, format_time, parse_date, parse_datetime, parse_decimal,
    parse_time,
};

/// Database model for auto-investment plans.
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
#[diesel(table_name = crate::schema::auto_investment_plans)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AutoInvestmentPlanDB {
    pub id: String,
    pub user_id: String,
    pub source_account_id: String,
    pub target_account_id: String,
    pub amount: String,
    pub frequency: String,
    pub execution_day: Option<i32>,
    pub execution_time: String,
    pub status: String,
    pub next_execution_date: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<AutoInvestmentPlanDB> for AutoInvestmentPlan {
    type Error = Error;

    fn try_from(db: AutoInvestmentPlanDB) -> Result<AutoInvestmentPlan> {
        Ok(AutoInvestmentPlan {
            amount: parse_decimal(&db.amount, "plan.amount"),
            frequency: Frequency::from_str(&db.frequency)?,
            execution_day: db.execution_day.map(|d| d as u32),
            execution_time: parse_time(&db.execution_time, "plan.executionTime"),
            status: PlanStatus::from_str(&db.status)?,
            next_execution_date: parse_date(&db.next_execution_date, "plan.nextExecutionDate"),
            created_at: parse_datetime(&db.created_at, "plan.createdAt"),
            updated_at: parse_datetime(&db.updated_at, "plan.updatedAt"),
            id: db.id,
            user_id: db.user_id,
            source_account_id: db.source_account_id,
            target_account_id: db.target_account_id,
        })
    }
}

impl From<&AutoInvestmentPlan> for AutoInvestmentPlanDB {
    fn from(domain: &AutoInvestmentPlan) -> Self {
        Self {
            id: domain.id.clone(),
            user_id: domain.user_id.clone(),
            source_account_id: domain.source_account_id.clone(),
            target_account_id: domain.target_account_id.clone(),
            amount: domain.amount.to_string(),
            frequency: domain.frequency.as_str().to_string(),
            execution_day: domain.execution_day.map(|d| d as i32),
            execution_time: format_time(domain.execution_time),
            status: domain.status.as_str().to_string(),
            next_execution_date: format_date(domain.next_execution_date),
            created_at: format_datetime(domain.created_at),
            updated_at: format_datetime(domain.updated_at),
        }
    }
}
