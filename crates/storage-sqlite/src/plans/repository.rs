use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::prelude::*;

use kakebo_core::db::{DbConnection, DbPool};
use kakebo_core::errors::{Error, LedgerError, Result};
use kakebo_core::plans::{AutoInvestmentPlan, PlanRepositoryTrait, PlanStatus};

use crate::db::{get_connection, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::auto_investment_plans;
use crate::utils::format_date;

use super::model::AutoInvestmentPlanDB;

/// Repository for managing auto-investment plans in the database.
pub struct PlanRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl PlanRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl PlanRepositoryTrait for PlanRepository {
    async fn create(&self, plan: AutoInvestmentPlan) -> Result<AutoInvestmentPlan> {
        self.writer
            .exec(move |conn| {
                let row = AutoInvestmentPlanDB::from(&plan);
                diesel::insert_into(auto_investment_plans::table)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;
                Ok(plan)
            })
            .await
    }

    async fn update(&self, plan: &AutoInvestmentPlan) -> Result<AutoInvestmentPlan> {
        let plan = plan.clone();
        self.writer
            .exec(move |conn| {
                let row = AutoInvestmentPlanDB::from(&plan);
                let updated = diesel::update(auto_investment_plans::table.find(&row.id))
                    .set(&row)
                    .execute(conn)
                    .into_core()?;
                if updated == 0 {
                    return Err(Error::Ledger(LedgerError::NotFound {
                        entity: "plan",
                        id: plan.id.clone(),
                    }));
                }
                Ok(plan)
            })
            .await
    }

    fn get_by_id(&self, user_id: &str, plan_id: &str) -> Result<AutoInvestmentPlan> {
        let mut conn = get_connection(&self.pool)?;

        let row = auto_investment_plans::table
            .filter(auto_investment_plans::id.eq(plan_id))
            .filter(auto_investment_plans::user_id.eq(user_id))
            .select(AutoInvestmentPlanDB::as_select())
            .first::<AutoInvestmentPlanDB>(&mut conn)
            .optional()
            .into_core()?
            .ok_or_else(|| {
                Error::Ledger(LedgerError::NotFound {
                    entity: "plan",
                    id: plan_id.to_string(),
                })
            })?;
        row.try_into()
    }

    fn list(&self, user_id: &str, include_deleted: bool) -> Result<Vec<AutoInvestmentPlan>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = auto_investment_plans::table
            .filter(auto_investment_plans::user_id.eq(user_id))
            .into_boxed();
        if !include_deleted {
            query = query
                .filter(auto_investment_plans::status.ne(PlanStatus::Deleted.as_str()));
        }

        let rows = query
            .select(AutoInvestmentPlanDB::as_select())
            .order(auto_investment_plans::created_at.desc())
            .load::<AutoInvestmentPlanDB>(&mut conn)
            .into_core()?;

        rows.into_iter().map(AutoInvestmentPlan::try_from).collect()
    }

    fn list_due(&self, date: NaiveDate) -> Result<Vec<AutoInvestmentPlan>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = auto_investment_plans::table
            .filter(auto_investment_plans::status.eq(PlanStatus::Active.as_str()))
            .filter(auto_investment_plans::next_execution_date.le(format_date(date)))
            .select(AutoInvestmentPlanDB::as_select())
            .order((
                auto_investment_plans::next_execution_date.asc(),
                auto_investment_plans::id.asc(),
            ))
            .load::<AutoInvestmentPlanDB>(&mut conn)
            .into_core()?;

        rows.into_iter().map(AutoInvestmentPlan::try_from).collect()
    }

    fn list_active_due_on(&self, date: NaiveDate) -> Result<Vec<AutoInvestmentPlan>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = auto_investment_plans::table
            .filter(auto_investment_plans::status.eq(PlanStatus::Active.as_str()))
            .filter(auto_investment_plans::next_execution_date.eq(format_date(date)))
            .select(AutoInvestmentPlanDB::as_select())
            .order(auto_investment_plans::id.asc())
            .load::<AutoInvestmentPlanDB>(&mut conn)
            .into_core()?;

        rows.into_iter().map(AutoInvestmentPlan::try_from).collect()
    }

    fn set_next_execution_date_in_tx(
        &self,
        plan_id: &str,
        next_execution_date: NaiveDate,
        conn: &mut DbConnection,
    ) -> Result<()> {
        let updated = diesel::update(auto_investment_plans::table.find(plan_id))
            .set(auto_investment_plans::next_execution_date.eq(format_date(next_execution_date)))
            .execute(conn)
            .into_core()?;
        if updated == 0 {
            return Err(Error::Ledger(LedgerError::NotFound {
                entity: "plan",
                id: plan_id.to_string(),
            }));
        }
        Ok(())
    }
}
