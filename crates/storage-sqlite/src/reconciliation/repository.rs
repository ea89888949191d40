use std::sync::Arc;

use diesel::prelude::*;

use kakebo_core::db::{DbConnection, DbPool};
use kakebo_core::errors::Result;
use kakebo_core::reconciliation::{
    BalanceAdjustment, BalanceAdjustmentRepositoryTrait, NewBalanceAdjustment,
};

use crate::db::get_connection;
use crate::errors::IntoCore;
use crate::schema::balance_adjustments;

use super::model::BalanceAdjustmentDB;

/// Repository for the append-only balance adjustment log.
pub struct BalanceAdjustmentRepository {
    pool: Arc<DbPool>,
}

impl BalanceAdjustmentRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl BalanceAdjustmentRepositoryTrait for BalanceAdjustmentRepository {
    fn insert_in_tx(
        &self,
        new_adjustment: NewBalanceAdjustment,
        conn: &mut DbConnection,
    ) -> Result<BalanceAdjustment> {
        let row = BalanceAdjustmentDB::from_new(uuid::Uuid::new_v4().to_string(), new_adjustment);
        diesel::insert_into(balance_adjustments::table)
            .values(&row)
            .execute(conn)
            .into_core()?;
        row.try_into()
    }

    fn list_by_account(&self, account_id: &str) -> Result<Vec<BalanceAdjustment>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = balance_adjustments::table
            .filter(balance_adjustments::account_id.eq(account_id))
            .select(BalanceAdjustmentDB::as_select())
            .order(balance_adjustments::created_at.desc())
            .load::<BalanceAdjustmentDB>(&mut conn)
            .into_core()?;

        rows.into_iter().map(BalanceAdjustment::try_from).collect()
    }
}
