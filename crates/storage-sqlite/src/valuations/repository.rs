use std::sync::Arc;

use diesel::prelude::*;

use kakebo_core::db::{DbConnection, DbPool};
use kakebo_core::errors::Result;
use kakebo_core::valuations::{
    NewPositionValuation, PositionValuation, PositionValuationRepositoryTrait,
};

use crate::db::get_connection;
use crate::errors::IntoCore;
use crate::schema::position_valuations;

use super::model::PositionValuationDB;

/// Repository for the append-only valuation snapshot log.
pub struct PositionValuationRepository {
    pool: Arc<DbPool>,
}

impl PositionValuationRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl PositionValuationRepositoryTrait for PositionValuationRepository {
    fn insert_in_tx(
        &self,
        new_valuation: NewPositionValuation,
        conn: &mut DbConnection,
    ) -> Result<PositionValuation> {
        let row = PositionValuationDB::from_new(uuid::Uuid::new_v4().to_string(), new_valuation);
        diesel::insert_into(position_valuations::table)
            .values(&row)
            .execute(conn)
            .into_core()?;
        row.try_into()
    }

    fn list_by_account(&self, account_id: &str) -> Result<Vec<PositionValuation>> {
        let mut conn = get_connection(&self.pool)?;

        let rows = position_valuations::table
            .filter(position_valuations::account_id.eq(account_id))
            .select(PositionValuationDB::as_select())
            .order(position_valuations::snapshot_at.desc())
            .load::<PositionValuationDB>(&mut conn)
            .into_core()?;

        rows.into_iter().map(PositionValuation::try_from).collect()
    }
}
