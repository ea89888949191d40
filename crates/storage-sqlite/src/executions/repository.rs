use std::sync::Arc;

use diesel::prelude::*;

use kakebo_core::db::{DbConnection, DbPool};
use kakebo_core::errors::Result;
use kakebo_core::executions::{
    ExecutionRecord, ExecutionRecordRepositoryTrait, NewExecutionRecord,
};

use crate::db::get_connection;
use crate::errors::IntoCore;
use crate::schema::execution_records;

use super::model::ExecutionRecordDB;

/// Repository for the append-only execution record log.
pub struct ExecutionRecordRepository {
    pool: Arc<DbPool>,
}

impl ExecutionRecordRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl ExecutionRecordRepositoryTrait for ExecutionRecordRepository {
    fn insert_in_tx(
        &self,
        new_record: NewExecutionRecord,
        conn: &mut DbConnection,
    ) -> Result<ExecutionRecord> {
        let row = ExecutionRecordDB::from_new(uuid::Uuid::new_v4().to_string(), new_record);
        diesel::insert_into(execution_records::table)
            .values(&row)
            .execute(conn)
            .into_core()?;
        row.try_into()
    }

    fn list(&self, user_id: &str, plan_id: Option<&str>) -> Result<Vec<ExecutionRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = execution_records::table
            .filter(execution_records::user_id.eq(user_id))
            .into_boxed();
        if let Some(plan_id) = plan_id {
            query = query.filter(execution_records::plan_id.eq(plan_id));
        }

        let rows = query
            .select(ExecutionRecordDB::as_select())
            .order(execution_records::executed_at.desc())
            .load::<ExecutionRecordDB>(&mut conn)
            .into_core()?;

        rows.into_iter().map(ExecutionRecord::try_from).collect()
    }
}
