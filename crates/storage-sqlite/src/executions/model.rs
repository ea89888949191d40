//! Database model for execution records.

use std::str::FromStr;

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use kakebo_core::errors::{Error, Result};
use kakebo_core::executions::{ExecutionRecord, ExecutionStatus, NewExecutionRecord};

use crate::utils::{format_datetime, parse_datetime, parse_decimal};

/// Database model for execution records.
#[derive(
    Queryable, Identifiable, Insertable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::execution_records)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExecutionRecordDB {
    pub id: String,
    pub user_id: String,
    pub plan_id: Option<String>,
    pub source_account_id: String,
    pub target_account_id: String,
    pub paid_amount: String,
    pub invested_amount: String,
    pub discount_rate: String,
    pub shares: String,
    pub net_value: String,
    pub status: String,
    pub fail_reason: Option<String>,
    pub executed_at: String,
}

impl TryFrom<ExecutionRecordDB> for ExecutionRecord {
    type Error = Error;

    fn try_from(db: ExecutionRecordDB) -> Result<ExecutionRecord> {
        Ok(ExecutionRecord {
            paid_amount: parse_decimal(&db.paid_amount, "executionRecord.paidAmount"),
            invested_amount: parse_decimal(&db.invested_amount, "executionRecord.investedAmount"),
            discount_rate: parse_decimal(&db.discount_rate, "executionRecord.discountRate"),
            shares: parse_decimal(&db.shares, "executionRecord.shares"),
            net_value: parse_decimal(&db.net_value, "executionRecord.netValue"),
            status: ExecutionStatus::from_str(&db.status)?,
            executed_at: parse_datetime(&db.executed_at, "executionRecord.executedAt"),
            id: db.id,
            user_id: db.user_id,
            plan_id: db.plan_id,
            source_account_id: db.source_account_id,
            target_account_id: db.target_account_id,
            fail_reason: db.fail_reason,
        })
    }
}

impl ExecutionRecordDB {
    /// Builds an insertable row from the input model, assigning the id.
    pub fn from_new(id: String, new_record: NewExecutionRecord) -> Self {
        Self {
            id,
            user_id: new_record.user_id,
            plan_id: new_record.plan_id,
            source_account_id: new_record.source_account_id,
            target_account_id: new_record.target_account_id,
            paid_amount: new_record.paid_amount.to_string(),
            invested_amount: new_record.invested_amount.to_string(),
            discount_rate: new_record.discount_rate.to_string(),
            shares: new_record.shares.to_string(),
            net_value: new_record.net_value.to_string(),
            status: new_record.status.as_str().to_string(),
            fail_reason: new_record.fail_reason,
            executed_at: format_datetime(new_record.executed_at),
        }
    }
}
