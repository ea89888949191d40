//! Database model for position valuation snapshots.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use kakebo_core::errors::{Error, Result};
use kakebo_core::valuations::{NewPositionValuation, PositionValuation};

use crate::utils::{format_datetime, parse_datetime, parse_decimal};

/// Database model for position valuations.
#[derive(
    Queryable, Identifiable, Insertable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::position_valuations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PositionValuationDB {
    pub id: String,
    pub account_id: String,
    pub shares: String,
    pub cost_price: String,
    pub net_value: String,
    pub market_value: String,
    pub snapshot_at: String,
}

impl TryFrom<PositionValuationDB> for PositionValuation {
    type Error = Error;

    fn try_from(db: PositionValuationDB) -> Result<PositionValuation> {
        Ok(PositionValuation {
            shares: parse_decimal(&db.shares, "valuation.shares"),
            cost_price: parse_decimal(&db.cost_price, "valuation.costPrice"),
            net_value: parse_decimal(&db.net_value, "valuation.netValue"),
            market_value: parse_decimal(&db.market_value, "valuation.marketValue"),
            snapshot_at: parse_datetime(&db.snapshot_at, "valuation.snapshotAt"),
            id: db.id,
            account_id: db.account_id,
        })
    }
}

impl PositionValuationDB {
    /// Builds an insertable row from the input model, assigning the id.
    pub fn from_new(id: String, new_valuation: NewPositionValuation) -> Self {
        Self {
            id,
            account_id: new_valuation.account_id,
            shares: new_valuation.shares.to_string(),
            cost_price: new_valuation.cost_price.to_string(),
            net_value: new_valuation.net_value.to_string(),
            market_value: new_valuation.market_value.to_string(),
            snapshot_at: format_datetime(new_valuation.snapshot_at),
        }
    }
}
