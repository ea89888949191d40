//! Investment position valuation snapshots.
//!
//! A snapshot row is appended every time an investment position changes
//! (buy, sell, net-value update), capturing the position as of that moment.
//! Rows are immutable once written.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One immutable snapshot of an investment account's position.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionValuation {
    pub id: String,
    pub account_id: String,
    pub shares: Decimal,
    pub cost_price: Decimal,
    pub net_value: Decimal,
    pub market_value: Decimal,
    pub snapshot_at: NaiveDateTime,
}

/// Input model for appending a valuation snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPositionValuation {
    pub account_id: String,
    pub shares: Decimal,
    pub cost_price: Decimal,
    pub net_value: Decimal,
    pub market_value: Decimal,
    pub snapshot_at: NaiveDateTime,
}
