//! Pure ledger arithmetic.

pub mod ledger_math;

pub use ledger_math::{
    discount_rate, market_value, profit, profit_rate, realized_profit, round_money,
    round_quantity, share_count, total_cost, weighted_average_cost,
};
