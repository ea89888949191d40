//! Engine-wide constants.

/// Decimal places for monetary amounts (balances, amounts, profits).
pub const MONEY_SCALE: u32 = 2;

/// Decimal places for share counts, unit prices, net values, and rates.
pub const QUANTITY_SCALE: u32 = 4;

/// Default number of days ahead of the due day at which a credit account
/// is considered due soon for reminder selection.
pub const DUE_SOON_THRESHOLD_DAYS: i64 = 3;

/// Default scheduler tick, in seconds. Due plans are evaluated once per tick.
pub const SCHEDULER_TICK_SECS: u64 = 60;
