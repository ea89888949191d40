//! Pure, side-effect-free financial primitives.
//!
//! All monetary and quantity values are fixed-point decimals. Rounding is
//! half-away-from-zero to a fixed number of places per field class (money: 2,
//! shares/prices/rates: 4), applied once at the boundary of each public
//! function. Callers must not accumulate unrounded intermediate state across
//! calls.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::{MONEY_SCALE, QUANTITY_SCALE};

/// Rounds a monetary amount to 2 decimal places, half away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds a share count, unit price, or rate to 4 decimal places,
/// half away from zero.
pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(QUANTITY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Quantity-weighted blend of the prior cost basis with a new buy.
///
/// Returns `buy_price` when `cur_shares` is zero, `cur_cost` when
/// `buy_shares` is zero, and zero when the resulting total share count is
/// zero. The result always lies between the two input prices (up to rounding
/// tolerance).
pub fn weighted_average_cost(
    cur_shares: Decimal,
    cur_cost: Decimal,
    buy_shares: Decimal,
    buy_price: Decimal,
) -> Decimal {
    let total_shares = cur_shares + buy_shares;
    if total_shares.is_zero() {
        return Decimal::ZERO;
    }
    round_quantity((cur_shares * cur_cost + buy_shares * buy_price) / total_shares)
}

/// Profit locked in by selling `sell_shares` at `sell_price` against the
/// position's `cost_price`.
pub fn realized_profit(sell_shares: Decimal, sell_price: Decimal, cost_price: Decimal) -> Decimal {
    round_money(sell_shares * (sell_price - cost_price))
}

/// Mark-to-market value of a position.
pub fn market_value(shares: Decimal, net_value: Decimal) -> Decimal {
    round_money(shares * net_value)
}

/// Total acquisition cost of a position.
pub fn total_cost(shares: Decimal, cost_price: Decimal) -> Decimal {
    round_money(shares * cost_price)
}

/// Unrealized profit of a position.
pub fn profit(market_value: Decimal, total_cost: Decimal) -> Decimal {
    round_money(market_value - total_cost)
}

/// Unrealized profit as a percentage of total cost. Zero when there is no
/// cost basis.
pub fn profit_rate(profit: Decimal, total_cost: Decimal) -> Decimal {
    if total_cost > Decimal::ZERO {
        round_quantity(Decimal::ONE_HUNDRED * profit / total_cost)
    } else {
        Decimal::ZERO
    }
}

/// Ratio of the amount actually paid to the investment value received.
///
/// Equals 1 exactly when `paid_amount == invested_amount`. Zero when
/// `invested_amount` is zero (callers validate positivity before invoking).
pub fn discount_rate(paid_amount: Decimal, invested_amount: Decimal) -> Decimal {
    if invested_amount.is_zero() {
        return Decimal::ZERO;
    }
    if paid_amount == invested_amount {
        return Decimal::ONE;
    }
    round_quantity(paid_amount / invested_amount)
}

/// Number of shares a monetary amount buys at the given net value.
/// Zero when `net_value` is zero (callers validate positivity before
/// invoking).
pub fn share_count(amount: Decimal, net_value: Decimal) -> Decimal {
    if net_value.is_zero() {
        return Decimal::ZERO;
    }
    round_quantity(amount / net_value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn weighted_average_cost_blends_by_quantity() {
        // 100 shares @ 10.00 plus 100 shares @ 20.00 averages to 15.00
        assert_eq!(
            weighted_average_cost(dec!(100), dec!(10), dec!(100), dec!(20)),
            dec!(15)
        );
        // Unequal weights pull toward the larger lot
        assert_eq!(
            weighted_average_cost(dec!(300), dec!(10), dec!(100), dec!(20)),
            dec!(12.5)
        );
    }

    #[test]
    fn weighted_average_cost_identity_cases() {
        assert_eq!(
            weighted_average_cost(Decimal::ZERO, Decimal::ZERO, dec!(50), dec!(3.2)),
            dec!(3.2)
        );
        assert_eq!(
            weighted_average_cost(dec!(50), dec!(3.2), Decimal::ZERO, dec!(9.9)),
            dec!(3.2)
        );
        assert_eq!(
            weighted_average_cost(Decimal::ZERO, Decimal::ZERO, Decimal::ZERO, dec!(9.9)),
            Decimal::ZERO
        );
    }

    #[test]
    fn weighted_average_cost_rounds_to_four_places() {
        // (1 * 1 + 2 * 2) / 3 = 1.6666... -> 1.6667
        assert_eq!(
            weighted_average_cost(dec!(1), dec!(1), dec!(2), dec!(2)),
            dec!(1.6667)
        );
    }

    #[test]
    fn realized_profit_is_signed() {
        assert_eq!(realized_profit(dec!(10), dec!(12), dec!(10)), dec!(20));
        assert_eq!(realized_profit(dec!(10), dec!(8), dec!(10)), dec!(-20));
        assert_eq!(realized_profit(dec!(10), dec!(10), dec!(10)), Decimal::ZERO);
    }

    #[test]
    fn market_value_and_total_cost_round_to_money() {
        assert_eq!(market_value(dec!(3.3333), dec!(1.5)), dec!(5.00));
        assert_eq!(total_cost(dec!(3.3333), dec!(1.5)), dec!(5.00));
    }

    #[test]
    fn profit_rate_handles_zero_cost() {
        assert_eq!(profit_rate(dec!(50), dec!(200)), dec!(25));
        assert_eq!(profit_rate(dec!(50), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(profit_rate(dec!(50), dec!(-1)), Decimal::ZERO);
    }

    #[test]
    fn discount_rate_exact_cases() {
        assert_eq!(discount_rate(dec!(95), dec!(100)), dec!(0.95));
        assert_eq!(discount_rate(dec!(100), dec!(100)), Decimal::ONE);
        assert!(discount_rate(dec!(99.99), dec!(100)) < Decimal::ONE);
        assert_eq!(discount_rate(dec!(10), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn share_count_rounds_to_four_places() {
        // 1000 / 3 = 333.3333...
        assert_eq!(share_count(dec!(1000), dec!(3)), dec!(333.3333));
        assert_eq!(share_count(dec!(1000), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_money(dec!(1.005)), dec!(1.01));
        assert_eq!(round_money(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round_quantity(dec!(0.00005)), dec!(0.0001));
        assert_eq!(round_quantity(dec!(-0.00005)), dec!(-0.0001));
    }
}
