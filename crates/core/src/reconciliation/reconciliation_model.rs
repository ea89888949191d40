//! Balance reconciliation (quick-balance) domain models.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sign of a reconciliation difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DifferenceKind {
    /// Actual balance above the stored balance.
    Profit,
    /// Actual balance below the stored balance.
    Loss,
    /// Balances already match.
    None,
}

/// `actual_balance - current_balance`.
pub fn calculate_difference(actual_balance: Decimal, current_balance: Decimal) -> Decimal {
    actual_balance - current_balance
}

/// Classifies a difference by sign.
pub fn classify_difference(difference: Decimal) -> DifferenceKind {
    if difference > Decimal::ZERO {
        DifferenceKind::Profit
    } else if difference < Decimal::ZERO {
        DifferenceKind::Loss
    } else {
        DifferenceKind::None
    }
}

/// Immutable audit row recording one applied correction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceAdjustment {
    pub id: String,
    pub account_id: String,
    pub previous_balance: Decimal,
    pub new_balance: Decimal,
    /// `new_balance - previous_balance`.
    pub difference: Decimal,
    pub note: Option<String>,
    pub created_at: NaiveDateTime,
}

/// Input model for appending an adjustment row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBalanceAdjustment {
    pub account_id: String,
    pub previous_balance: Decimal,
    pub new_balance: Decimal,
    pub difference: Decimal,
    pub note: Option<String>,
}

/// Dry-run view of a reconciliation, computed without mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationPreview {
    pub account_id: String,
    pub current_balance: Decimal,
    pub actual_balance: Decimal,
    pub difference: Decimal,
    pub kind: DifferenceKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn difference_is_antisymmetric() {
        let a = dec!(120.55);
        let b = dec!(98.20);
        assert_eq!(calculate_difference(a, b), dec!(22.35));
        assert_eq!(
            calculate_difference(a, b) + calculate_difference(b, a),
            Decimal::ZERO
        );
    }

    #[test]
    fn classification_follows_sign() {
        assert_eq!(classify_difference(dec!(0.01)), DifferenceKind::Profit);
        assert_eq!(classify_difference(dec!(-0.01)), DifferenceKind::Loss);
        assert_eq!(classify_difference(Decimal::ZERO), DifferenceKind::None);
    }
}
