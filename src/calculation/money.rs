//! Decimal helpers for money and percentages.
//!
//! All monetary amounts leave the engine rounded to øre (two decimals) with
//! half-away-from-zero rounding. Intermediate rates keep full precision.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// One hundred, for percentage arithmetic.
pub const HUNDRED: Decimal = Decimal::from_parts(100, 0, 0, false, 0);

/// Rounds an amount to two decimals, half away from zero.
///
/// # Examples
///
/// ```
/// use transport_pay_engine::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("10.005").unwrap()), Decimal::from_str("10.01").unwrap());
/// assert_eq!(round_money(Decimal::from_str("10.004").unwrap()), Decimal::from_str("10.00").unwrap());
/// ```
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns `percent`% of `base`, rounded to two decimals.
///
/// ```
/// use transport_pay_engine::calculation::percent_of;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let base = Decimal::from_str("1000.00").unwrap();
/// assert_eq!(percent_of(base, Decimal::from_str("12.5").unwrap()), Decimal::from_str("125.00").unwrap());
/// ```
pub fn percent_of(base: Decimal, percent: Decimal) -> Decimal {
    round_money(base * percent / HUNDRED)
}

/// The outcome of flooring a computed amount at a guaranteed minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuaranteeOutcome {
    /// The amount before the guarantee.
    pub computed: Decimal,
    /// The guaranteed minimum.
    pub guarantee: Decimal,
    /// max(computed, guarantee).
    pub payable: Decimal,
    /// payable − computed; zero when the guarantee did not apply.
    pub top_up: Decimal,
}

impl GuaranteeOutcome {
    /// Returns true if the guarantee raised the payable amount.
    pub fn applied(&self) -> bool {
        self.top_up > Decimal::ZERO
    }
}

/// Floors `computed` at `guarantee`.
///
/// Never errors and never lowers an amount. Applying it again to the
/// payable amount is a no-op.
///
/// # Examples
///
/// ```
/// use transport_pay_engine::calculation::apply_guarantee;
/// use rust_decimal::Decimal;
///
/// let outcome = apply_guarantee(Decimal::from(900), Decimal::from(1250));
/// assert_eq!(outcome.payable, Decimal::from(1250));
/// assert_eq!(outcome.top_up, Decimal::from(350));
///
/// let again = apply_guarantee(outcome.payable, Decimal::from(1250));
/// assert_eq!(again.payable, outcome.payable);
/// assert!(!again.applied());
/// ```
pub fn apply_guarantee(computed: Decimal, guarantee: Decimal) -> GuaranteeOutcome {
    let payable = computed.max(guarantee);
    GuaranteeOutcome {
        computed,
        guarantee,
        payable,
        top_up: payable - computed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_round_money_half_away_from_zero() {
        assert_eq!(round_money(dec("0.125")), dec("0.13"));
        assert_eq!(round_money(dec("-0.125")), dec("-0.13"));
        assert_eq!(round_money(dec("136.8")), dec("136.80"));
    }

    #[test]
    fn test_percent_of_rounds_result() {
        assert_eq!(percent_of(dec("1322.00"), dec("9")), dec("118.98"));
        assert_eq!(percent_of(dec("100.01"), dec("2.5")), dec("2.50"));
    }

    #[test]
    fn test_percent_of_zero_base() {
        assert_eq!(percent_of(Decimal::ZERO, dec("12.5")), Decimal::ZERO);
    }

    #[test]
    fn test_guarantee_not_applied_above_floor() {
        let outcome = apply_guarantee(dec("1400.00"), dec("1250.00"));
        assert_eq!(outcome.payable, dec("1400.00"));
        assert_eq!(outcome.top_up, Decimal::ZERO);
        assert!(!outcome.applied());
    }

    #[test]
    fn test_guarantee_applied_below_floor() {
        let outcome = apply_guarantee(dec("1000.50"), dec("1250.00"));
        assert_eq!(outcome.payable, dec("1250.00"));
        assert_eq!(outcome.top_up, dec("249.50"));
        assert!(outcome.applied());
        assert_eq!(outcome.computed, dec("1000.50"));
    }

    #[test]
    fn test_guarantee_equal_to_floor() {
        let outcome = apply_guarantee(dec("1250.00"), dec("1250.00"));
        assert_eq!(outcome.top_up, Decimal::ZERO);
    }
}
