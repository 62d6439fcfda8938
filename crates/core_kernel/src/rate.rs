//! Rate and average arithmetic for reporting
//!
//! Every figure shown on a report (claim rates, averages, portfolio shares)
//! goes through [`round_half_away`], so two reports that derive the same
//! figure from the same records always print the same digits.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places used for claim rates
pub const RATE_DP: u32 = 2;

/// Decimal places used for averaged scores and credit scores
pub const AVERAGE_DP: u32 = 2;

/// Decimal places used for portfolio share percentages
pub const SHARE_DP: u32 = 1;

/// Decimal places used for averaged mileage
pub const MILEAGE_DP: u32 = 0;

/// Rounds half away from zero to exactly `dp` decimal places
///
/// `0.125 -> 0.13`, `-0.125 -> -0.13`, `2.5 -> 3` at zero places. The result
/// always carries `dp` places, so `1` at two places prints as `1.00`.
pub fn round_half_away(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded
}

/// Computes `numerator / denominator` rounded to `dp` places
///
/// Returns `None` when the denominator is zero, so an empty group can never
/// produce a zero or NaN rate.
pub fn ratio(numerator: u64, denominator: u64, dp: u32) -> Option<Decimal> {
    if denominator == 0 {
        return None;
    }
    let value = Decimal::from(numerator) / Decimal::from(denominator);
    Some(round_half_away(value, dp))
}

/// Computes `100 * part / whole` rounded to `dp` places
pub fn percentage(part: u64, whole: u64, dp: u32) -> Option<Decimal> {
    if whole == 0 {
        return None;
    }
    let value = Decimal::from(part) * Decimal::ONE_HUNDRED / Decimal::from(whole);
    Some(round_half_away(value, dp))
}

/// Averages a running decimal sum over `count` observations
pub fn average(sum: Decimal, count: u64, dp: u32) -> Option<Decimal> {
    if count == 0 {
        return None;
    }
    Some(round_half_away(sum / Decimal::from(count), dp))
}

/// Converts a floating point attribute to a decimal for exact accumulation
///
/// Non-finite values have no decimal representation and yield `None`.
pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    Decimal::from_f64(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(round_half_away(dec!(0.125), 2), dec!(0.13));
        assert_eq!(round_half_away(dec!(-0.125), 2), dec!(-0.13));
        assert_eq!(round_half_away(dec!(0.124), 2), dec!(0.12));
        assert_eq!(round_half_away(dec!(2.5), 0), dec!(3));
        assert_eq!(round_half_away(Decimal::ONE, 2).to_string(), "1.00");
    }

    #[test]
    fn test_ratio_zero_denominator() {
        assert_eq!(ratio(0, 0, RATE_DP), None);
        assert_eq!(ratio(3, 0, RATE_DP), None);
    }

    #[test]
    fn test_ratio_rounds_two_thirds() {
        assert_eq!(ratio(2, 3, RATE_DP), Some(dec!(0.67)));
        assert_eq!(ratio(1, 8, RATE_DP), Some(dec!(0.13)));
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(1, 3, SHARE_DP), Some(dec!(33.3)));
        assert_eq!(percentage(1, 16, SHARE_DP), Some(dec!(6.3)));
        assert_eq!(percentage(0, 0, SHARE_DP), None);
    }

    #[test]
    fn test_average() {
        assert_eq!(average(dec!(7), 2, AVERAGE_DP), Some(dec!(3.5)));
        assert_eq!(average(dec!(31000), 2, MILEAGE_DP), Some(dec!(15500)));
        assert_eq!(average(Decimal::ZERO, 0, AVERAGE_DP), None);
    }

    #[test]
    fn test_decimal_from_f64_rejects_nan() {
        assert!(decimal_from_f64(f64::NAN).is_none());
        assert_eq!(decimal_from_f64(0.5), Some(dec!(0.5)));
    }

    proptest! {
        #[test]
        fn ratio_of_subset_stays_within_unit_interval(total in 1u64..100_000, part in 0u64..100_000) {
            let part = part % (total + 1);
            let rate = ratio(part, total, RATE_DP).unwrap();
            prop_assert!(rate >= Decimal::ZERO);
            prop_assert!(rate <= Decimal::ONE);
        }
    }
}
