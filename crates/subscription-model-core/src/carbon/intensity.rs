//! Default carbon intensity per tier.
//!
//! Each tier's price is expected to cover its carbon offset cost by a margin
//! that shrinks from `high_margin` on the cheapest tier to `low_margin` on the
//! most expensive one, interpolated in log space.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::time_value::{round_half_up, saturating_div};
use crate::types::Money;

pub const DEFAULT_HIGH_MARGIN: Decimal = dec!(1.5);
pub const DEFAULT_LOW_MARGIN: Decimal = dec!(1.1);

/// Whole tons of carbon per customer for each tier:
/// `round(price / cost_per_ton / margin)`.
///
/// Returns an empty vector when no derivation is possible (non-positive
/// cost per ton, or no tiers); callers then need an explicit override.
pub fn derive_carbon_per_customer(
    tier_prices: &[Money],
    cost_per_ton: Money,
    high_margin: Option<Decimal>,
    low_margin: Option<Decimal>,
) -> Vec<Decimal> {
    if tier_prices.is_empty() || cost_per_ton <= Decimal::ZERO {
        return Vec::new();
    }

    let high = high_margin
        .filter(|m| *m > Decimal::ZERO)
        .unwrap_or(DEFAULT_HIGH_MARGIN);
    let low = low_margin
        .filter(|m| *m > Decimal::ZERO)
        .unwrap_or(DEFAULT_LOW_MARGIN);

    let n = tier_prices.len();
    let start_ln = high.ln();
    let end_ln = low.ln();

    tier_prices
        .iter()
        .enumerate()
        .map(|(idx, price)| {
            let ratio = if n == 1 {
                Decimal::ZERO
            } else {
                Decimal::from(idx as u64) / Decimal::from((n - 1) as u64)
            };
            let factor = (start_ln + (end_ln - start_ln) * ratio).exp();
            let tons = saturating_div(saturating_div(*price, cost_per_ton), factor);
            round_half_up(tons).max(Decimal::ZERO)
        })
        .collect()
}

/// Explicit per-tier values when they line up with the price list, otherwise
/// the derived defaults, otherwise zero carbon for every tier.
pub fn resolve_carbon_per_customer(
    tier_prices: &[Money],
    cost_per_ton: Money,
    carbon_override: Option<&[Decimal]>,
) -> Vec<Decimal> {
    if let Some(values) = carbon_override {
        if values.len() == tier_prices.len() {
            return values.iter().map(|v| (*v).max(Decimal::ZERO)).collect();
        }
        tracing::warn!(
            expected = tier_prices.len(),
            got = values.len(),
            "carbon override length does not match tiers; deriving defaults"
        );
    }
    let derived = derive_carbon_per_customer(tier_prices, cost_per_ton, None, None);
    if derived.len() == tier_prices.len() {
        derived
    } else {
        vec![Decimal::ZERO; tier_prices.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_log_interpolated_tons() {
        let res = derive_carbon_per_customer(
            &[dec!(100), dec!(200), dec!(300), dec!(400)],
            dec!(10),
            None,
            None,
        );
        assert_eq!(res, vec![dec!(7), dec!(15), dec!(25), dec!(36)]);
    }

    #[test]
    fn test_single_tier_uses_high_margin() {
        let res = derive_carbon_per_customer(&[dec!(150)], dec!(10), None, None);
        assert_eq!(res, vec![dec!(10)]);
    }

    #[test]
    fn test_no_derivation_without_cost() {
        assert!(derive_carbon_per_customer(&[dec!(100)], dec!(0), None, None).is_empty());
        assert!(derive_carbon_per_customer(&[], dec!(10), None, None).is_empty());
    }

    #[test]
    fn test_custom_margins() {
        let res = derive_carbon_per_customer(&[dec!(100), dec!(100)], dec!(10), Some(dec!(2)), Some(dec!(1)));
        assert_eq!(res, vec![dec!(5), dec!(10)]);
    }

    #[test]
    fn test_override_wins_when_lengths_match() {
        let res = resolve_carbon_per_customer(&[dec!(100), dec!(200)], dec!(10), Some(&[dec!(1), dec!(2)]));
        assert_eq!(res, vec![dec!(1), dec!(2)]);
    }

    #[test]
    fn test_mismatched_override_falls_back_to_derived() {
        let res = resolve_carbon_per_customer(&[dec!(100), dec!(200)], dec!(10), Some(&[dec!(1)]));
        assert_eq!(res, vec![dec!(7), dec!(18)]);
    }

    #[test]
    fn test_zero_carbon_when_nothing_available() {
        let res = resolve_carbon_per_customer(&[dec!(100), dec!(200)], dec!(0), None);
        assert_eq!(res, vec![Decimal::ZERO, Decimal::ZERO]);
    }
}
