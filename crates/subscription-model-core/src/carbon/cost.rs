use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::time_value::saturating_sum;
use crate::types::{Customers, Money};

/// Above this share of a month's revenue, carbon cost is flagged as eroding
/// the margin.
pub const MARGIN_WARNING_SHARE: Decimal = dec!(0.6);

/// Carbon tonnage and offset cost for one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarbonCost {
    pub tons: Decimal,
    pub cost: Money,
    /// `cost > 0.6 * revenue` for this month.
    pub margin_warning: bool,
}

/// Tons = Σ tier customers × tons per customer; cost = tons × cost per ton.
pub fn carbon_cost(
    tier_customers: &[Customers],
    tons_per_customer: &[Decimal],
    cost_per_ton: Money,
    revenue: Money,
) -> CarbonCost {
    let tons: Decimal = saturating_sum(
        tier_customers
            .iter()
            .zip(tons_per_customer.iter())
            .map(|(customers, tons)| (*customers).max(Decimal::ZERO).saturating_mul(*tons)),
    );
    let tons = tons.max(Decimal::ZERO);
    let cost = tons.saturating_mul(cost_per_ton);

    CarbonCost {
        tons,
        cost,
        margin_warning: cost > MARGIN_WARNING_SHARE.saturating_mul(revenue),
    }
}

/// Per tier, whether the implied carbon cost of one customer exceeds the
/// tier's price.
pub fn price_override_flags(
    tier_prices: &[Money],
    tons_per_customer: &[Decimal],
    cost_per_ton: Money,
) -> Vec<bool> {
    tier_prices
        .iter()
        .enumerate()
        .map(|(idx, price)| {
            let tons = tons_per_customer.get(idx).copied().unwrap_or(Decimal::ZERO);
            tons.saturating_mul(cost_per_ton) > *price
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_tons_and_cost() {
        let res = carbon_cost(&[dec!(10), dec!(5)], &[dec!(2), dec!(4)], dec!(25), dec!(10000));
        assert_eq!(res.tons, dec!(40));
        assert_eq!(res.cost, dec!(1000));
        assert!(!res.margin_warning);
    }

    #[test]
    fn test_margin_warning_above_sixty_percent() {
        let res = carbon_cost(&[dec!(1)], &[dec!(7)], dec!(10), dec!(100));
        assert!(res.margin_warning);
        let at_threshold = carbon_cost(&[dec!(1)], &[dec!(6)], dec!(10), dec!(100));
        assert!(!at_threshold.margin_warning);
    }

    #[test]
    fn test_no_warning_with_no_activity() {
        let res = carbon_cost(&[dec!(0)], &[dec!(7)], dec!(10), dec!(0));
        assert_eq!(res.cost, Decimal::ZERO);
        assert!(!res.margin_warning);
    }

    #[test]
    fn test_price_override_flags() {
        let flags = price_override_flags(&[dec!(100), dec!(500)], &[dec!(11), dec!(20)], dec!(10));
        assert_eq!(flags, vec![true, false]);
    }
}
