use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::time_value::saturating_sum;
use crate::types::{Customers, Money};

/// Revenue recognised for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueAllocation {
    pub tier_customers: Vec<Customers>,
    pub tier_revenue: Vec<Money>,
    pub total: Money,
}

/// Adoption weights normalised to sum to 1.
///
/// Absent weights, a length that differs from `tiers`, or a non-positive sum
/// all give the uniform `1/n` split. Negative entries count as 0.
pub fn normalize_weights(weights: Option<&[Decimal]>, tiers: usize) -> Vec<Decimal> {
    if tiers == 0 {
        return Vec::new();
    }
    let uniform = vec![Decimal::ONE / Decimal::from(tiers as u64); tiers];
    let Some(weights) = weights else {
        return uniform;
    };
    if weights.len() != tiers {
        tracing::warn!(
            expected = tiers,
            got = weights.len(),
            "adoption weights do not match tiers; using a uniform split"
        );
        return uniform;
    }
    let clamped: Vec<Decimal> = weights.iter().map(|w| (*w).max(Decimal::ZERO)).collect();
    let total: Decimal = saturating_sum(clamped.iter().copied());
    if total <= Decimal::ZERO {
        return uniform;
    }
    clamped.into_iter().map(|w| w / total).collect()
}

/// Blended average revenue per customer: `Σ price × weight`.
pub fn average_revenue_per_customer(tier_prices: &[Money], weights: &[Decimal]) -> Money {
    saturating_sum(
        tier_prices
            .iter()
            .zip(weights.iter())
            .map(|(p, w)| p.saturating_mul(*w)),
    )
}

/// Distribute `customers` across tiers by `weights` and price each tier.
pub fn allocate_revenue(customers: Customers, tier_prices: &[Money], weights: &[Decimal]) -> RevenueAllocation {
    let tier_customers: Vec<Customers> = weights.iter().map(|w| customers.saturating_mul(*w)).collect();
    let tier_revenue: Vec<Money> = tier_customers
        .iter()
        .zip(tier_prices.iter())
        .map(|(c, p)| c.saturating_mul(*p))
        .collect();
    let total = saturating_sum(tier_revenue.iter().copied());
    RevenueAllocation {
        tier_customers,
        tier_revenue,
        total,
    }
}
