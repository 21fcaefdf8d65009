//! Tiered marketing funnel: budget → impressions → clicks → leads.
//!
//! The budget is split across four acquisition tiers by a fixed ratio. Higher
//! tiers see lower-quality traffic, modelled by decaying click-through and
//! conversion rates. Leads convert directly into new customers.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::time_value::{saturating_div, saturating_sum};
use crate::types::{Customers, Money, Percent};

pub const TIER_BUDGET_SPLIT: [Decimal; 4] = [dec!(0.4), dec!(0.3), dec!(0.2), dec!(0.1)];
pub const TIER_CPL_FACTORS: [Decimal; 4] = [dec!(1), dec!(1.6), dec!(2.5), dec!(4)];
pub const TIER_CVR_FACTORS: [Decimal; 4] = [dec!(1), dec!(0.65), dec!(0.35), dec!(0.15)];
pub const TIER_CTR_FACTORS: [Decimal; 4] = [dec!(1), dec!(0.65), dec!(0.35), dec!(0.15)];
/// Percent.
pub const MIN_TIER_CVR: Decimal = dec!(0.1);

const IMPRESSIONS_PER_MILLE: Decimal = dec!(1000);

/// Per-tier acquisition policy. All vectors are indexed by tier and must be of
/// equal length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunnelPolicy {
    /// Share of the total budget spent on each tier.
    pub budget_split: Vec<Decimal>,
    /// Relative cost of a lead per tier, tier 1 = 1.
    pub cpl_factors: Vec<Decimal>,
    /// Multiplier on the base conversion rate.
    pub cvr_factors: Vec<Decimal>,
    /// Multiplier on the base click-through rate.
    pub ctr_factors: Vec<Decimal>,
    /// Floor for each tier's conversion rate, in percent.
    pub min_cvr: Percent,
}

impl Default for FunnelPolicy {
    fn default() -> Self {
        Self {
            budget_split: TIER_BUDGET_SPLIT.to_vec(),
            cpl_factors: TIER_CPL_FACTORS.to_vec(),
            cvr_factors: TIER_CVR_FACTORS.to_vec(),
            ctr_factors: TIER_CTR_FACTORS.to_vec(),
            min_cvr: MIN_TIER_CVR,
        }
    }
}

impl FunnelPolicy {
    pub fn tier_count(&self) -> usize {
        self.budget_split.len()
    }

    pub fn is_consistent(&self) -> bool {
        let n = self.budget_split.len();
        n > 0
            && self.cpl_factors.len() == n
            && self.cvr_factors.len() == n
            && self.ctr_factors.len() == n
    }

    /// Conversion rate per tier in percent: `max(base * factor, min_cvr)`.
    pub fn tier_cvr(&self, base_cvr: Percent) -> Vec<Percent> {
        self.cvr_factors
            .iter()
            .map(|f| base_cvr.saturating_mul(*f).max(self.min_cvr))
            .collect()
    }

    /// Click-through rate per tier in percent. Never negative.
    pub fn tier_ctr(&self, base_ctr: Percent) -> Vec<Percent> {
        self.ctr_factors
            .iter()
            .map(|f| base_ctr.saturating_mul(*f).max(Decimal::ZERO))
            .collect()
    }
}

/// Funnel volumes for one month, per tier and in total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierMetrics {
    pub budgets: Vec<Money>,
    pub impressions: Vec<Decimal>,
    pub clicks: Vec<Decimal>,
    /// Percent.
    pub ctr: Vec<Percent>,
    /// Percent.
    pub cvr: Vec<Percent>,
    pub leads: Vec<Decimal>,
    /// Equal to `leads`: every lead is booked as a customer.
    pub new_customers: Vec<Customers>,
    pub cpl: Vec<Money>,
    pub total_budget: Money,
    pub total_impressions: Decimal,
    pub total_clicks: Decimal,
    pub total_leads: Decimal,
    pub total_new_customers: Customers,
}

/// Funnel metrics under the standard four-tier policy.
///
/// `tier_seasonal_factors`, when given, scales each tier's budget; missing
/// entries count as 1.
pub fn calculate_tier_metrics(
    base_cvr: Percent,
    total_budget: Money,
    ctr: Percent,
    cost_per_mille: Money,
    tier_seasonal_factors: Option<&[Decimal]>,
) -> TierMetrics {
    calculate_tier_metrics_with_policy(
        &FunnelPolicy::default(),
        base_cvr,
        total_budget,
        ctr,
        cost_per_mille,
        tier_seasonal_factors,
    )
}

/// Funnel metrics under an explicit policy. An inconsistent policy falls back
/// to the standard one.
pub fn calculate_tier_metrics_with_policy(
    policy: &FunnelPolicy,
    base_cvr: Percent,
    total_budget: Money,
    ctr: Percent,
    cost_per_mille: Money,
    tier_seasonal_factors: Option<&[Decimal]>,
) -> TierMetrics {
    let fallback;
    let policy = if policy.is_consistent() {
        policy
    } else {
        tracing::warn!("funnel policy vectors differ in length; using the standard policy");
        fallback = FunnelPolicy::default();
        &fallback
    };

    let budget = total_budget.max(Decimal::ZERO);
    let tier_ctr = policy.tier_ctr(ctr);
    let tier_cvr = policy.tier_cvr(base_cvr);

    let budgets: Vec<Money> = policy
        .budget_split
        .iter()
        .enumerate()
        .map(|(idx, split)| {
            let seasonal = tier_seasonal_factors
                .and_then(|f| f.get(idx).copied())
                .unwrap_or(Decimal::ONE)
                .max(Decimal::ZERO);
            budget.saturating_mul(*split).saturating_mul(seasonal).max(Decimal::ZERO)
        })
        .collect();

    let impressions: Vec<Decimal> = budgets
        .iter()
        .map(|b| {
            if cost_per_mille <= Decimal::ZERO {
                Decimal::ZERO
            } else {
                saturating_div(*b, cost_per_mille).saturating_mul(IMPRESSIONS_PER_MILLE)
            }
        })
        .collect();

    let clicks: Vec<Decimal> = impressions
        .iter()
        .zip(tier_ctr.iter())
        .map(|(imp, rate)| imp.saturating_mul(*rate) / dec!(100))
        .collect();

    let leads: Vec<Decimal> = clicks
        .iter()
        .zip(tier_cvr.iter())
        .map(|(clk, rate)| clk.saturating_mul(*rate) / dec!(100))
        .collect();

    let cpl: Vec<Money> = budgets
        .iter()
        .zip(leads.iter())
        .map(|(b, l)| saturating_div(*b, *l))
        .collect();

    let total_budget: Money = saturating_sum(budgets.iter().copied());
    let total_impressions: Decimal = saturating_sum(impressions.iter().copied());
    let total_clicks: Decimal = saturating_sum(clicks.iter().copied());
    let total_leads: Decimal = saturating_sum(leads.iter().copied());

    TierMetrics {
        new_customers: leads.clone(),
        budgets,
        impressions,
        clicks,
        ctr: tier_ctr,
        cvr: tier_cvr,
        leads,
        cpl,
        total_budget,
        total_impressions,
        total_clicks,
        total_leads,
        total_new_customers: total_leads,
    }
}

/// Budget-split weighted CPL and CVR across tiers.
pub fn blended_cpl_cvr(policy: &FunnelPolicy, metrics: &TierMetrics) -> (Money, Percent) {
    let cpl = saturating_sum(
        policy
            .budget_split
            .iter()
            .zip(metrics.cpl.iter())
            .map(|(w, v)| w.saturating_mul(*v)),
    );
    let cvr = saturating_sum(
        policy
            .budget_split
            .iter()
            .zip(metrics.cvr.iter())
            .map(|(w, v)| w.saturating_mul(*v)),
    );
    (cpl, cvr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sum_of_new_customers_equals_total() {
        let res = calculate_tier_metrics(dec!(4), dec!(10000), dec!(18), dec!(8), None);
        let sum: Decimal = res.new_customers.iter().copied().sum();
        assert!((sum - res.total_new_customers).abs() < dec!(0.0000001));
        assert_eq!(res.total_leads, res.total_new_customers);
    }

    #[test]
    fn test_tier_volumes() {
        let res = calculate_tier_metrics(dec!(10), dec!(1000), dec!(18), dec!(8), None);
        assert_eq!(res.budgets, vec![dec!(400), dec!(300), dec!(200), dec!(100)]);
        assert_eq!(res.impressions[0], dec!(50000));
        assert_eq!(res.clicks[0], dec!(9000));
        assert_eq!(res.leads[0], dec!(900));
        // Tier 4: 12500 impressions * 2.7% CTR = 337.5 clicks * 1.5% = 5.0625
        assert_eq!(res.clicks[3], dec!(337.5));
        assert_eq!(res.leads[3], dec!(5.0625));
        assert_eq!(res.cpl[0], dec!(400) / dec!(900));
    }

    #[test]
    fn test_cvr_floor() {
        let res = calculate_tier_metrics(dec!(0.2), dec!(1000), dec!(18), dec!(8), None);
        assert_eq!(res.cvr, vec![dec!(0.2), dec!(0.13), dec!(0.1), dec!(0.1)]);
    }

    #[test]
    fn test_zero_budget_yields_zero_leads() {
        let res = calculate_tier_metrics(dec!(10), dec!(0), dec!(18), dec!(8), None);
        assert_eq!(res.total_leads, Decimal::ZERO);
        assert!(res.cpl.iter().all(|c| c.is_zero()));
    }

    #[test]
    fn test_negative_budget_is_clamped() {
        let res = calculate_tier_metrics(dec!(10), dec!(-500), dec!(18), dec!(8), None);
        assert_eq!(res.total_impressions, Decimal::ZERO);
        assert_eq!(res.total_budget, Decimal::ZERO);
    }

    #[test]
    fn test_non_positive_cpm_yields_no_impressions() {
        let res = calculate_tier_metrics(dec!(10), dec!(1000), dec!(18), dec!(0), None);
        assert_eq!(res.total_impressions, Decimal::ZERO);
        assert_eq!(res.total_new_customers, Decimal::ZERO);
    }

    #[test]
    fn test_seasonal_factors_scale_budget() {
        let factors = [dec!(0.5), dec!(1), dec!(0), dec!(2)];
        let res = calculate_tier_metrics(dec!(10), dec!(1000), dec!(18), dec!(8), Some(&factors));
        assert_eq!(res.budgets, vec![dec!(200), dec!(300), dec!(0), dec!(200)]);
        assert_eq!(res.total_budget, dec!(700));
    }

    #[test]
    fn test_inconsistent_policy_falls_back() {
        let policy = FunnelPolicy {
            budget_split: vec![dec!(1)],
            ..FunnelPolicy::default()
        };
        let res = calculate_tier_metrics_with_policy(&policy, dec!(10), dec!(1000), dec!(18), dec!(8), None);
        assert_eq!(res.budgets.len(), 4);
    }

    #[test]
    fn test_blended_cvr_weights_lower_tiers() {
        let policy = FunnelPolicy::default();
        let res = calculate_tier_metrics(dec!(10), dec!(1000), dec!(18), dec!(8), None);
        let (_, cvr) = blended_cpl_cvr(&policy, &res);
        // 0.4*10 + 0.3*6.5 + 0.2*3.5 + 0.1*1.5
        assert_eq!(cvr, dec!(6.8));
    }
}
