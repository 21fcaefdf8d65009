//! Monthly subscription simulation.
//!
//! For each month: seasonal demand factor → marketing funnel → customer
//! roll-forward → tier revenue → carbon cost → free cash flow. The run is a
//! pure function of its [`ScenarioInput`]; nothing is shared between runs.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::carbon::cost::{carbon_cost, price_override_flags};
use crate::carbon::intensity::resolve_carbon_per_customer;
use crate::marketing::funnel::{blended_cpl_cvr, calculate_tier_metrics_with_policy, FunnelPolicy};
use crate::seasonality::{demand_factors, monthly_weights, SEASON_LENGTH};
use crate::time_value::{is_saturated, round_half_up, saturating_div, saturating_sum};
use crate::types::{with_metadata, ComputationOutput, Customers, Money, Percent};

use super::revenue::{allocate_revenue, average_revenue_per_customer, normalize_weights};
use super::rollforward::roll_forward;
use super::scenario::ScenarioInput;

const TRAILING_MONTHS: usize = 12;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One simulated month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySnapshot {
    /// 1-based month number
    pub month: u32,
    pub label: String,
    /// Share of the marketing budget deployed this month
    pub demand_factor: Decimal,
    pub marketing_spend: Money,
    pub impressions: Decimal,
    pub clicks: Decimal,
    pub leads: Decimal,
    pub new_customers: Customers,
    /// New customers per funnel tier
    pub tier_new_customers: Vec<Customers>,
    pub churned: Customers,
    /// Customers at month end, unrounded
    pub customers: Customers,
    /// Customers per pricing tier
    pub tier_customers: Vec<Customers>,
    /// Recognised revenue (MRR)
    pub revenue: Money,
    pub tier_revenue: Vec<Money>,
    pub carbon_tons: Decimal,
    pub carbon_cost: Money,
    pub free_cash_flow: Money,
    /// Carbon cost above 60% of this month's revenue
    pub margin_warning: bool,
}

/// Headline figures of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    /// Final month's MRR
    pub total_mrr: Money,
    /// Revenue over the trailing 12 months
    pub annual_revenue: Money,
    pub average_revenue_per_customer: Money,
    pub subscriber_ltv: Money,
    /// Final customer count, rounded to whole customers
    pub total_subscribers: Decimal,
    /// Mean new customers per month
    pub new_subscribers_monthly: Customers,
    pub blended_cpl: Money,
    /// Percent
    pub blended_cvr: Percent,
    pub total_carbon_tons: Decimal,
    pub total_carbon_cost: Money,
    /// Carbon spend as a percent of total revenue
    pub carbon_pct_of_revenue: Percent,
    pub blended_cost_per_ton: Money,
    /// Any month breached the carbon margin threshold
    pub margin_warning: bool,
    /// Per tier: carbon cost of one customer exceeds the tier price
    pub price_override_flags: Vec<bool>,
}

/// Full projection plus summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub months: Vec<MonthlySnapshot>,
    pub summary: SummaryMetrics,
    pub tier_prices: Vec<Money>,
    /// Normalised adoption weights used for the run
    pub tier_weights: Vec<Decimal>,
    /// Tons of carbon per customer used for the run
    pub carbon_per_customer: Vec<Decimal>,
}

impl SimulationResult {
    pub fn month_labels(&self) -> Vec<String> {
        self.months.iter().map(|m| m.label.clone()).collect()
    }

    pub fn free_cash_flows(&self) -> Vec<Money> {
        self.months.iter().map(|m| m.free_cash_flow).collect()
    }

    pub fn mrr_by_month(&self) -> Vec<Money> {
        self.months.iter().map(|m| m.revenue).collect()
    }

    pub fn customers_by_month(&self) -> Vec<Customers> {
        self.months.iter().map(|m| m.customers).collect()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run the monthly projection, blending seasonality from the scenario's own
/// curve and influence.
pub fn run_subscription_model(input: &ScenarioInput) -> ComputationOutput<SimulationResult> {
    run_subscription_model_with_blend(input, None)
}

/// Run the monthly projection with an optional pre-blended 12-point weight
/// vector. A vector of any other length is ignored in favour of uniform
/// months.
pub fn run_subscription_model_with_blend(
    input: &ScenarioInput,
    seasonal_blend: Option<&[Decimal]>,
) -> ComputationOutput<SimulationResult> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let weights = match seasonal_blend {
        Some(blend) => monthly_weights(Some(blend), dec!(100)),
        None => monthly_weights(input.seasonality.as_deref(), input.seasonality_influence),
    };
    let demand = demand_factors(&weights);

    let tiers = input.tier_prices.len();
    if let Some(adoption) = &input.tier_adoption {
        if adoption.len() != tiers {
            warnings.push(format!(
                "Adoption weights ({}) do not match pricing tiers ({tiers}); using a uniform split",
                adoption.len()
            ));
        }
    }
    let tier_weights = normalize_weights(input.tier_adoption.as_deref(), tiers);
    let carbon_per_customer = resolve_carbon_per_customer(
        &input.tier_prices,
        input.cost_per_ton,
        input.carbon_per_customer.as_deref(),
    );

    let policy = FunnelPolicy::default();
    let cpm = input.cost_per_mille();
    let opex_share = Decimal::ONE - input.operating_expense_rate / dec!(100);

    let mut customers = input.initial_customers();
    let mut margin_warning = false;
    let mut saturated_from: Option<u32> = None;
    let mut months = Vec::with_capacity(input.projection_months as usize);

    for idx in 0..input.projection_months as usize {
        let demand_factor = demand[idx % SEASON_LENGTH];
        let seasonal = vec![demand_factor; policy.tier_count()];
        let funnel = calculate_tier_metrics_with_policy(
            &policy,
            input.conversion_rate,
            input.marketing_budget,
            input.ctr,
            cpm,
            Some(&seasonal),
        );

        let step = roll_forward(customers, funnel.total_new_customers, input.churn_rate);
        customers = step.customers;

        let revenue = allocate_revenue(customers, &input.tier_prices, &tier_weights);
        let carbon = carbon_cost(
            &revenue.tier_customers,
            &carbon_per_customer,
            input.cost_per_ton,
            revenue.total,
        );
        margin_warning |= carbon.margin_warning;

        let free_cash_flow = (revenue.total - carbon.cost)
            .saturating_mul(opex_share)
            .saturating_sub(input.fixed_costs)
            .saturating_sub(funnel.total_budget);

        let clamped = [
            funnel.total_impressions,
            customers,
            revenue.total,
            carbon.cost,
            free_cash_flow,
        ]
        .into_iter()
        .any(is_saturated);
        if clamped && saturated_from.is_none() {
            saturated_from = Some(idx as u32 + 1);
        }

        months.push(MonthlySnapshot {
            month: idx as u32 + 1,
            label: format!("M{}", idx + 1),
            demand_factor,
            marketing_spend: funnel.total_budget,
            impressions: funnel.total_impressions,
            clicks: funnel.total_clicks,
            leads: funnel.total_leads,
            new_customers: funnel.total_new_customers,
            tier_new_customers: funnel.new_customers,
            churned: step.churned,
            customers,
            tier_customers: revenue.tier_customers,
            revenue: revenue.total,
            tier_revenue: revenue.tier_revenue,
            carbon_tons: carbon.tons,
            carbon_cost: carbon.cost,
            free_cash_flow,
            margin_warning: carbon.margin_warning,
        });
    }

    let flags = price_override_flags(&input.tier_prices, &carbon_per_customer, input.cost_per_ton);
    let summary = summarise(input, &policy, &months, &tier_weights, margin_warning, flags);

    let summary_clamped = [
        summary.annual_revenue,
        summary.subscriber_ltv,
        summary.total_carbon_cost,
        summary.carbon_pct_of_revenue,
        summary.blended_cpl,
    ]
    .into_iter()
    .any(is_saturated);
    if let Some(month) = saturated_from {
        tracing::warn!(month, "projection values clamped at the decimal range");
        warnings.push(format!(
            "Values exceed the representable decimal range from month {month}; figures are clamped"
        ));
    } else if summary_clamped {
        tracing::warn!("summary totals clamped at the decimal range");
        warnings.push("Summary totals exceed the representable decimal range; figures are clamped".into());
    }

    if summary.margin_warning {
        let first = months.iter().find(|m| m.margin_warning).map(|m| m.month).unwrap_or(1);
        tracing::warn!(month = first, "carbon cost exceeds 60% of revenue");
        warnings.push(format!(
            "Carbon cost exceeds 60% of revenue from month {first}; margins are unsustainable"
        ));
    }
    for (idx, flagged) in summary.price_override_flags.iter().enumerate() {
        if *flagged {
            warnings.push(format!(
                "Tier {} carbon cost per customer exceeds its price",
                idx + 1
            ));
        }
    }

    let result = SimulationResult {
        months,
        summary,
        tier_prices: input.tier_prices.clone(),
        tier_weights,
        carbon_per_customer,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    tracing::debug!(
        months = input.projection_months,
        tiers,
        elapsed_us = elapsed,
        "subscription model run complete"
    );

    with_metadata(
        "Monthly subscription roll-forward with tiered funnel and carbon cost",
        input,
        warnings,
        elapsed,
        result,
    )
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn summarise(
    input: &ScenarioInput,
    policy: &FunnelPolicy,
    months: &[MonthlySnapshot],
    tier_weights: &[Decimal],
    margin_warning: bool,
    price_override_flags: Vec<bool>,
) -> SummaryMetrics {
    let last = months.last();
    let total_mrr = last.map(|m| m.revenue).unwrap_or(Decimal::ZERO);
    let final_customers = last.map(|m| m.customers).unwrap_or_else(|| input.initial_customers());

    let trailing_start = months.len().saturating_sub(TRAILING_MONTHS);
    let annual_revenue: Money = saturating_sum(months[trailing_start..].iter().map(|m| m.revenue));

    let arpc = average_revenue_per_customer(&input.tier_prices, tier_weights);
    let churn = input.churn_rate / dec!(100);
    let ltv_divisor = if churn.is_zero() { Decimal::ONE } else { churn };
    let subscriber_ltv = saturating_div(
        arpc.saturating_mul(Decimal::ONE - input.operating_expense_rate / dec!(100)),
        ltv_divisor,
    );

    let new_subscribers_monthly = if months.is_empty() {
        Decimal::ZERO
    } else {
        saturating_sum(months.iter().map(|m| m.new_customers)) / Decimal::from(months.len() as u64)
    };

    let base_funnel = calculate_tier_metrics_with_policy(
        policy,
        input.conversion_rate,
        input.marketing_budget,
        input.ctr,
        input.cost_per_mille(),
        None,
    );
    let (blended_cpl, blended_cvr) = blended_cpl_cvr(policy, &base_funnel);

    let total_revenue: Money = saturating_sum(months.iter().map(|m| m.revenue));
    let total_carbon_tons: Decimal = saturating_sum(months.iter().map(|m| m.carbon_tons));
    let total_carbon_cost: Money = saturating_sum(months.iter().map(|m| m.carbon_cost));
    let carbon_pct_of_revenue =
        saturating_div(total_carbon_cost, total_revenue).saturating_mul(dec!(100));
    let blended_cost_per_ton = saturating_div(total_carbon_cost, total_carbon_tons);

    SummaryMetrics {
        total_mrr,
        annual_revenue,
        average_revenue_per_customer: arpc,
        subscriber_ltv,
        total_subscribers: round_half_up(final_customers),
        new_subscribers_monthly,
        blended_cpl,
        blended_cvr,
        total_carbon_tons,
        total_carbon_cost,
        carbon_pct_of_revenue,
        blended_cost_per_ton,
        margin_warning,
        price_override_flags,
    }
}
