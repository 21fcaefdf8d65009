use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::defaults::*;
use crate::error::SubscriptionModelError;
use crate::seasonality::SEASON_LENGTH;
use crate::types::{Customers, Money, Percent};
use crate::SubscriptionModelResult;

/// A snapshot of business assumptions for one simulation run.
///
/// Every field has a dashboard default, so a partial JSON document is a valid
/// scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioInput {
    /// Projection horizon in months
    pub projection_months: u32,
    /// Monthly churn, percent of the current base
    #[serde(alias = "churn_rate_smb")]
    pub churn_rate: Percent,
    /// Monthly price per tier, cheapest first
    #[serde(alias = "tier_revenues")]
    pub tier_prices: Vec<Money>,
    /// Monthly marketing spend
    pub marketing_budget: Money,
    /// Base lead conversion rate, percent
    pub conversion_rate: Percent,
    /// Base click-through rate, percent
    pub ctr: Percent,
    /// Cost per thousand impressions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_per_mille: Option<Money>,
    /// Operating expenses as a percent of revenue net of carbon
    pub operating_expense_rate: Percent,
    /// Fixed monthly costs
    pub fixed_costs: Money,
    /// One-time initial investment
    pub initial_investment: Money,
    /// Annual weighted average cost of capital, percent
    pub wacc: Percent,
    /// Share of customers per tier; normalised internally
    #[serde(skip_serializing_if = "Option::is_none", alias = "tier_adoption_rates")]
    pub tier_adoption: Option<Vec<Decimal>>,
    /// Carbon offset price per ton
    #[serde(alias = "cost_of_carbon")]
    pub cost_per_ton: Money,
    /// Explicit tons of carbon per customer per tier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbon_per_customer: Option<Vec<Decimal>>,
    /// Relative demand for each calendar month (12 points)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seasonality: Option<Vec<Decimal>>,
    /// 0 = no seasonality, 100 = full seasonal swing
    pub seasonality_influence: Percent,
    /// Customers at the start of month 1 (default 10)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_customers: Option<Customers>,
}

impl Default for ScenarioInput {
    fn default() -> Self {
        Self {
            projection_months: DEFAULT_PROJECTION_MONTHS,
            churn_rate: DEFAULT_MONTHLY_CHURN_RATE,
            tier_prices: DEFAULT_TIER_PRICES.to_vec(),
            marketing_budget: DEFAULT_MARKETING_BUDGET,
            conversion_rate: DEFAULT_CONVERSION_RATE,
            ctr: DEFAULT_CTR,
            cost_per_mille: None,
            operating_expense_rate: DEFAULT_OPERATING_EXPENSE_RATE,
            fixed_costs: DEFAULT_FIXED_COSTS,
            initial_investment: DEFAULT_INITIAL_INVESTMENT,
            wacc: DEFAULT_WACC,
            tier_adoption: Some(DEFAULT_TIER_ADOPTION.to_vec()),
            cost_per_ton: Decimal::ZERO,
            carbon_per_customer: None,
            seasonality: None,
            seasonality_influence: Decimal::ZERO,
            initial_customers: None,
        }
    }
}

impl ScenarioInput {
    pub fn cost_per_mille(&self) -> Money {
        self.cost_per_mille.unwrap_or(DEFAULT_COST_PER_MILLE)
    }

    pub fn initial_customers(&self) -> Customers {
        self.initial_customers
            .unwrap_or(DEFAULT_INITIAL_CUSTOMERS)
            .max(Decimal::ZERO)
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> SubscriptionModelError {
    SubscriptionModelError::InvalidInput {
        field: field.into(),
        reason: reason.into(),
    }
}

fn check_percent(field: &str, value: Percent, max: Option<Decimal>) -> SubscriptionModelResult<()> {
    if value < Decimal::ZERO {
        return Err(invalid(field, "must not be negative"));
    }
    if let Some(max) = max {
        if value > max {
            return Err(invalid(field, format!("must not exceed {max}")));
        }
    }
    Ok(())
}

/// Strict validation for callers that prefer rejecting a scenario over the
/// engine's silent fallbacks.
pub fn validate_scenario(input: &ScenarioInput) -> SubscriptionModelResult<()> {
    if input.projection_months == 0 {
        return Err(invalid("projection_months", "must be at least 1"));
    }
    if input.tier_prices.is_empty() {
        return Err(invalid("tier_prices", "at least one tier is required"));
    }
    if input.tier_prices.iter().any(|p| *p < Decimal::ZERO) {
        return Err(invalid("tier_prices", "prices must not be negative"));
    }
    if let Some(adoption) = &input.tier_adoption {
        if adoption.len() != input.tier_prices.len() {
            return Err(invalid(
                "tier_adoption",
                format!(
                    "expected {} weights, got {}",
                    input.tier_prices.len(),
                    adoption.len()
                ),
            ));
        }
        if adoption.iter().any(|w| *w < Decimal::ZERO) {
            return Err(invalid("tier_adoption", "weights must not be negative"));
        }
        if adoption.iter().all(|w| w.is_zero()) {
            return Err(invalid("tier_adoption", "weights must not all be zero"));
        }
    }
    if let Some(carbon) = &input.carbon_per_customer {
        if carbon.len() != input.tier_prices.len() {
            return Err(invalid(
                "carbon_per_customer",
                format!(
                    "expected {} values, got {}",
                    input.tier_prices.len(),
                    carbon.len()
                ),
            ));
        }
    }
    if let Some(curve) = &input.seasonality {
        if curve.len() != SEASON_LENGTH {
            return Err(invalid(
                "seasonality",
                format!("expected {SEASON_LENGTH} points, got {}", curve.len()),
            ));
        }
    }
    check_percent("churn_rate", input.churn_rate, None)?;
    check_percent("conversion_rate", input.conversion_rate, Some(dec!(100)))?;
    check_percent("ctr", input.ctr, Some(dec!(100)))?;
    check_percent("operating_expense_rate", input.operating_expense_rate, None)?;
    check_percent("seasonality_influence", input.seasonality_influence, Some(dec!(100)))?;
    if input.wacc <= dec!(-100) {
        return Err(invalid("wacc", "must be greater than -100%"));
    }
    if input.marketing_budget < Decimal::ZERO {
        return Err(invalid("marketing_budget", "must not be negative"));
    }
    if input.cost_per_mille() <= Decimal::ZERO {
        return Err(invalid("cost_per_mille", "must be positive"));
    }
    Ok(())
}
