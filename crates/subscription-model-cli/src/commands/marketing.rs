use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use subscription_model_core::defaults::{
    DEFAULT_CONVERSION_RATE, DEFAULT_COST_PER_MILLE, DEFAULT_CTR, DEFAULT_MARKETING_BUDGET,
};
use subscription_model_core::marketing::audit::{audit_funnel, guardrail_flags};
use subscription_model_core::marketing::funnel::calculate_tier_metrics;

#[derive(Args)]
pub struct TierMetricsArgs {
    /// Base conversion rate in percent
    #[arg(long)]
    pub conversion_rate: Option<Decimal>,

    /// Total monthly marketing budget
    #[arg(long)]
    pub budget: Option<Decimal>,

    /// Base click-through rate in percent
    #[arg(long)]
    pub ctr: Option<Decimal>,

    /// Cost per thousand impressions
    #[arg(long)]
    pub cost_per_mille: Option<Decimal>,

    /// Per-tier budget multipliers, comma separated (e.g. 1,0.8,0.8,0.5)
    #[arg(long, value_delimiter = ',')]
    pub seasonal_factors: Option<Vec<Decimal>>,
}

#[derive(Args)]
pub struct AuditArgs {
    /// Base cost per lead
    #[arg(long)]
    pub base_cpl: Decimal,

    /// Base conversion rate in percent
    #[arg(long)]
    pub conversion_rate: Option<Decimal>,
}

pub fn run_tier_metrics(args: TierMetricsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let metrics = calculate_tier_metrics(
        args.conversion_rate.unwrap_or(DEFAULT_CONVERSION_RATE),
        args.budget.unwrap_or(DEFAULT_MARKETING_BUDGET),
        args.ctr.unwrap_or(DEFAULT_CTR),
        args.cost_per_mille.unwrap_or(DEFAULT_COST_PER_MILLE),
        args.seasonal_factors.as_deref(),
    );
    Ok(json!({ "result": metrics }))
}

pub fn run_audit(args: AuditArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let cvr = args.conversion_rate.unwrap_or(DEFAULT_CONVERSION_RATE);
    let flags: Vec<String> = guardrail_flags(args.base_cpl, cvr)
        .iter()
        .map(|f| f.to_string())
        .collect();
    Ok(json!({
        "result": { "tiers": audit_funnel(args.base_cpl, cvr) },
        "warnings": flags,
    }))
}
