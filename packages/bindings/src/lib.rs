use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Deserialize;

use subscription_model_core::defaults::{
    DEFAULT_CONVERSION_RATE, DEFAULT_COST_PER_MILLE, DEFAULT_CTR, DEFAULT_MARKETING_BUDGET,
};
use subscription_model_core::finance::metrics::ExpenseConfig;
use subscription_model_core::subscription::scenario::ScenarioInput;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

#[napi]
pub fn run_subscription_model(input_json: String) -> NapiResult<String> {
    let input: ScenarioInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = subscription_model_core::run_subscription_model(&input);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn validate_scenario(input_json: String) -> NapiResult<bool> {
    let input: ScenarioInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    subscription_model_core::validate_scenario(&input).map_err(to_napi_error)?;
    Ok(true)
}

#[derive(Deserialize)]
struct FinancialsRequest {
    #[serde(default)]
    scenario: ScenarioInput,
    initial_investment: Option<Decimal>,
    wacc: Option<Decimal>,
    expenses: Option<ExpenseConfig>,
}

#[napi]
pub fn calculate_financial_metrics(input_json: String) -> NapiResult<String> {
    let request: FinancialsRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let scenario = request.scenario;
    let run = subscription_model_core::run_subscription_model(&scenario);
    let expenses = request.expenses.unwrap_or_else(|| ExpenseConfig {
        operating_expense_rate: scenario.operating_expense_rate,
        fixed_costs: scenario.fixed_costs,
        marketing_spend: Some(scenario.marketing_budget),
        cost_per_ton: Some(scenario.cost_per_ton),
    });
    let output = subscription_model_core::calculate_financial_metrics(
        &run.result,
        request.initial_investment.unwrap_or(scenario.initial_investment),
        &expenses,
        request.wacc.unwrap_or(scenario.wacc),
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Marketing
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct TierMetricsRequest {
    base_cvr: Option<Decimal>,
    total_budget: Option<Decimal>,
    ctr: Option<Decimal>,
    cost_per_mille: Option<Decimal>,
    tier_seasonal_factors: Option<Vec<Decimal>>,
}

#[napi]
pub fn calculate_tier_metrics(input_json: String) -> NapiResult<String> {
    let req: TierMetricsRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = subscription_model_core::calculate_tier_metrics(
        req.base_cvr.unwrap_or(DEFAULT_CONVERSION_RATE),
        req.total_budget.unwrap_or(DEFAULT_MARKETING_BUDGET),
        req.ctr.unwrap_or(DEFAULT_CTR),
        req.cost_per_mille.unwrap_or(DEFAULT_COST_PER_MILLE),
        req.tier_seasonal_factors.as_deref(),
    );
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct AuditRequest {
    base_cpl: Decimal,
    base_cvr: Option<Decimal>,
}

#[napi]
pub fn audit_funnel(input_json: String) -> NapiResult<String> {
    let req: AuditRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let cvr = req.base_cvr.unwrap_or(DEFAULT_CONVERSION_RATE);
    let flags: Vec<String> =
        subscription_model_core::marketing::audit::guardrail_flags(req.base_cpl, cvr)
            .iter()
            .map(|f| f.to_string())
            .collect();
    let tiers = subscription_model_core::marketing::audit::audit_funnel(req.base_cpl, cvr);
    serde_json::to_string(&serde_json::json!({ "flags": flags, "tiers": tiers }))
        .map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Carbon
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct CarbonRequest {
    tier_prices: Vec<Decimal>,
    cost_per_ton: Decimal,
    high_margin: Option<Decimal>,
    low_margin: Option<Decimal>,
}

#[napi]
pub fn derive_carbon_per_customer(input_json: String) -> NapiResult<String> {
    let req: CarbonRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let tons = subscription_model_core::derive_carbon_per_customer(
        &req.tier_prices,
        req.cost_per_ton,
        req.high_margin,
        req.low_margin,
    );
    serde_json::to_string(&tons).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Sensitivity
// ---------------------------------------------------------------------------

#[napi]
pub fn run_sensitivity(input_json: String) -> NapiResult<String> {
    let input: subscription_model_core::sensitivity::SensitivityInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        subscription_model_core::sensitivity::run_sensitivity(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
