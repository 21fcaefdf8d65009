use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use subscription_model_core::finance::metrics::{calculate_financial_metrics, ExpenseConfig};
use subscription_model_core::run_subscription_model;

use super::simulate::ScenarioArgs;

#[derive(Args)]
pub struct FinancialsArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// One-time initial investment (overrides the scenario)
    #[arg(long)]
    pub initial_investment: Option<Decimal>,

    /// Annual WACC in percent (overrides the scenario)
    #[arg(long)]
    pub wacc: Option<Decimal>,
}

pub fn run_financials(args: FinancialsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario = args.scenario.resolve()?;
    let investment = args.initial_investment.unwrap_or(scenario.initial_investment);
    let wacc = args.wacc.unwrap_or(scenario.wacc);

    let run = run_subscription_model(&scenario);
    let expenses = ExpenseConfig {
        operating_expense_rate: scenario.operating_expense_rate,
        fixed_costs: scenario.fixed_costs,
        marketing_spend: Some(scenario.marketing_budget),
        cost_per_ton: Some(scenario.cost_per_ton),
    };
    let financial = calculate_financial_metrics(&run.result, investment, &expenses, wacc)?;

    let mut warnings = run.warnings.clone();
    warnings.extend(financial.warnings.iter().cloned());

    let summary = &run.result.summary;
    Ok(json!({
        "result": {
            "npv": financial.result.npv,
            "payback_month": financial.result.payback_month,
            "total_mrr": summary.total_mrr,
            "annual_revenue": summary.annual_revenue,
            "subscriber_ltv": summary.subscriber_ltv,
            "total_subscribers": summary.total_subscribers,
            "blended_cpl": summary.blended_cpl,
            "blended_cvr": summary.blended_cvr,
            "margin_warning": summary.margin_warning,
            "monthly_wacc": financial.result.monthly_wacc,
            "adjusted_cash_flows": financial.result.adjusted_cash_flows,
        },
        "methodology": financial.methodology,
        "assumptions": financial.assumptions,
        "warnings": warnings,
        "metadata": financial.metadata,
    }))
}
