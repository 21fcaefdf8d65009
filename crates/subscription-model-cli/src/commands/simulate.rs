use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use subscription_model_core::subscription::scenario::{validate_scenario, ScenarioInput};
use subscription_model_core::run_subscription_model;

use crate::input;

/// Scenario overrides shared by every command that runs the projection
#[derive(Args, Clone)]
pub struct ScenarioArgs {
    /// Path to a JSON/YAML scenario (defaults apply to missing fields)
    #[arg(long)]
    pub input: Option<String>,

    /// Projection horizon in months
    #[arg(long)]
    pub months: Option<u32>,

    /// Monthly churn rate in percent (e.g. 3 for 3%)
    #[arg(long)]
    pub churn_rate: Option<Decimal>,

    /// Monthly marketing budget
    #[arg(long)]
    pub marketing_budget: Option<Decimal>,

    /// Base conversion rate in percent
    #[arg(long)]
    pub conversion_rate: Option<Decimal>,

    /// Base click-through rate in percent
    #[arg(long)]
    pub ctr: Option<Decimal>,

    /// Carbon offset price per ton
    #[arg(long)]
    pub cost_per_ton: Option<Decimal>,

    /// Seasonality influence, 0-100
    #[arg(long)]
    pub seasonality_influence: Option<Decimal>,

    /// Reject malformed scenarios instead of falling back to defaults
    #[arg(long)]
    pub strict: bool,
}

impl ScenarioArgs {
    /// Load the scenario and apply flag overrides on top.
    pub fn resolve(&self) -> Result<ScenarioInput, Box<dyn std::error::Error>> {
        let mut scenario: ScenarioInput = input::load_or_default(self.input.as_deref())?;
        if let Some(v) = self.months {
            scenario.projection_months = v;
        }
        if let Some(v) = self.churn_rate {
            scenario.churn_rate = v;
        }
        if let Some(v) = self.marketing_budget {
            scenario.marketing_budget = v;
        }
        if let Some(v) = self.conversion_rate {
            scenario.conversion_rate = v;
        }
        if let Some(v) = self.ctr {
            scenario.ctr = v;
        }
        if let Some(v) = self.cost_per_ton {
            scenario.cost_per_ton = v;
        }
        if let Some(v) = self.seasonality_influence {
            scenario.seasonality_influence = v;
        }
        if self.strict {
            validate_scenario(&scenario)?;
        }
        tracing::debug!(
            months = scenario.projection_months,
            budget = %scenario.marketing_budget,
            strict = self.strict,
            "resolved scenario"
        );
        Ok(scenario)
    }
}

#[derive(Args)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub scenario: ScenarioArgs,

    /// Emit only the month-by-month projection (one row per month)
    #[arg(long)]
    pub monthly: bool,
}

pub fn run_simulate(args: SimulateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario = args.scenario.resolve()?;
    let output = run_subscription_model(&scenario);
    if args.monthly {
        return Ok(serde_json::to_value(&output.result.months)?);
    }
    Ok(serde_json::to_value(output)?)
}
