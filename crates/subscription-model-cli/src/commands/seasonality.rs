use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use subscription_model_core::defaults::DEFAULT_SEASONALITY;
use subscription_model_core::seasonality::{demand_factors, monthly_weights};

#[derive(Args)]
pub struct SeasonalityArgs {
    /// 12 monthly demand values, comma separated (defaults to the built-in curve)
    #[arg(long, value_delimiter = ',')]
    pub curve: Option<Vec<Decimal>>,

    /// Influence of the curve, 0-100
    #[arg(long, default_value = "100")]
    pub influence: Decimal,
}

pub fn run_seasonality(args: SeasonalityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let curve = args.curve.unwrap_or_else(|| DEFAULT_SEASONALITY.to_vec());
    let weights = monthly_weights(Some(&curve), args.influence);
    let factors = demand_factors(&weights);
    Ok(json!({
        "result": {
            "weights": weights,
            "demand_factors": factors,
        }
    }))
}
