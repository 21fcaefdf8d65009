use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use subscription_model_core::carbon::cost::price_override_flags;
use subscription_model_core::carbon::intensity::derive_carbon_per_customer;
use subscription_model_core::defaults::DEFAULT_TIER_PRICES;

#[derive(Args)]
pub struct CarbonArgs {
    /// Tier prices, comma separated (defaults to 500,1200,3000,7500)
    #[arg(long, value_delimiter = ',')]
    pub prices: Option<Vec<Decimal>>,

    /// Carbon offset price per ton
    #[arg(long)]
    pub cost_per_ton: Decimal,

    /// Price-to-carbon-cost margin on the cheapest tier
    #[arg(long)]
    pub high_margin: Option<Decimal>,

    /// Price-to-carbon-cost margin on the most expensive tier
    #[arg(long)]
    pub low_margin: Option<Decimal>,
}

pub fn run_carbon(args: CarbonArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let prices = args.prices.unwrap_or_else(|| DEFAULT_TIER_PRICES.to_vec());
    let tons = derive_carbon_per_customer(&prices, args.cost_per_ton, args.high_margin, args.low_margin);
    if tons.is_empty() {
        return Err("cost per ton must be positive and at least one price given".into());
    }
    let flags = price_override_flags(&prices, &tons, args.cost_per_ton);
    Ok(json!({
        "result": {
            "tier_prices": prices,
            "carbon_per_customer": tons,
            "price_override_flags": flags,
        }
    }))
}
