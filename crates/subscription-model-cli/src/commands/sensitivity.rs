use clap::Args;
use serde_json::Value;

use subscription_model_core::sensitivity::{self, SensitivityInput};

use crate::input;

#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to JSON/YAML: { base, variable_1, variable_2, output_metric }
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input_data: SensitivityInput = input::load(args.input.as_deref())?;
    let result = sensitivity::run_sensitivity(&input_data)?;
    Ok(serde_json::to_value(result)?)
}
