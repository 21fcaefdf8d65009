//! Two-way sensitivity of a run's headline metric to two scenario
//! assumptions.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::SubscriptionModelError;
use crate::finance::metrics::{calculate_financial_metrics, ExpenseConfig};
use crate::subscription::engine::run_subscription_model;
use crate::subscription::scenario::ScenarioInput;
use crate::types::*;
use crate::SubscriptionModelResult;

/// Scenario fields that can be swept.
pub const SWEEPABLE_FIELDS: [&str; 13] = [
    "projection_months",
    "churn_rate",
    "marketing_budget",
    "conversion_rate",
    "ctr",
    "cost_per_mille",
    "operating_expense_rate",
    "fixed_costs",
    "initial_investment",
    "wacc",
    "cost_per_ton",
    "seasonality_influence",
    "initial_customers",
];

/// Metrics that can be read off a run.
pub const OUTPUT_METRICS: [&str; 7] = [
    "npv",
    "payback_month",
    "total_mrr",
    "annual_revenue",
    "subscriber_ltv",
    "total_subscribers",
    "total_carbon_cost",
];

/// Input for 2-way sensitivity analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityInput {
    /// Base case scenario
    pub base: ScenarioInput,
    /// First scenario field to sweep
    pub variable_1: SensitivityVariable,
    /// Second scenario field to sweep
    pub variable_2: SensitivityVariable,
    /// Name of the output metric being measured
    pub output_metric: String,
}

/// Output of 2-way sensitivity analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityOutput {
    pub variable_1_name: String,
    pub variable_2_name: String,
    pub variable_1_values: Vec<Decimal>,
    pub variable_2_values: Vec<Decimal>,
    pub output_metric: String,
    /// Matrix[i][j] = output when variable_1 = variable_1_values[i], variable_2 = variable_2_values[j]
    pub matrix: Vec<Vec<Decimal>>,
    /// Output of the unmodified base scenario
    pub base_case_value: Decimal,
    /// Cell closest to the base scenario's own values (row, col)
    pub base_case_position: (usize, usize),
}

/// Generate the sweep values for a sensitivity variable from min to max with step.
fn generate_sweep_values(var: &SensitivityVariable) -> SubscriptionModelResult<Vec<Decimal>> {
    if var.step <= Decimal::ZERO {
        return Err(SubscriptionModelError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Step must be positive".into(),
        });
    }
    if var.min > var.max {
        return Err(SubscriptionModelError::InvalidInput {
            field: format!("variable:{}", var.name),
            reason: "Min must be <= max".into(),
        });
    }

    let mut values = Vec::new();
    let mut current = var.min;
    while current <= var.max {
        values.push(current);
        current += var.step;
    }
    // Ensure max is included if step doesn't land exactly on it
    if let Some(&last) = values.last() {
        if last < var.max {
            values.push(var.max);
        }
    }

    Ok(values)
}

/// Find the closest index to a target value in a sorted list.
fn closest_index(values: &[Decimal], target: Decimal) -> usize {
    values
        .iter()
        .enumerate()
        .min_by_key(|(_, v)| (**v - target).abs())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn unknown_field(name: &str) -> SubscriptionModelError {
    SubscriptionModelError::InvalidInput {
        field: format!("variable:{name}"),
        reason: format!("not a sweepable field; expected one of {}", SWEEPABLE_FIELDS.join(", ")),
    }
}

/// Current value of a sweepable field.
pub fn field_value(input: &ScenarioInput, field: &str) -> SubscriptionModelResult<Decimal> {
    let value = match field {
        "projection_months" => Decimal::from(input.projection_months),
        "churn_rate" => input.churn_rate,
        "marketing_budget" => input.marketing_budget,
        "conversion_rate" => input.conversion_rate,
        "ctr" => input.ctr,
        "cost_per_mille" => input.cost_per_mille(),
        "operating_expense_rate" => input.operating_expense_rate,
        "fixed_costs" => input.fixed_costs,
        "initial_investment" => input.initial_investment,
        "wacc" => input.wacc,
        "cost_per_ton" => input.cost_per_ton,
        "seasonality_influence" => input.seasonality_influence,
        "initial_customers" => input.initial_customers(),
        _ => return Err(unknown_field(field)),
    };
    Ok(value)
}

/// Copy of `input` with one field replaced.
pub fn with_field(input: &ScenarioInput, field: &str, value: Decimal) -> SubscriptionModelResult<ScenarioInput> {
    let mut out = input.clone();
    match field {
        "projection_months" => {
            out.projection_months = value
                .trunc()
                .to_u32()
                .ok_or_else(|| SubscriptionModelError::InvalidInput {
                    field: "projection_months".into(),
                    reason: format!("{value} is not a valid month count"),
                })?;
        }
        "churn_rate" => out.churn_rate = value,
        "marketing_budget" => out.marketing_budget = value,
        "conversion_rate" => out.conversion_rate = value,
        "ctr" => out.ctr = value,
        "cost_per_mille" => out.cost_per_mille = Some(value),
        "operating_expense_rate" => out.operating_expense_rate = value,
        "fixed_costs" => out.fixed_costs = value,
        "initial_investment" => out.initial_investment = value,
        "wacc" => out.wacc = value,
        "cost_per_ton" => out.cost_per_ton = value,
        "seasonality_influence" => out.seasonality_influence = value,
        "initial_customers" => out.initial_customers = Some(value),
        _ => return Err(unknown_field(field)),
    }
    Ok(out)
}

/// Run the model and read one output metric.
pub fn evaluate_metric(input: &ScenarioInput, metric: &str) -> SubscriptionModelResult<Decimal> {
    let run = run_subscription_model(input).result;
    let summary = &run.summary;
    let value = match metric {
        "total_mrr" => summary.total_mrr,
        "annual_revenue" => summary.annual_revenue,
        "subscriber_ltv" => summary.subscriber_ltv,
        "total_subscribers" => summary.total_subscribers,
        "total_carbon_cost" => summary.total_carbon_cost,
        "npv" | "payback_month" => {
            let expenses = ExpenseConfig {
                operating_expense_rate: input.operating_expense_rate,
                fixed_costs: input.fixed_costs,
                marketing_spend: Some(input.marketing_budget),
                cost_per_ton: Some(input.cost_per_ton),
            };
            let fin = calculate_financial_metrics(&run, input.initial_investment, &expenses, input.wacc)?.result;
            if metric == "npv" {
                fin.npv
            } else {
                // Not reached within the horizon reads as zero
                fin.payback_month.map(Decimal::from).unwrap_or(Decimal::ZERO)
            }
        }
        _ => {
            return Err(SubscriptionModelError::InvalidInput {
                field: "output_metric".into(),
                reason: format!("unknown metric '{metric}'; expected one of {}", OUTPUT_METRICS.join(", ")),
            })
        }
    };
    Ok(value)
}

/// Sweep both variables across their ranges and evaluate the output metric
/// for every combination.
pub fn run_sensitivity(input: &SensitivityInput) -> SubscriptionModelResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let v1_values = generate_sweep_values(&input.variable_1)?;
    let v2_values = generate_sweep_values(&input.variable_2)?;
    let name_1 = input.variable_1.name.as_str();
    let name_2 = input.variable_2.name.as_str();

    // Resolves field and metric names before the sweep.
    let base_1 = field_value(&input.base, name_1)?;
    let base_2 = field_value(&input.base, name_2)?;
    let base_case_value = evaluate_metric(&input.base, &input.output_metric)?;

    let mut matrix = Vec::with_capacity(v1_values.len());

    for v1 in &v1_values {
        let mut row = Vec::with_capacity(v2_values.len());
        for v2 in &v2_values {
            let cell = with_field(&input.base, name_1, *v1)
                .and_then(|s| with_field(&s, name_2, *v2))
                .and_then(|s| evaluate_metric(&s, &input.output_metric));
            match cell {
                Ok(val) => row.push(val),
                Err(e) => {
                    warnings.push(format!("Evaluation failed at ({v1}, {v2}): {e}"));
                    row.push(Decimal::ZERO);
                }
            }
        }
        matrix.push(row);
    }

    let output = SensitivityOutput {
        variable_1_name: input.variable_1.name.clone(),
        variable_2_name: input.variable_2.name.clone(),
        base_case_position: (closest_index(&v1_values, base_1), closest_index(&v2_values, base_2)),
        variable_1_values: v1_values,
        variable_2_values: v2_values,
        output_metric: input.output_metric.clone(),
        matrix,
        base_case_value,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "2-Way Sensitivity Analysis",
        &serde_json::json!({
            "variable_1": input.variable_1.name,
            "variable_2": input.variable_2.name,
            "output_metric": input.output_metric,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_input() -> SensitivityInput {
        SensitivityInput {
            base: ScenarioInput {
                projection_months: 12,
                ..ScenarioInput::default()
            },
            variable_1: SensitivityVariable {
                name: "churn_rate".into(),
                min: dec!(1),
                max: dec!(5),
                step: dec!(1),
            },
            variable_2: SensitivityVariable {
                name: "marketing_budget".into(),
                min: dec!(5000),
                max: dec!(15000),
                step: dec!(5000),
            },
            output_metric: "total_mrr".into(),
        }
    }

    #[test]
    fn test_grid_dimensions_and_base_case() {
        let out = run_sensitivity(&sample_input()).unwrap().result;
        assert_eq!(out.variable_1_values.len(), 5);
        assert_eq!(out.variable_2_values.len(), 3);
        assert_eq!(out.matrix.len(), 5);
        assert_eq!(out.matrix[0].len(), 3);
        // Base scenario: churn 3%, budget 10000
        assert_eq!(out.base_case_position, (2, 1));
        assert_eq!(out.matrix[2][1], out.base_case_value);
    }

    #[test]
    fn test_mrr_falls_with_churn_and_rises_with_budget() {
        let out = run_sensitivity(&sample_input()).unwrap().result;
        for i in 0..out.matrix.len() - 1 {
            assert!(out.matrix[i][0] > out.matrix[i + 1][0]);
        }
        for j in 0..out.matrix[0].len() - 1 {
            assert!(out.matrix[0][j] < out.matrix[0][j + 1]);
        }
    }

    #[test]
    fn test_sweep_with_non_exact_step() {
        let var = SensitivityVariable {
            name: "test".into(),
            min: dec!(0),
            max: dec!(1),
            step: dec!(0.3),
        };
        let vals = generate_sweep_values(&var).unwrap();
        // 0, 0.3, 0.6, 0.9, 1.0 (max appended)
        assert_eq!(vals.len(), 5);
        assert_eq!(*vals.last().unwrap(), dec!(1));
    }

    #[test]
    fn test_invalid_step() {
        let mut input = sample_input();
        input.variable_1.step = dec!(0);
        assert!(run_sensitivity(&input).is_err());
    }

    #[test]
    fn test_unknown_field_and_metric() {
        let mut input = sample_input();
        input.variable_2.name = "tier_prices".into();
        assert!(run_sensitivity(&input).is_err());

        let mut input = sample_input();
        input.output_metric = "irr".into();
        assert!(run_sensitivity(&input).is_err());
    }

    #[test]
    fn test_projection_months_override() {
        let base = ScenarioInput::default();
        let s = with_field(&base, "projection_months", dec!(6)).unwrap();
        assert_eq!(s.projection_months, 6);
        assert!(with_field(&base, "projection_months", dec!(-1)).is_err());
    }

    #[test]
    fn test_npv_metric() {
        let base = ScenarioInput {
            projection_months: 12,
            ..ScenarioInput::default()
        };
        let npv = evaluate_metric(&base, "npv").unwrap();
        let richer = with_field(&base, "initial_investment", dec!(0)).unwrap();
        assert!(evaluate_metric(&richer, "npv").unwrap() > npv);
    }
}
