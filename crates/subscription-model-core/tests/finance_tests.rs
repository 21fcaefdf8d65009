use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use subscription_model_core::{
    calculate_financial_metrics, run_subscription_model, ExpenseConfig, ScenarioInput,
};

fn profitable_input() -> ScenarioInput {
    ScenarioInput {
        projection_months: 3,
        churn_rate: dec!(2),
        tier_prices: vec![dec!(200)],
        tier_adoption: None,
        initial_customers: Some(dec!(50)),
        marketing_budget: dec!(0),
        conversion_rate: dec!(0),
        operating_expense_rate: dec!(10),
        fixed_costs: dec!(0),
        ..ScenarioInput::default()
    }
}

fn expenses(input: &ScenarioInput) -> ExpenseConfig {
    ExpenseConfig {
        operating_expense_rate: input.operating_expense_rate,
        fixed_costs: input.fixed_costs,
        marketing_spend: Some(input.marketing_budget),
        cost_per_ton: None,
    }
}

#[test]
fn test_cash_flows_non_negative_with_profitable_model() {
    let input = profitable_input();
    let sub = run_subscription_model(&input).result;
    let fin = calculate_financial_metrics(&sub, dec!(0), &expenses(&input), dec!(5))
        .unwrap()
        .result;
    assert!(fin.adjusted_cash_flows.iter().all(|cf| *cf >= Decimal::ZERO));
    assert_eq!(fin.payback_month, Some(1));
    assert!(fin.npv > Decimal::ZERO);
}

#[test]
fn test_profitable_free_cash_flow_values() {
    let sub = run_subscription_model(&profitable_input()).result;
    // 50 → 49 customers × 200 × 0.9
    assert_eq!(sub.months[0].free_cash_flow, dec!(8820));
    assert_eq!(sub.free_cash_flows().len(), 3);
}

#[test]
fn test_investment_delays_payback() {
    let input = profitable_input();
    let sub = run_subscription_model(&input).result;
    let fin = calculate_financial_metrics(&sub, dec!(30000), &expenses(&input), dec!(0))
        .unwrap()
        .result;
    assert_eq!(fin.monthly_investment_portion, dec!(10000));
    // Each month's free cash flow is below the 10000 portion
    assert_eq!(fin.payback_month, None);
    assert_eq!(fin.cumulative_cash_flows.len(), 3);
    let total_fcf: Decimal = sub.free_cash_flows().iter().copied().sum();
    assert_eq!(fin.npv, total_fcf - dec!(30000));
}

#[test]
fn test_metrics_envelope_reports_unreached_payback() {
    let input = profitable_input();
    let sub = run_subscription_model(&input).result;
    let out = calculate_financial_metrics(&sub, dec!(1000000), &expenses(&input), dec!(8)).unwrap();
    assert!(out.warnings.iter().any(|w| w.contains("Payback not reached")));
    assert_eq!(out.assumptions["months"], serde_json::json!(3));
}

#[test]
fn test_default_scenario_npv_uses_amortized_investment() {
    let input = ScenarioInput::default();
    let sub = run_subscription_model(&input).result;
    let fin = calculate_financial_metrics(&sub, input.initial_investment, &expenses(&input), input.wacc)
        .unwrap()
        .result;
    let portion = input.initial_investment / dec!(24);
    let first = sub.months[0].free_cash_flow - portion - fin.financing_cost;
    assert_eq!(fin.adjusted_cash_flows[0], first);
    assert_eq!(fin.adjusted_cash_flows.len(), 24);
}

#[test]
fn test_invalid_wacc_is_rejected() {
    let input = profitable_input();
    let sub = run_subscription_model(&input).result;
    assert!(calculate_financial_metrics(&sub, dec!(0), &expenses(&input), dec!(-120)).is_err());
}

#[test]
fn test_long_horizon_at_high_wacc_stays_finite() {
    // 1 + monthly WACC ≈ 1.161; the discount factor outgrows Decimal::MAX
    // well before month 480.
    let input = ScenarioInput {
        projection_months: 480,
        wacc: dec!(500),
        ..ScenarioInput::default()
    };
    let sub = run_subscription_model(&input).result;
    let out = calculate_financial_metrics(&sub, input.initial_investment, &expenses(&input), input.wacc)
        .unwrap()
        .result;
    assert_eq!(out.adjusted_cash_flows.len(), 480);
    assert!(out.npv != Decimal::MAX && out.npv != Decimal::MIN);

    let prefix_npv = subscription_model_core::time_value::npv(
        out.monthly_wacc,
        &out.adjusted_cash_flows[..300],
    )
    .unwrap();
    assert!((out.npv - prefix_npv).abs() < dec!(0.0001));
}
