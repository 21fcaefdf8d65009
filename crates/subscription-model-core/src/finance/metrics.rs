//! Investment metrics over a simulated free-cash-flow series.
//!
//! The initial investment is not booked as a month-0 outflow. It is spread
//! evenly across the horizon and each month also carries one month of
//! financing cost on the full investment. NPV discounts the adjusted flows at
//! the monthly-compounded WACC; payback is the first month in which the
//! cumulative adjusted flow is positive.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::subscription::engine::SimulationResult;
use crate::time_value::{cumulative, monthly_rate, npv, payback_period};
use crate::types::{with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::SubscriptionModelResult;

/// Expense assumptions behind the free-cash-flow series, echoed in the
/// output envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseConfig {
    /// Percent of revenue
    pub operating_expense_rate: Percent,
    pub fixed_costs: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketing_spend: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_per_ton: Option<Money>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialMetrics {
    pub npv: Money,
    /// 1-based month; `None` when the horizon ends before payback
    pub payback_month: Option<u32>,
    /// Free cash flow less the investment portion and financing cost
    pub adjusted_cash_flows: Vec<Money>,
    pub cumulative_cash_flows: Vec<Money>,
    pub monthly_wacc: Rate,
    pub monthly_investment_portion: Money,
    pub financing_cost: Money,
}

/// NPV, payback month and the investment-adjusted cash flows of a run.
pub fn calculate_financial_metrics(
    result: &SimulationResult,
    initial_investment: Money,
    expenses: &ExpenseConfig,
    wacc_pct: Percent,
) -> SubscriptionModelResult<ComputationOutput<FinancialMetrics>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let cash_flows = result.free_cash_flows();
    let metrics = amortized_metrics(&cash_flows, initial_investment, wacc_pct)?;

    if metrics.payback_month.is_none() && !cash_flows.is_empty() {
        warnings.push(format!(
            "Payback not reached within {} months",
            cash_flows.len()
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Amortized-investment DCF at monthly-compounded WACC",
        &serde_json::json!({
            "initial_investment": initial_investment,
            "wacc": wacc_pct,
            "expenses": expenses,
            "months": cash_flows.len(),
        }),
        warnings,
        elapsed,
        metrics,
    ))
}

/// The calculation behind [`calculate_financial_metrics`] on a bare series.
pub fn amortized_metrics(
    cash_flows: &[Money],
    initial_investment: Money,
    wacc_pct: Percent,
) -> SubscriptionModelResult<FinancialMetrics> {
    let monthly_wacc = monthly_rate(wacc_pct)?;
    let months = cash_flows.len();

    let monthly_investment_portion = if months == 0 {
        Decimal::ZERO
    } else {
        initial_investment / Decimal::from(months as u64)
    };
    let financing_cost = initial_investment.saturating_mul(monthly_wacc);

    let adjusted_cash_flows: Vec<Money> = cash_flows
        .iter()
        .map(|cf| {
            cf.saturating_sub(monthly_investment_portion)
                .saturating_sub(financing_cost)
        })
        .collect();

    let npv = npv(monthly_wacc, &adjusted_cash_flows)?;
    let payback_month = payback_period(&adjusted_cash_flows);
    let cumulative_cash_flows = cumulative(&adjusted_cash_flows);

    Ok(FinancialMetrics {
        npv,
        payback_month,
        adjusted_cash_flows,
        cumulative_cash_flows,
        monthly_wacc,
        monthly_investment_portion,
        financing_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::MathematicalOps;
    use rust_decimal_macros::dec;

    #[test]
    fn test_zero_wacc_no_investment_is_plain_sum() {
        let m = amortized_metrics(&[dec!(-50), dec!(20), dec!(40)], dec!(0), dec!(0)).unwrap();
        assert_eq!(m.npv, dec!(10));
        assert_eq!(m.payback_month, Some(3));
        assert_eq!(m.adjusted_cash_flows, vec![dec!(-50), dec!(20), dec!(40)]);
    }

    #[test]
    fn test_investment_is_spread_over_horizon() {
        let m = amortized_metrics(&[dec!(100); 4], dec!(200), dec!(0)).unwrap();
        assert_eq!(m.monthly_investment_portion, dec!(50));
        assert_eq!(m.financing_cost, Decimal::ZERO);
        assert_eq!(m.adjusted_cash_flows, vec![dec!(50); 4]);
        assert_eq!(m.payback_month, Some(1));
    }

    #[test]
    fn test_financing_cost_uses_monthly_wacc() {
        let m = amortized_metrics(&[dec!(0); 12], dec!(1200), dec!(12)).unwrap();
        let expected_rate = dec!(1.12).powd(Decimal::ONE / dec!(12)) - Decimal::ONE;
        assert!((m.monthly_wacc - expected_rate).abs() < dec!(0.000000001));
        assert!((m.financing_cost - dec!(1200) * expected_rate).abs() < dec!(0.0000001));
        assert_eq!(m.payback_month, None);
        assert!(m.npv < Decimal::ZERO);
    }

    #[test]
    fn test_npv_discounts_from_month_one() {
        let m = amortized_metrics(&[dec!(100)], dec!(0), dec!(8)).unwrap();
        let expected = dec!(100) / (Decimal::ONE + m.monthly_wacc);
        assert!((m.npv - expected).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_empty_series() {
        let m = amortized_metrics(&[], dec!(1000), dec!(8)).unwrap();
        assert_eq!(m.npv, Decimal::ZERO);
        assert_eq!(m.payback_month, None);
        assert_eq!(m.monthly_investment_portion, Decimal::ZERO);
    }

    #[test]
    fn test_rejects_wacc_at_minus_hundred() {
        assert!(amortized_metrics(&[dec!(1)], dec!(0), dec!(-100)).is_err());
    }
}
