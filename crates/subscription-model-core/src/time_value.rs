use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal::RoundingStrategy;
use rust_decimal_macros::dec;

use crate::error::SubscriptionModelError;
use crate::types::{Money, Percent, Rate};
use crate::SubscriptionModelResult;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Monthly-compounded equivalent of an annual rate given in percent:
/// `(1 + annual/100)^(1/12) - 1`.
pub fn monthly_rate(annual_pct: Percent) -> SubscriptionModelResult<Rate> {
    let one_plus_annual = Decimal::ONE + annual_pct / dec!(100);
    if one_plus_annual <= Decimal::ZERO {
        return Err(SubscriptionModelError::InvalidInput {
            field: "wacc".into(),
            reason: "Annual discount rate must be greater than -100%".into(),
        });
    }
    if one_plus_annual == Decimal::ONE {
        return Ok(Decimal::ZERO);
    }
    Ok(one_plus_annual.powd(Decimal::ONE / MONTHS_PER_YEAR) - Decimal::ONE)
}

/// Net Present Value of end-of-period cash flows: the first flow is
/// discounted by one full period.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> SubscriptionModelResult<Money> {
    if rate <= dec!(-1) {
        return Err(SubscriptionModelError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        // Past Decimal::MAX the remaining terms are below the last digit.
        let Some(next) = discount.checked_mul(one_plus_r) else {
            break;
        };
        discount = next;
        let term = if discount.is_zero() { None } else { cf.checked_div(discount) };
        let Some(term) = term else {
            return Err(SubscriptionModelError::DivisionByZero {
                context: format!("NPV discount factor vanishes at period {}", t + 1),
            });
        };
        result = result.saturating_add(term);
    }

    Ok(result)
}

/// Running totals of a cash flow series.
pub fn cumulative(cash_flows: &[Money]) -> Vec<Money> {
    cash_flows
        .iter()
        .scan(Decimal::ZERO, |acc, cf| {
            *acc = acc.saturating_add(*cf);
            Some(*acc)
        })
        .collect()
}

/// First 1-based period at which the cumulative total turns strictly positive.
pub fn payback_period(cash_flows: &[Money]) -> Option<u32> {
    cumulative(cash_flows)
        .iter()
        .position(|total| *total > Decimal::ZERO)
        .map(|idx| idx as u32 + 1)
}

/// Round to a whole number, halves away from zero.
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// `a / b`, clamped to `Decimal::MAX`/`MIN` when the quotient overflows.
/// Division by zero gives zero.
pub fn saturating_div(a: Decimal, b: Decimal) -> Decimal {
    if b.is_zero() {
        return Decimal::ZERO;
    }
    a.checked_div(b).unwrap_or(if a.is_sign_negative() == b.is_sign_negative() {
        Decimal::MAX
    } else {
        Decimal::MIN
    })
}

/// Sum that clamps at `Decimal::MAX`/`MIN` instead of overflowing.
pub fn saturating_sum<I: IntoIterator<Item = Decimal>>(values: I) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, |acc, v| acc.saturating_add(v))
}

/// Whether a value sits on the representable limit, i.e. was clamped.
pub fn is_saturated(value: Decimal) -> bool {
    value == Decimal::MAX || value == Decimal::MIN
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_monthly_rate_compounds_back_to_annual() {
        let r = monthly_rate(dec!(8)).unwrap();
        let annual = (Decimal::ONE + r).powu(12) - Decimal::ONE;
        assert!((annual - dec!(0.08)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_monthly_rate_zero() {
        assert_eq!(monthly_rate(dec!(0)).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_monthly_rate_rejects_total_loss() {
        assert!(monthly_rate(dec!(-100)).is_err());
    }

    #[test]
    fn test_npv_discounts_first_flow() {
        let result = npv(dec!(0.10), &[dec!(110), dec!(121)]).unwrap();
        assert!((result - dec!(200)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_npv_zero_rate() {
        let cfs = vec![dec!(-100), dec!(50), dec!(50), dec!(50)];
        let result = npv(dec!(0.0), &cfs).unwrap();
        assert_eq!(result, dec!(50));
    }

    #[test]
    fn test_npv_stops_once_discount_factor_overflows() {
        // 1.5^t passes Decimal::MAX around t = 164
        let cfs = vec![dec!(1000); 400];
        let result = npv(dec!(0.5), &cfs).unwrap();
        assert!((result - dec!(2000)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_npv_reports_vanishing_discount_factor() {
        // 0.01^t rounds to zero within 28 decimal places
        let cfs = vec![dec!(1); 40];
        let err = npv(dec!(-0.99), &cfs).unwrap_err();
        assert!(matches!(err, SubscriptionModelError::DivisionByZero { .. }));
    }

    #[test]
    fn test_saturating_helpers_clamp() {
        assert_eq!(saturating_sum([Decimal::MAX, dec!(1)]), Decimal::MAX);
        assert_eq!(saturating_div(Decimal::MAX, dec!(0.5)), Decimal::MAX);
        assert_eq!(saturating_div(dec!(-1), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(saturating_div(Decimal::MIN, dec!(0.5)), Decimal::MIN);
        assert!(is_saturated(Decimal::MAX));
        assert!(!is_saturated(dec!(1)));
    }

    #[test]
    fn test_payback_requires_strictly_positive_total() {
        assert_eq!(payback_period(&[dec!(-10), dec!(10), dec!(1)]), Some(3));
        assert_eq!(payback_period(&[dec!(-10), dec!(5)]), None);
        assert_eq!(payback_period(&[]), None);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(dec!(2.5)), dec!(3));
        assert_eq!(round_half_up(dec!(6.4999)), dec!(6));
    }
}
