use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Customers, Percent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rollforward {
    pub churned: Customers,
    pub customers: Customers,
}

/// One month of the customer recurrence:
/// `next = max(0, customers + new - min(customers, customers * churn / 100))`.
///
/// Values are carried unrounded so that rounding never compounds.
pub fn roll_forward(customers: Customers, new_customers: Customers, churn_pct: Percent) -> Rollforward {
    let customers = customers.max(Decimal::ZERO);
    let churned = (customers.saturating_mul(churn_pct) / dec!(100)).clamp(Decimal::ZERO, customers);
    let next = (customers - churned)
        .saturating_add(new_customers.max(Decimal::ZERO))
        .max(Decimal::ZERO);
    Rollforward {
        churned,
        customers: next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_churn_then_acquire() {
        let step = roll_forward(dec!(100), dec!(5), dec!(10));
        assert_eq!(step.churned, dec!(10));
        assert_eq!(step.customers, dec!(95));
    }

    #[test]
    fn test_churn_never_exceeds_customers() {
        let step = roll_forward(dec!(40), dec!(0), dec!(250));
        assert_eq!(step.churned, dec!(40));
        assert_eq!(step.customers, Decimal::ZERO);
    }

    #[test]
    fn test_no_rounding_in_recurrence() {
        let step = roll_forward(dec!(3), dec!(0), dec!(10));
        assert_eq!(step.customers, dec!(2.7));
    }

    #[test]
    fn test_empty_base_only_grows_by_acquisition() {
        let step = roll_forward(dec!(0), dec!(1.25), dec!(5));
        assert_eq!(step.churned, Decimal::ZERO);
        assert_eq!(step.customers, dec!(1.25));
    }
}
