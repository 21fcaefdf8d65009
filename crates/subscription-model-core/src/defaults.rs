//! Dashboard defaults used when a scenario field is left unset.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const DEFAULT_TIER_PRICES: [Decimal; 4] = [dec!(500), dec!(1200), dec!(3000), dec!(7500)];
pub const DEFAULT_MARKETING_BUDGET: Decimal = dec!(10000);
/// Percent.
pub const DEFAULT_CONVERSION_RATE: Decimal = dec!(2.5);
/// Percent.
pub const DEFAULT_CTR: Decimal = dec!(18);
/// Currency per thousand impressions.
pub const DEFAULT_COST_PER_MILLE: Decimal = dec!(8);
/// Percent per month.
pub const DEFAULT_MONTHLY_CHURN_RATE: Decimal = dec!(3);
/// Percent per year.
pub const DEFAULT_WACC: Decimal = dec!(8);
pub const DEFAULT_PROJECTION_MONTHS: u32 = 24;
pub const DEFAULT_INITIAL_INVESTMENT: Decimal = dec!(200000);
/// Percent of net revenue.
pub const DEFAULT_OPERATING_EXPENSE_RATE: Decimal = dec!(35);
/// 50k/year rounded to a whole monthly figure.
pub const DEFAULT_FIXED_COSTS: Decimal = dec!(4167);
pub const DEFAULT_TIER_ADOPTION: [Decimal; 4] = [dec!(0.45), dec!(0.3), dec!(0.15), dec!(0.1)];
pub const DEFAULT_INITIAL_CUSTOMERS: Decimal = dec!(10);

/// Relative monthly demand, January first. Never above 1 so blending
/// only ever dampens acquisition.
pub const DEFAULT_SEASONALITY: [Decimal; 12] = [
    dec!(0.85),
    dec!(0.9),
    dec!(1),
    dec!(0.95),
    dec!(0.9),
    dec!(0.8),
    dec!(0.7),
    dec!(0.75),
    dec!(0.95),
    dec!(1),
    dec!(0.9),
    dec!(0.6),
];
