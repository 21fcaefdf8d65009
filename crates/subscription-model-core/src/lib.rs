pub mod carbon;
pub mod defaults;
pub mod error;
pub mod marketing;
pub mod seasonality;
pub mod subscription;
pub mod time_value;
pub mod types;

#[cfg(feature = "finance")]
pub mod finance;

#[cfg(feature = "sensitivity")]
pub mod sensitivity;

pub use carbon::intensity::derive_carbon_per_customer;
pub use error::SubscriptionModelError;
#[cfg(feature = "finance")]
pub use finance::metrics::{calculate_financial_metrics, ExpenseConfig, FinancialMetrics};
pub use marketing::funnel::{calculate_tier_metrics, TierMetrics};
pub use subscription::engine::{
    run_subscription_model, run_subscription_model_with_blend, MonthlySnapshot, SimulationResult,
    SummaryMetrics,
};
pub use subscription::scenario::{validate_scenario, ScenarioInput};
pub use types::*;

/// Standard result type for all subscription-model operations
pub type SubscriptionModelResult<T> = Result<T, SubscriptionModelError>;
