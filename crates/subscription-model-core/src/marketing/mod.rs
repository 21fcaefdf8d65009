pub mod funnel;

#[cfg(feature = "audit")]
pub mod audit;
