pub mod carbon;
pub mod financials;
pub mod marketing;
pub mod seasonality;
pub mod sensitivity;
pub mod simulate;
