pub mod cost;
pub mod intensity;
