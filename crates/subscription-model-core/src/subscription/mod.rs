pub mod engine;
pub mod revenue;
pub mod rollforward;
pub mod scenario;
