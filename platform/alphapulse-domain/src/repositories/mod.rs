pub mod artifacts;
pub mod market_data;
pub mod market_depth;
pub mod tick_log;
pub mod training_log;
