pub mod artifacts;
pub mod market_data;
pub mod market_depth;
pub mod persistence;
pub mod remote;
pub mod tick_log;
