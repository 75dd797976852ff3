pub mod engine;
pub mod environment;
pub mod market_data_source;
pub mod observation;
pub mod ohlcv;
pub mod policy;
pub mod reward;
pub mod rollout;
