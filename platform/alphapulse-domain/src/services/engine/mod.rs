pub mod execution;
pub mod executor;
pub mod slippage;
