pub mod collection;
pub mod config;
mod shared;
pub mod simulation;
pub mod training;
pub mod validation;
