//! Core domain types and logic.

pub mod error;
pub mod price;
pub mod series;
pub mod metrics;
pub mod backtest;
pub mod evaluation;
pub mod features;
pub mod coin_id;
pub mod split;
pub mod advisor;
pub mod config_validation;
