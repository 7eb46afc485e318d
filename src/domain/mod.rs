//! Core domain types and logic.

pub mod backtest;
pub mod error;
pub mod indicator;
pub mod series;
pub mod signal;
pub mod strategy;
pub mod summary;
