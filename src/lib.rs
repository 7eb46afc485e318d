//! smalab: SMA crossover strategy backtesting.
//!
//! The crate is split hexagonally: `domain` holds the pure backtest
//! logic (series, indicators, signals, strategies, trade extraction,
//! summaries), `ports` defines the traits the domain needs from the
//! outside world, and `adapters` provides the CSV, INI, and text-report
//! implementations the CLI wires together.

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
