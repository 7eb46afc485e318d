//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report_adapter::TextReportAdapter;
use crate::domain::backtest::{self, BacktestConfig, ExtractionMode, PriceField};
use crate::domain::error::SmalabError;
use crate::domain::indicator::{DEFAULT_MAX_WINDOWS, IndicatorSet};
use crate::domain::series::PriceSeries;
use crate::domain::strategy::{Strategy, StrategySpec};
use crate::domain::summary::Summary;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "smalab", about = "SMA crossover strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Price CSV, overriding [data] csv_path
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration without touching price data
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show the date range of a price CSV
    Info {
        #[arg(long)]
        data: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data,
            output,
        } => run_backtest(&config, data.as_ref(), output.as_ref()),
        Command::Validate { config } => run_validate(&config),
        Command::Info { data } => run_info(&data),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = SmalabError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// Read the `[indicators] windows` list: comma-separated positive
/// integers.
pub fn parse_windows(config: &dyn ConfigPort) -> Result<Vec<usize>, SmalabError> {
    let raw = config
        .get_string("indicators", "windows")
        .ok_or_else(|| SmalabError::ConfigMissing {
            section: "indicators".into(),
            key: "windows".into(),
        })?;

    let mut windows = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let window: usize = part.parse().map_err(|_| SmalabError::ConfigInvalid {
            section: "indicators".into(),
            key: "windows".into(),
            reason: format!("'{}' is not a positive integer", part),
        })?;
        windows.push(window);
    }

    if windows.is_empty() {
        return Err(SmalabError::ConfigInvalid {
            section: "indicators".into(),
            key: "windows".into(),
            reason: "at least one window is required".into(),
        });
    }
    Ok(windows)
}

/// Collect the six strategy strings from `[strategy]`.
pub fn build_strategy_spec(config: &dyn ConfigPort) -> Result<StrategySpec, SmalabError> {
    let require = |key: &str| -> Result<String, SmalabError> {
        config
            .get_string("strategy", key)
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| SmalabError::ConfigMissing {
                section: "strategy".into(),
                key: key.into(),
            })
    };

    Ok(StrategySpec {
        name: config
            .get_string("strategy", "name")
            .unwrap_or_else(|| "Unnamed".to_string()),
        entry_left: require("entry_left")?,
        entry_relation: require("entry_relation")?,
        entry_right: require("entry_right")?,
        exit_left: require("exit_left")?,
        exit_relation: require("exit_relation")?,
        exit_right: require("exit_right")?,
    })
}

/// Build the backtest parameters from `[backtest]`.
pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, SmalabError> {
    let mode = match config.get_string("backtest", "mode") {
        None => ExtractionMode::default(),
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "next-bar-close" => ExtractionMode::NextBarClose,
            "entry-exit" => ExtractionMode::EntryExit,
            other => {
                return Err(SmalabError::ConfigInvalid {
                    section: "backtest".into(),
                    key: "mode".into(),
                    reason: format!("'{}' is not 'next-bar-close' or 'entry-exit'", other),
                });
            }
        },
    };

    let price_field = match config.get_string("backtest", "price_field") {
        None => PriceField::default(),
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "close" => PriceField::Close,
            "adjusted" => PriceField::AdjClose,
            other => {
                return Err(SmalabError::ConfigInvalid {
                    section: "backtest".into(),
                    key: "price_field".into(),
                    reason: format!("'{}' is not 'close' or 'adjusted'", other),
                });
            }
        },
    };

    let quantity = config.get_usize("backtest", "quantity", 1);
    let quantity = u32::try_from(quantity).map_err(|_| SmalabError::ConfigInvalid {
        section: "backtest".into(),
        key: "quantity".into(),
        reason: format!("{} does not fit a 32-bit quantity", quantity),
    })?;
    if quantity == 0 {
        return Err(SmalabError::InvalidQuantity { quantity });
    }

    Ok(BacktestConfig {
        mode,
        quantity,
        allow_overlapping: config.get_bool("backtest", "allow_overlapping", true),
        price_field,
    })
}

fn resolve_data_path(
    data_override: Option<&PathBuf>,
    config: &dyn ConfigPort,
) -> Result<PathBuf, SmalabError> {
    if let Some(path) = data_override {
        return Ok(path.clone());
    }
    config
        .get_string("data", "csv_path")
        .map(PathBuf::from)
        .ok_or_else(|| SmalabError::ConfigMissing {
            section: "data".into(),
            key: "csv_path".into(),
        })
}

fn run_backtest(
    config_path: &PathBuf,
    data_override: Option<&PathBuf>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match run_backtest_pipeline(&adapter, data_override, output_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_backtest_pipeline(
    adapter: &FileConfigAdapter,
    data_override: Option<&PathBuf>,
    output_path: Option<&PathBuf>,
) -> Result<(), SmalabError> {
    let data_path = resolve_data_path(data_override, adapter)?;
    let data_port = CsvAdapter::new(data_path);

    eprintln!("Loading price data from {}", data_port.describe());
    let series = data_port.fetch_series()?;
    eprintln!(
        "  {} bars, {} to {}",
        series.len(),
        series
            .first_date()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".into()),
        series
            .last_date()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".into()),
    );

    let windows = parse_windows(adapter)?;
    let max_windows = adapter.get_usize("indicators", "max_windows", DEFAULT_MAX_WINDOWS);
    let indicators = IndicatorSet::compute(&series, &windows, max_windows)?;
    eprintln!(
        "Computed SMAs: {}",
        indicators
            .windows()
            .iter()
            .map(|w| format!("SMA_{}", w))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let spec = build_strategy_spec(adapter)?;
    let strategy = Strategy::build(&spec, &indicators)?;
    eprintln!("Strategy: {}", strategy.name);
    eprintln!("  entry: {}", strategy.entry);
    eprintln!("  exit:  {}", strategy.exit);

    let bt_config = build_backtest_config(adapter)?;
    let ledger = backtest::run_backtest(&series, &strategy, &indicators, &bt_config)?;

    let top_n = adapter.get_usize("report", "top_n", 5);
    let summary = Summary::compute(&ledger, top_n);

    eprintln!("\n=== Results ===");
    eprintln!("Total trades:      {}", summary.total_trades);
    eprintln!("Profitable trades: {}", summary.profitable_trades);
    eprintln!("Total P&L:         {:.2}", summary.total_profit);
    eprintln!("Mean P&L:          {:.2}", summary.mean_profit);
    eprintln!("Best trade:        {:.2}", summary.max_profit);
    eprintln!("Worst trade:       {:.2}", summary.min_profit);

    let output = match output_path {
        Some(path) => path.clone(),
        None => adapter
            .get_string("report", "output")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("report.txt")),
    };
    TextReportAdapter.write(&summary, &ledger, &strategy, &output)?;
    eprintln!("\nReport written to: {}", output.display());

    Ok(())
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    match validate_config(&adapter) {
        Ok(strategy) => {
            eprintln!("\nStrategy rules (parsed):");
            eprintln!("  entry: {}", strategy.entry);
            eprintln!("  exit:  {}", strategy.exit);
            eprintln!("\nConfiguration is valid");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Validate windows, strategy spec, and backtest parameters without
/// reading any price data. An empty series is enough: every configured
/// window produces an (empty) column, so indicator references check
/// out exactly as they would in a real run.
pub fn validate_config(config: &dyn ConfigPort) -> Result<Strategy, SmalabError> {
    let windows = parse_windows(config)?;
    let max_windows = config.get_usize("indicators", "max_windows", DEFAULT_MAX_WINDOWS);
    let indicators = IndicatorSet::compute(&PriceSeries::empty(), &windows, max_windows)?;

    let spec = build_strategy_spec(config)?;
    let strategy = Strategy::build(&spec, &indicators)?;
    build_backtest_config(config)?;

    Ok(strategy)
}

fn run_info(data_path: &PathBuf) -> ExitCode {
    let data_port = CsvAdapter::new(data_path.clone());
    match data_port.fetch_series() {
        Ok(series) => {
            if series.is_empty() {
                eprintln!("{}: no bars", data_port.describe());
            } else {
                println!(
                    "{}: {} bars, {} to {}",
                    data_port.describe(),
                    series.len(),
                    series.first_date().map(|d| d.to_string()).unwrap_or_default(),
                    series.last_date().map(|d| d.to_string()).unwrap_or_default(),
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
