//! Trade extraction: turning signal series into a ledger of closed
//! trades.
//!
//! Two extraction modes exist side by side and are deliberately not
//! unified:
//!
//! - `NextBarClose`: every true entry-signal bar opens a one-day trade
//!   that closes at the following bar's price. Overlapping trades are
//!   permitted unless configured otherwise.
//! - `EntryExit`: a forward scan holding at most one position; a trade
//!   opened on an entry signal closes at the first later exit signal.
//!   A trade still open when the series ends is dropped, never
//!   force-closed at the last bar.

use crate::domain::error::SmalabError;
use crate::domain::indicator::IndicatorSet;
use crate::domain::series::{Bar, PriceSeries};
use crate::domain::strategy::Strategy;
use chrono::NaiveDate;

/// How trades are materialized from signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    NextBarClose,
    #[default]
    EntryExit,
}

/// Which bar price trades are filled at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceField {
    #[default]
    Close,
    /// Adjusted close, falling back to the raw close when the data
    /// source did not provide one.
    AdjClose,
}

impl PriceField {
    pub fn of(&self, bar: &Bar) -> f64 {
        match self {
            PriceField::Close => bar.close,
            PriceField::AdjClose => bar.adjusted_or_close(),
        }
    }
}

/// Candle colour of the entry bar: red when it closed below its open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandleType {
    Red,
    Green,
}

impl CandleType {
    pub fn classify(open: f64, price: f64) -> Self {
        if price < open {
            CandleType::Red
        } else {
            CandleType::Green
        }
    }
}

/// Backtest parameters. Quantity applies uniformly to every trade.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestConfig {
    pub mode: ExtractionMode,
    pub quantity: u32,
    pub allow_overlapping: bool,
    pub price_field: PriceField,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            mode: ExtractionMode::default(),
            quantity: 1,
            allow_overlapping: true,
            price_field: PriceField::default(),
        }
    }
}

/// One closed round trip. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub quantity: u32,
    pub profit_loss: f64,
    pub profit_loss_pct: f64,
    pub entry_candle: CandleType,
}

impl Trade {
    pub fn new(
        entry_date: NaiveDate,
        entry_price: f64,
        exit_date: NaiveDate,
        exit_price: f64,
        quantity: u32,
        entry_candle: CandleType,
    ) -> Self {
        let profit_loss = (exit_price - entry_price) * quantity as f64;
        let buy_notional = entry_price * quantity as f64;
        let profit_loss_pct = if buy_notional > 0.0 {
            profit_loss / buy_notional
        } else {
            0.0
        };
        Trade {
            entry_date,
            entry_price,
            exit_date,
            exit_price,
            quantity,
            profit_loss,
            profit_loss_pct,
            entry_candle,
        }
    }

    pub fn buy_notional(&self) -> f64 {
        self.entry_price * self.quantity as f64
    }

    pub fn sell_notional(&self) -> f64 {
        self.exit_price * self.quantity as f64
    }
}

/// Display ordering for trade tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// The ordered sequence of closed trades from one backtest run.
/// Append-only during extraction; fully rebuilt on every run.
#[derive(Debug, Clone, Default)]
pub struct TradeLedger {
    trades: Vec<Trade>,
}

impl TradeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_trades(trades: Vec<Trade>) -> Self {
        Self { trades }
    }

    fn push(&mut self, trade: Trade) {
        self.trades.push(trade);
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Trade> {
        self.trades.iter()
    }

    /// Running cumulative P&L in ledger (chronological) order. This is
    /// a property of ledger ordering and must be read before any
    /// display-time re-sort.
    pub fn accumulated_profit(&self) -> Vec<f64> {
        let mut running = 0.0;
        self.trades
            .iter()
            .map(|t| {
                running += t.profit_loss;
                running
            })
            .collect()
    }

    pub fn total_profit(&self) -> f64 {
        self.trades.iter().map(|t| t.profit_loss).sum()
    }

    /// A display-ordered copy of the trades; the ledger itself keeps
    /// chronological order. Ties keep ledger order (stable sort).
    pub fn sorted_by_profit(&self, order: SortOrder) -> Vec<Trade> {
        let mut sorted = self.trades.clone();
        sorted.sort_by(|a, b| {
            let cmp = a
                .profit_loss
                .partial_cmp(&b.profit_loss)
                .unwrap_or(std::cmp::Ordering::Equal);
            match order {
                SortOrder::Ascending => cmp,
                SortOrder::Descending => cmp.reverse(),
            }
        });
        sorted
    }
}

impl<'a> IntoIterator for &'a TradeLedger {
    type Item = &'a Trade;
    type IntoIter = std::slice::Iter<'a, Trade>;

    fn into_iter(self) -> Self::IntoIter {
        self.trades.iter()
    }
}

/// Evaluate the strategy's signals and extract trades in the
/// configured mode. `NextBarClose` uses the entry rule only.
pub fn run_backtest(
    series: &PriceSeries,
    strategy: &Strategy,
    indicators: &IndicatorSet,
    config: &BacktestConfig,
) -> Result<TradeLedger, SmalabError> {
    if config.quantity == 0 {
        return Err(SmalabError::InvalidQuantity {
            quantity: config.quantity,
        });
    }

    let (entry, exit) = strategy.evaluate_signals(series, indicators)?;
    let ledger = match config.mode {
        ExtractionMode::NextBarClose => extract_next_bar_trades(series, &entry, config),
        ExtractionMode::EntryExit => extract_rule_trades(series, &entry, &exit, config),
    };
    Ok(ledger)
}

/// Next-bar-close extraction: each true signal bar with a successor
/// buys at that bar and sells at the next. A signal on the final bar
/// has no next close and is skipped. With `allow_overlapping` off, a
/// signal firing strictly before the previous trade's exit bar is
/// skipped.
pub fn extract_next_bar_trades(
    series: &PriceSeries,
    signal: &[bool],
    config: &BacktestConfig,
) -> TradeLedger {
    let bars = series.bars();
    let n = bars.len().min(signal.len());
    let mut ledger = TradeLedger::new();
    let mut last_exit: Option<usize> = None;

    for i in 0..n {
        if !signal[i] {
            continue;
        }
        if i + 1 >= bars.len() {
            continue;
        }
        if !config.allow_overlapping {
            if let Some(exit_idx) = last_exit {
                if i < exit_idx {
                    continue;
                }
            }
        }

        let entry_bar = &bars[i];
        let exit_bar = &bars[i + 1];
        let entry_price = config.price_field.of(entry_bar);
        ledger.push(Trade::new(
            entry_bar.date,
            entry_price,
            exit_bar.date,
            config.price_field.of(exit_bar),
            config.quantity,
            CandleType::classify(entry_bar.open, entry_price),
        ));
        last_exit = Some(i + 1);
    }

    ledger
}

/// Entry/exit-rule extraction: forward scan with at most one open
/// position. Scanning resumes strictly after each exit bar, so trades
/// never overlap. A position still open at series end is dropped.
pub fn extract_rule_trades(
    series: &PriceSeries,
    entry: &[bool],
    exit: &[bool],
    config: &BacktestConfig,
) -> TradeLedger {
    let bars = series.bars();
    let n = bars.len().min(entry.len()).min(exit.len());
    let mut ledger = TradeLedger::new();

    let mut i = 0;
    while i < n {
        if !entry[i] {
            i += 1;
            continue;
        }

        let entry_idx = i;
        let mut exit_idx = None;
        for (j, &flag) in exit.iter().enumerate().take(n).skip(entry_idx + 1) {
            if flag {
                exit_idx = Some(j);
                break;
            }
        }

        let Some(exit_idx) = exit_idx else {
            // open at series end; excluded from the closed ledger
            break;
        };

        let entry_bar = &bars[entry_idx];
        let exit_bar = &bars[exit_idx];
        let entry_price = config.price_field.of(entry_bar);
        ledger.push(Trade::new(
            entry_bar.date,
            entry_price,
            exit_bar.date,
            config.price_field.of(exit_bar),
            config.quantity,
            CandleType::classify(entry_bar.open, entry_price),
        ));

        i = exit_idx + 1;
    }

    ledger
}
