//! Summary statistics over a trade ledger.
//!
//! A [`Summary`] is derived on demand and never stored alongside the
//! ledger; rerunning the backtest rebuilds both.

use crate::domain::backtest::{SortOrder, Trade, TradeLedger};

/// Aggregate statistics for one backtest run.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_trades: usize,
    pub profitable_trades: usize,
    pub total_profit: f64,
    pub mean_profit: f64,
    pub max_profit: f64,
    pub min_profit: f64,
    pub total_quantity: u64,
    pub total_buy_notional: f64,
    pub total_sell_notional: f64,
    pub top_trades: Vec<Trade>,
    pub bottom_trades: Vec<Trade>,
}

impl Summary {
    /// Aggregate a ledger. An empty ledger yields zeroed counts and
    /// sums with empty top/bottom lists; it is never an error.
    pub fn compute(ledger: &TradeLedger, top_n: usize) -> Self {
        let total_trades = ledger.len();
        let total_profit = ledger.total_profit();

        let mut profitable_trades = 0usize;
        let mut max_profit = 0.0_f64;
        let mut min_profit = 0.0_f64;
        let mut total_quantity = 0u64;
        let mut total_buy_notional = 0.0_f64;
        let mut total_sell_notional = 0.0_f64;

        for (i, trade) in ledger.iter().enumerate() {
            if trade.profit_loss > 0.0 {
                profitable_trades += 1;
            }
            if i == 0 || trade.profit_loss > max_profit {
                max_profit = trade.profit_loss;
            }
            if i == 0 || trade.profit_loss < min_profit {
                min_profit = trade.profit_loss;
            }
            total_quantity += trade.quantity as u64;
            total_buy_notional += trade.buy_notional();
            total_sell_notional += trade.sell_notional();
        }

        let mean_profit = if total_trades > 0 {
            total_profit / total_trades as f64
        } else {
            0.0
        };

        Summary {
            total_trades,
            profitable_trades,
            total_profit,
            mean_profit,
            max_profit,
            min_profit,
            total_quantity,
            total_buy_notional,
            total_sell_notional,
            top_trades: top_trades(ledger, top_n),
            bottom_trades: worst_trades(ledger, top_n),
        }
    }
}

/// The `n` most profitable trades, best first. Ties keep ledger order;
/// `n` past the ledger length returns every trade.
pub fn top_trades(ledger: &TradeLedger, n: usize) -> Vec<Trade> {
    let mut ranked = ledger.sorted_by_profit(SortOrder::Descending);
    ranked.truncate(n);
    ranked
}

/// The `n` least profitable trades, worst first.
pub fn worst_trades(ledger: &TradeLedger, n: usize) -> Vec<Trade> {
    let mut ranked = ledger.sorted_by_profit(SortOrder::Ascending);
    ranked.truncate(n);
    ranked
}
