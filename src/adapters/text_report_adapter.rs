//! Plain-text report adapter.
//!
//! Renders the backtest summary and trade table the way the CLI prints
//! them, but to a file so results can be kept next to the config that
//! produced them.

use crate::domain::backtest::{CandleType, TradeLedger};
use crate::domain::error::SmalabError;
use crate::domain::strategy::Strategy;
use crate::domain::summary::Summary;
use crate::ports::report_port::ReportPort;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

pub struct TextReportAdapter;

impl TextReportAdapter {
    pub fn render(summary: &Summary, ledger: &TradeLedger, strategy: &Strategy) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Strategy: {}", strategy.name);
        let _ = writeln!(out, "  entry: {}", strategy.entry);
        let _ = writeln!(out, "  exit:  {}", strategy.exit);
        let _ = writeln!(out);

        let _ = writeln!(out, "Summary");
        let _ = writeln!(out, "  Total trades:      {}", summary.total_trades);
        let _ = writeln!(out, "  Profitable trades: {}", summary.profitable_trades);
        let _ = writeln!(out, "  Total P&L:         {:.2}", summary.total_profit);
        let _ = writeln!(out, "  Mean P&L:          {:.2}", summary.mean_profit);
        let _ = writeln!(out, "  Best trade:        {:.2}", summary.max_profit);
        let _ = writeln!(out, "  Worst trade:       {:.2}", summary.min_profit);
        let _ = writeln!(out, "  Total quantity:    {}", summary.total_quantity);
        let _ = writeln!(out, "  Buy notional:      {:.2}", summary.total_buy_notional);
        let _ = writeln!(out, "  Sell notional:     {:.2}", summary.total_sell_notional);

        if !summary.top_trades.is_empty() {
            let _ = writeln!(out, "\nTop {} trades", summary.top_trades.len());
            Self::render_trade_rows(&mut out, &summary.top_trades);
        }
        if !summary.bottom_trades.is_empty() {
            let _ = writeln!(out, "\nBottom {} trades", summary.bottom_trades.len());
            Self::render_trade_rows(&mut out, &summary.bottom_trades);
        }

        if !ledger.is_empty() {
            let _ = writeln!(out, "\nTrade ledger");
            let _ = writeln!(
                out,
                "  {:<12} {:<12} {:>10} {:>10} {:>5} {:>10} {:>10} {:>6}",
                "entry", "exit", "buy", "sell", "qty", "p&l", "acc p&l", "candle"
            );
            let accumulated = ledger.accumulated_profit();
            for (trade, acc) in ledger.iter().zip(accumulated) {
                let candle = match trade.entry_candle {
                    CandleType::Red => "red",
                    CandleType::Green => "green",
                };
                let _ = writeln!(
                    out,
                    "  {:<12} {:<12} {:>10.2} {:>10.2} {:>5} {:>10.2} {:>10.2} {:>6}",
                    trade.entry_date,
                    trade.exit_date,
                    trade.entry_price,
                    trade.exit_price,
                    trade.quantity,
                    trade.profit_loss,
                    acc,
                    candle
                );
            }
        }

        out
    }

    fn render_trade_rows(out: &mut String, trades: &[crate::domain::backtest::Trade]) {
        for trade in trades {
            let _ = writeln!(
                out,
                "  {} -> {}  {:>10.2} -> {:>10.2}  p&l {:>10.2} ({:>7.2}%)",
                trade.entry_date,
                trade.exit_date,
                trade.entry_price,
                trade.exit_price,
                trade.profit_loss,
                trade.profit_loss_pct * 100.0
            );
        }
    }
}

impl ReportPort for TextReportAdapter {
    fn write(
        &self,
        summary: &Summary,
        ledger: &TradeLedger,
        strategy: &Strategy,
        output_path: &Path,
    ) -> Result<(), SmalabError> {
        let content = Self::render(summary, ledger, strategy);
        fs::write(output_path, content)?;
        Ok(())
    }
}
