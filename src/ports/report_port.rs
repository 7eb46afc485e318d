//! Report generation port trait.

use crate::domain::backtest::TradeLedger;
use crate::domain::error::SmalabError;
use crate::domain::strategy::Strategy;
use crate::domain::summary::Summary;
use std::path::Path;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(
        &self,
        summary: &Summary,
        ledger: &TradeLedger,
        strategy: &Strategy,
        output_path: &Path,
    ) -> Result<(), SmalabError>;
}
