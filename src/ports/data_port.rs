//! Data access port trait.

use crate::domain::error::SmalabError;
use crate::domain::series::{Bar, PriceSeries};

/// Source of daily bars for the single security under test.
pub trait DataPort {
    /// Raw rows in source order; schema problems (missing columns,
    /// unparseable cells) surface here.
    fn fetch_bars(&self) -> Result<Vec<Bar>, SmalabError>;

    /// Human-readable description of the source, for messages.
    fn describe(&self) -> String;

    /// Fetch and validate into a [`PriceSeries`]; ordering problems
    /// (duplicate or out-of-order dates) surface here.
    fn fetch_series(&self) -> Result<PriceSeries, SmalabError> {
        PriceSeries::from_bars(self.fetch_bars()?)
    }
}
