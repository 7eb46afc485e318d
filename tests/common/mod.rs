//! Shared helpers for integration tests.

use chrono::NaiveDate;
use smalab::domain::error::SmalabError;
use smalab::domain::series::Bar;
use smalab::ports::data_port::DataPort;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn make_bar(day: u32, close: f64) -> Bar {
    Bar {
        date: date(2024, 1, 1)
            .checked_add_days(chrono::Days::new(day as u64))
            .unwrap(),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        adj_close: None,
        volume: 10_000,
    }
}

pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(i as u32, close))
        .collect()
}

/// In-memory data source for wiring the pipeline without files.
pub struct MockDataPort {
    pub bars: Vec<Bar>,
}

impl MockDataPort {
    pub fn with_closes(closes: &[f64]) -> Self {
        Self {
            bars: make_bars(closes),
        }
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self) -> Result<Vec<Bar>, SmalabError> {
        Ok(self.bars.clone())
    }

    fn describe(&self) -> String {
        "mock data".to_string()
    }
}
