//! Daily price bars and the validated price series.

use crate::domain::error::SmalabError;
use chrono::NaiveDate;

/// One trading day of OHLCV data.
///
/// `adj_close` carries the split/dividend-adjusted close when the data
/// source provides one; trade extraction can be configured to buy at it
/// instead of the raw close.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: Option<f64>,
    pub volume: i64,
}

impl Bar {
    /// Adjusted close when present, raw close otherwise.
    pub fn adjusted_or_close(&self) -> f64 {
        self.adj_close.unwrap_or(self.close)
    }
}

/// An ordered-by-date series of bars for a single security.
///
/// Construction validates the invariants the rest of the pipeline
/// relies on: strictly increasing dates (no duplicates), finite
/// non-negative prices, non-negative volume. Calendar gaps are fine;
/// non-trading days are simply absent.
#[derive(Debug, Clone, Default)]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    pub fn from_bars(bars: Vec<Bar>) -> Result<Self, SmalabError> {
        for (i, bar) in bars.iter().enumerate() {
            for (name, value) in [
                ("open", bar.open),
                ("high", bar.high),
                ("low", bar.low),
                ("close", bar.close),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return Err(SmalabError::Schema {
                        reason: format!("{} on {} is not a finite non-negative price", name, bar.date),
                    });
                }
            }
            if let Some(adj) = bar.adj_close {
                if !adj.is_finite() || adj < 0.0 {
                    return Err(SmalabError::Schema {
                        reason: format!(
                            "adjusted close on {} is not a finite non-negative price",
                            bar.date
                        ),
                    });
                }
            }
            if bar.volume < 0 {
                return Err(SmalabError::Schema {
                    reason: format!("volume on {} is negative", bar.date),
                });
            }
            if i > 0 && bars[i - 1].date >= bar.date {
                return Err(SmalabError::Schema {
                    reason: format!(
                        "dates are not strictly increasing: {} followed by {}",
                        bars[i - 1].date,
                        bar.date
                    ),
                });
            }
        }
        Ok(Self { bars })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| b.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_bar(day: u32, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            adj_close: None,
            volume: 1000,
        }
    }

    #[test]
    fn from_bars_accepts_ordered_series() {
        let series =
            PriceSeries::from_bars(vec![make_bar(1, 100.0), make_bar(2, 101.0)]).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![100.0, 101.0]);
        assert_eq!(
            series.first_date(),
            Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
        assert_eq!(
            series.last_date(),
            Some(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
        );
    }

    #[test]
    fn from_bars_accepts_calendar_gaps() {
        // Friday then Monday; the weekend is simply absent.
        let series =
            PriceSeries::from_bars(vec![make_bar(5, 100.0), make_bar(8, 101.0)]).unwrap();
        assert_eq!(series.len(), 2);
    }

    #[test]
    fn from_bars_rejects_duplicate_dates() {
        let result = PriceSeries::from_bars(vec![make_bar(1, 100.0), make_bar(1, 101.0)]);
        assert!(matches!(result, Err(SmalabError::Schema { .. })));
    }

    #[test]
    fn from_bars_rejects_out_of_order_dates() {
        let result = PriceSeries::from_bars(vec![make_bar(2, 100.0), make_bar(1, 101.0)]);
        assert!(matches!(result, Err(SmalabError::Schema { .. })));
    }

    #[test]
    fn from_bars_rejects_non_finite_price() {
        let mut bar = make_bar(1, 100.0);
        bar.close = f64::NAN;
        let result = PriceSeries::from_bars(vec![bar]);
        assert!(matches!(result, Err(SmalabError::Schema { .. })));
    }

    #[test]
    fn from_bars_rejects_negative_price() {
        let mut bar = make_bar(1, 100.0);
        bar.low = -1.0;
        let result = PriceSeries::from_bars(vec![bar]);
        assert!(matches!(result, Err(SmalabError::Schema { .. })));
    }

    #[test]
    fn from_bars_rejects_negative_volume() {
        let mut bar = make_bar(1, 100.0);
        bar.volume = -5;
        let result = PriceSeries::from_bars(vec![bar]);
        assert!(matches!(result, Err(SmalabError::Schema { .. })));
    }

    #[test]
    fn from_bars_rejects_bad_adjusted_close() {
        let mut bar = make_bar(1, 100.0);
        bar.adj_close = Some(f64::INFINITY);
        let result = PriceSeries::from_bars(vec![bar]);
        assert!(matches!(result, Err(SmalabError::Schema { .. })));
    }

    #[test]
    fn empty_series() {
        let series = PriceSeries::empty();
        assert!(series.is_empty());
        assert_eq!(series.first_date(), None);
        assert_eq!(series.last_date(), None);
    }

    #[test]
    fn adjusted_or_close_falls_back() {
        let mut bar = make_bar(1, 100.0);
        assert_eq!(bar.adjusted_or_close(), 100.0);
        bar.adj_close = Some(98.5);
        assert_eq!(bar.adjusted_or_close(), 98.5);
    }
}
