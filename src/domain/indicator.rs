//! Simple moving averages over the close series.
//!
//! An [`IndicatorSet`] is the typed replacement for looking columns up
//! by a constructed `"SMA_<n>"` string: it maps window length to the
//! computed column, and a reference to a window that was never computed
//! is an error at strategy-build time rather than a missing-key failure
//! at evaluation time.

use crate::domain::error::SmalabError;
use crate::domain::series::PriceSeries;
use std::collections::{BTreeMap, BTreeSet};

/// Default cap on the number of distinct windows per computation.
pub const DEFAULT_MAX_WINDOWS: usize = 10;

/// One rolling-mean column aligned to the price series index.
///
/// The first `window - 1` entries are `None` (warmup), never zero.
#[derive(Debug, Clone, PartialEq)]
pub struct SmaColumn {
    pub window: usize,
    pub values: Vec<Option<f64>>,
}

impl SmaColumn {
    /// Column label in the `SMA_<window>` form used by config files
    /// and reports.
    pub fn label(&self) -> String {
        format!("SMA_{}", self.window)
    }
}

/// The set of SMA columns computed for one price series, keyed by
/// window length.
#[derive(Debug, Clone, Default)]
pub struct IndicatorSet {
    columns: BTreeMap<usize, SmaColumn>,
}

impl IndicatorSet {
    /// Compute one SMA column per distinct window.
    ///
    /// Rejects a zero window and more than `max_windows` distinct
    /// windows. A window longer than the series is accepted and yields
    /// an all-missing column. Each column is computed in O(n) with a
    /// running sum.
    pub fn compute(
        series: &PriceSeries,
        windows: &[usize],
        max_windows: usize,
    ) -> Result<Self, SmalabError> {
        let mut unique: BTreeSet<usize> = BTreeSet::new();
        for &window in windows {
            if window == 0 {
                return Err(SmalabError::InvalidWindow { window });
            }
            unique.insert(window);
        }
        if unique.len() > max_windows {
            return Err(SmalabError::TooManyWindows {
                requested: unique.len(),
                maximum: max_windows,
            });
        }

        let closes = series.closes();
        let mut columns = BTreeMap::new();
        for window in unique {
            columns.insert(window, rolling_mean(&closes, window));
        }
        Ok(Self { columns })
    }

    pub fn get(&self, window: usize) -> Option<&SmaColumn> {
        self.columns.get(&window)
    }

    pub fn contains(&self, window: usize) -> bool {
        self.columns.contains_key(&window)
    }

    /// Window lengths present, in ascending order.
    pub fn windows(&self) -> Vec<usize> {
        self.columns.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

fn rolling_mean(values: &[f64], window: usize) -> SmaColumn {
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, &value) in values.iter().enumerate() {
        sum += value;
        if i >= window {
            sum -= values[i - window];
        }
        if i + 1 >= window {
            out.push(Some(sum / window as f64));
        } else {
            out.push(None);
        }
    }
    SmaColumn {
        window,
        values: out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::Bar;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn make_series(closes: &[f64]) -> PriceSeries {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .checked_add_days(chrono::Days::new(i as u64))
                    .unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                adj_close: None,
                volume: 1000,
            })
            .collect();
        PriceSeries::from_bars(bars).unwrap()
    }

    #[test]
    fn sma_hand_computed_example() {
        // closes [1,2,3,4,5], window 3 => [_,_,2,3,4]
        let series = make_series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let set = IndicatorSet::compute(&series, &[3], DEFAULT_MAX_WINDOWS).unwrap();
        let column = set.get(3).unwrap();

        assert_eq!(column.values[0], None);
        assert_eq!(column.values[1], None);
        assert_relative_eq!(column.values[2].unwrap(), 2.0);
        assert_relative_eq!(column.values[3].unwrap(), 3.0);
        assert_relative_eq!(column.values[4].unwrap(), 4.0);
    }

    #[test]
    fn sma_window_one_is_identity() {
        let series = make_series(&[10.0, 20.0, 30.0]);
        let set = IndicatorSet::compute(&series, &[1], DEFAULT_MAX_WINDOWS).unwrap();
        let column = set.get(1).unwrap();
        assert_eq!(
            column.values,
            vec![Some(10.0), Some(20.0), Some(30.0)]
        );
    }

    #[test]
    fn sma_window_longer_than_series_is_all_missing() {
        let series = make_series(&[10.0, 20.0]);
        let set = IndicatorSet::compute(&series, &[5], DEFAULT_MAX_WINDOWS).unwrap();
        let column = set.get(5).unwrap();
        assert_eq!(column.values, vec![None, None]);
    }

    #[test]
    fn zero_window_is_rejected() {
        let series = make_series(&[10.0, 20.0]);
        let result = IndicatorSet::compute(&series, &[0], DEFAULT_MAX_WINDOWS);
        assert!(matches!(
            result,
            Err(SmalabError::InvalidWindow { window: 0 })
        ));
    }

    #[test]
    fn too_many_windows_is_rejected() {
        let series = make_series(&[10.0, 20.0, 30.0]);
        let windows: Vec<usize> = (1..=4).collect();
        let result = IndicatorSet::compute(&series, &windows, 3);
        assert!(matches!(
            result,
            Err(SmalabError::TooManyWindows {
                requested: 4,
                maximum: 3
            })
        ));
    }

    #[test]
    fn duplicate_windows_collapse() {
        let series = make_series(&[10.0, 20.0, 30.0]);
        let set = IndicatorSet::compute(&series, &[2, 2, 2], 1).unwrap();
        assert_eq!(set.windows(), vec![2]);
    }

    #[test]
    fn column_label() {
        let series = make_series(&[10.0, 20.0, 30.0]);
        let set = IndicatorSet::compute(&series, &[2], DEFAULT_MAX_WINDOWS).unwrap();
        assert_eq!(set.get(2).unwrap().label(), "SMA_2");
    }

    #[test]
    fn empty_series_yields_empty_columns() {
        let set =
            IndicatorSet::compute(&PriceSeries::empty(), &[5, 10], DEFAULT_MAX_WINDOWS).unwrap();
        assert!(set.contains(5));
        assert!(set.get(5).unwrap().values.is_empty());
    }

    proptest! {
        // For any series of length n >= w the column has exactly
        // n - w + 1 non-missing values, each the mean of its slice.
        #[test]
        fn sma_warmup_and_slice_means(
            closes in proptest::collection::vec(0.01f64..1000.0, 1..60),
            window in 1usize..20,
        ) {
            let series = make_series(&closes);
            let set = IndicatorSet::compute(&series, &[window], DEFAULT_MAX_WINDOWS).unwrap();
            let column = set.get(window).unwrap();

            prop_assert_eq!(column.values.len(), closes.len());

            let present = column.values.iter().filter(|v| v.is_some()).count();
            let expected = closes.len().saturating_sub(window - 1);
            prop_assert_eq!(present, expected);

            for (i, value) in column.values.iter().enumerate() {
                if let Some(v) = value {
                    let slice = &closes[i + 1 - window..=i];
                    let mean = slice.iter().sum::<f64>() / window as f64;
                    prop_assert!((v - mean).abs() < 1e-6);
                }
            }
        }
    }
}
