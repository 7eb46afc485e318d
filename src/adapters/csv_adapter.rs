//! CSV file data adapter.
//!
//! Reads a headered daily OHLCV file in the shape exported by common
//! market-data downloads: `Date,Open,High,Low,Close[,Adj Close],Volume`.
//! Header matching is case-insensitive; column order does not matter.
//! Rows are returned in file order so that the series validation can
//! catch out-of-order or duplicate dates instead of papering over them
//! with a sort.

use crate::domain::error::SmalabError;
use crate::domain::series::Bar;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use csv::StringRecord;
use std::fs::File;
use std::path::PathBuf;

pub struct CsvAdapter {
    path: PathBuf,
}

struct ColumnIndices {
    date: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    adj_close: Option<usize>,
    volume: usize,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn find_columns(headers: &StringRecord) -> Result<ColumnIndices, SmalabError> {
        let position = |name: &str| -> Option<usize> {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let required = |name: &str| -> Result<usize, SmalabError> {
            position(name).ok_or_else(|| SmalabError::Schema {
                reason: format!("missing required column '{}'", name),
            })
        };

        Ok(ColumnIndices {
            date: required("Date")?,
            open: required("Open")?,
            high: required("High")?,
            low: required("Low")?,
            close: required("Close")?,
            adj_close: position("Adj Close").or_else(|| position("Adj_Close")),
            volume: required("Volume")?,
        })
    }

    fn parse_f64(record: &StringRecord, index: usize, name: &str, row: usize) -> Result<f64, SmalabError> {
        record
            .get(index)
            .ok_or_else(|| SmalabError::Schema {
                reason: format!("row {}: missing {} value", row, name),
            })?
            .trim()
            .parse()
            .map_err(|e| SmalabError::Schema {
                reason: format!("row {}: invalid {} value: {}", row, name, e),
            })
    }
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self) -> Result<Vec<Bar>, SmalabError> {
        let file = File::open(&self.path).map_err(|e| SmalabError::Schema {
            reason: format!("failed to open {}: {}", self.path.display(), e),
        })?;
        let mut rdr = csv::Reader::from_reader(file);

        let headers = rdr.headers().map_err(|e| SmalabError::Schema {
            reason: format!("failed to read CSV header: {}", e),
        })?;
        let columns = Self::find_columns(headers)?;

        let mut bars = Vec::new();
        for (row, result) in rdr.records().enumerate() {
            // row 1 is the first data line, after the header
            let row = row + 1;
            let record = result.map_err(|e| SmalabError::Schema {
                reason: format!("row {}: CSV parse error: {}", row, e),
            })?;

            let date_str = record.get(columns.date).ok_or_else(|| SmalabError::Schema {
                reason: format!("row {}: missing Date value", row),
            })?;
            let date = NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d").map_err(|e| {
                SmalabError::Schema {
                    reason: format!("row {}: invalid date '{}': {}", row, date_str, e),
                }
            })?;

            let adj_close = match columns.adj_close {
                Some(index) => Some(Self::parse_f64(&record, index, "Adj Close", row)?),
                None => None,
            };

            let volume: i64 = record
                .get(columns.volume)
                .ok_or_else(|| SmalabError::Schema {
                    reason: format!("row {}: missing Volume value", row),
                })?
                .trim()
                .parse()
                .map_err(|e| SmalabError::Schema {
                    reason: format!("row {}: invalid Volume value: {}", row, e),
                })?;

            bars.push(Bar {
                date,
                open: Self::parse_f64(&record, columns.open, "Open", row)?,
                high: Self::parse_f64(&record, columns.high, "High", row)?,
                low: Self::parse_f64(&record, columns.low, "Low", row)?,
                close: Self::parse_f64(&record, columns.close, "Close", row)?,
                adj_close,
                volume,
            });
        }

        Ok(bars)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn fetch_bars_reads_standard_file() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "prices.csv",
            "Date,Open,High,Low,Close,Adj Close,Volume\n\
             2024-01-15,100.0,110.0,90.0,105.0,104.0,50000\n\
             2024-01-16,105.0,115.0,100.0,110.0,109.0,60000\n",
        );

        let adapter = CsvAdapter::new(path);
        let bars = adapter.fetch_bars().unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].adj_close, Some(104.0));
        assert_eq!(bars[0].volume, 50000);
    }

    #[test]
    fn fetch_bars_without_adjusted_close() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "prices.csv",
            "Date,Open,High,Low,Close,Volume\n2024-01-15,100.0,110.0,90.0,105.0,50000\n",
        );

        let bars = CsvAdapter::new(path).fetch_bars().unwrap();
        assert_eq!(bars[0].adj_close, None);
    }

    #[test]
    fn fetch_bars_accepts_reordered_lowercase_headers() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "prices.csv",
            "volume,close,low,high,open,date\n50000,105.0,90.0,110.0,100.0,2024-01-15\n",
        );

        let bars = CsvAdapter::new(path).fetch_bars().unwrap();
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].volume, 50000);
    }

    #[test]
    fn missing_column_is_schema_error() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "prices.csv",
            "Date,Open,High,Low,Volume\n2024-01-15,100.0,110.0,90.0,50000\n",
        );

        let result = CsvAdapter::new(path).fetch_bars();
        match result {
            Err(SmalabError::Schema { reason }) => assert!(reason.contains("'Close'")),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn bad_cell_is_schema_error_with_row() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "prices.csv",
            "Date,Open,High,Low,Close,Volume\n\
             2024-01-15,100.0,110.0,90.0,105.0,50000\n\
             2024-01-16,abc,115.0,100.0,110.0,60000\n",
        );

        let result = CsvAdapter::new(path).fetch_bars();
        match result {
            Err(SmalabError::Schema { reason }) => {
                assert!(reason.contains("row 2"));
                assert!(reason.contains("Open"));
            }
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_schema_error() {
        let adapter = CsvAdapter::new(PathBuf::from("/nonexistent/prices.csv"));
        assert!(matches!(
            adapter.fetch_bars(),
            Err(SmalabError::Schema { .. })
        ));
    }

    #[test]
    fn fetch_series_rejects_out_of_order_file() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            dir.path(),
            "prices.csv",
            "Date,Open,High,Low,Close,Volume\n\
             2024-01-16,100.0,110.0,90.0,105.0,50000\n\
             2024-01-15,105.0,115.0,100.0,110.0,60000\n",
        );

        let result = CsvAdapter::new(path).fetch_series();
        assert!(matches!(result, Err(SmalabError::Schema { .. })));
    }

    #[test]
    fn fetch_series_on_header_only_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(dir.path(), "prices.csv", "Date,Open,High,Low,Close,Volume\n");

        let series = CsvAdapter::new(path).fetch_series().unwrap();
        assert!(series.is_empty());
    }
}
