//! CSV file data adapter.
//!
//! Expects a header row and columns date,open,high,low,close,volume with
//! ISO dates. Bars are sorted by date and validated before they reach the
//! domain.

use crate::domain::error::EmatrendError;
use crate::domain::ohlcv::{validate_bars, OhlcvBar};
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn parse_field<T: std::str::FromStr>(
        record: &csv::StringRecord,
        index: usize,
        name: &str,
    ) -> Result<T, EmatrendError>
    where
        T::Err: std::fmt::Display,
    {
        let raw = record.get(index).ok_or_else(|| EmatrendError::Data {
            reason: format!("missing {name} column"),
        })?;
        raw.parse().map_err(|e| EmatrendError::Data {
            reason: format!("invalid {name} value '{raw}': {e}"),
        })
    }
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(&self) -> Result<Vec<OhlcvBar>, EmatrendError> {
        let content = fs::read_to_string(&self.path).map_err(|e| EmatrendError::Data {
            reason: format!("failed to read {}: {}", self.path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| EmatrendError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| EmatrendError::Data {
                reason: "missing date column".into(),
            })?;
            let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                EmatrendError::Data {
                    reason: format!("invalid date '{date_str}': {e}"),
                }
            })?;

            bars.push(OhlcvBar {
                date,
                open: Self::parse_field(&record, 1, "open")?,
                high: Self::parse_field(&record, 2, "high")?,
                low: Self::parse_field(&record, 3, "low")?,
                close: Self::parse_field(&record, 4, "close")?,
                volume: Self::parse_field(&record, 5, "volume")?,
            });
        }

        bars.sort_by_key(|b| b.date);
        validate_bars(&bars)?;
        Ok(bars)
    }

    fn get_data_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, EmatrendError> {
        let bars = self.fetch_ohlcv()?;
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }
}
