#![allow(dead_code)]

use chrono::NaiveDate;
use ematrend::domain::backtest::BacktestConfig;
use ematrend::domain::error::EmatrendError;
pub use ematrend::domain::ohlcv::OhlcvBar;
use ematrend::domain::policy::PolicyParams;
use ematrend::domain::signal::SignalConfig;
use ematrend::ports::data_port::DataPort;
use std::io::Write;
use tempfile::NamedTempFile;

pub struct MockDataPort {
    pub bars: Vec<OhlcvBar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new(bars: Vec<OhlcvBar>) -> Self {
        Self { bars, error: None }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            bars: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(&self) -> Result<Vec<OhlcvBar>, EmatrendError> {
        if let Some(reason) = &self.error {
            return Err(EmatrendError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.bars.clone())
    }

    fn get_data_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, EmatrendError> {
        if let Some(reason) = &self.error {
            return Err(EmatrendError::Data {
                reason: reason.clone(),
            });
        }
        match (self.bars.first(), self.bars.last()) {
            (Some(first), Some(last)) => Ok(Some((first.date, last.date, self.bars.len()))),
            _ => Ok(None),
        }
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn make_bar(date: &str, close: f64) -> OhlcvBar {
    OhlcvBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open: close - 1.0,
        high: close + 1.0,
        low: close - 2.0,
        close,
        volume: 1000,
    }
}

pub fn make_ohlc(date: &str, open: f64, high: f64, low: f64, close: f64) -> OhlcvBar {
    OhlcvBar {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        open,
        high,
        low,
        close,
        volume: 1000,
    }
}

/// Linearly rising series starting at `start_price`, one bar per day.
pub fn uptrend_bars(start_date: &str, count: usize, start_price: f64, step: f64) -> Vec<OhlcvBar> {
    let start = NaiveDate::parse_from_str(start_date, "%Y-%m-%d").unwrap();
    (0..count)
        .map(|i| {
            let close = start_price + i as f64 * step;
            OhlcvBar {
                date: start + chrono::Duration::days(i as i64),
                open: close - 1.0,
                high: close + 1.0,
                low: close - 2.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Short EMA lengths so signals fire without hundreds of warm-up bars.
pub fn short_signal_config() -> SignalConfig {
    SignalConfig {
        ema_fast: 2,
        ema_mid: 3,
        ema_slow: 4,
    }
}

pub fn sample_params() -> PolicyParams {
    PolicyParams::default()
}

pub fn sample_bt_config() -> BacktestConfig {
    BacktestConfig {
        initial_cash: 10_000.0,
        commission_per_trade: 0.0,
        commission_pct: 0.0,
        risk_free_rate: 0.0,
    }
}

/// Write bars to a temp CSV in the format CsvAdapter reads.
pub fn write_csv(bars: &[OhlcvBar]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,open,high,low,close,volume").unwrap();
    for bar in bars {
        writeln!(
            file,
            "{},{},{},{},{},{}",
            bar.date, bar.open, bar.high, bar.low, bar.close, bar.volume
        )
        .unwrap();
    }
    file.flush().unwrap();
    file
}
