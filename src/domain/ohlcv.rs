//! OHLCV bar representation and series validation.

use chrono::NaiveDate;

use crate::domain::error::EmatrendError;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    /// Intrabar range as a fraction of the close. Used by the trailing-stop
    /// volatility gate.
    pub fn range_ratio(&self) -> f64 {
        if self.close > 0.0 {
            (self.high - self.low) / self.close
        } else {
            0.0
        }
    }
}

/// Validate a bar series before any strategy logic runs.
///
/// Indicators are path-dependent, so ordering errors must be caught at load
/// time rather than surfacing as silently wrong signals.
pub fn validate_bars(bars: &[OhlcvBar]) -> Result<(), EmatrendError> {
    for (i, bar) in bars.iter().enumerate() {
        if bar.high < bar.low {
            return Err(EmatrendError::InvalidBar {
                date: bar.date,
                reason: format!("high {} below low {}", bar.high, bar.low),
            });
        }
        if bar.close <= 0.0 || bar.open <= 0.0 {
            return Err(EmatrendError::InvalidBar {
                date: bar.date,
                reason: "non-positive price".into(),
            });
        }
        if i > 0 && bar.date <= bars[i - 1].date {
            return Err(EmatrendError::NonIncreasingDates {
                prev: bars[i - 1].date,
                next: bar.date,
            });
        }
    }
    Ok(())
}
