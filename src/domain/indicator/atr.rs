//! Average True Range indicator.
//!
//! TR[0] = high - low; TR[i] = max(high-low, |high-prev_close|, |low-prev_close|).
//! Seed with the SMA of the first `period` true ranges, then Wilder smoothing:
//! ATR[i] = (ATR[i-1] * (period-1) + TR[i]) / period.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_atr(bars: &[OhlcvBar], period: usize) -> IndicatorSeries {
    if period == 0 || bars.is_empty() {
        return IndicatorSeries {
            indicator_type: IndicatorType::Atr(period),
            values: Vec::new(),
        };
    }

    let mut tr_values: Vec<f64> = Vec::with_capacity(bars.len());
    for (i, bar) in bars.iter().enumerate() {
        let tr = if i == 0 {
            bar.high - bar.low
        } else {
            bar.true_range(bars[i - 1].close)
        };
        tr_values.push(tr);
    }

    let mut values: Vec<IndicatorPoint> = Vec::with_capacity(bars.len());
    let mut atr = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        if i < period - 1 {
            values.push(IndicatorPoint {
                date: bar.date,
                valid: false,
                value: 0.0,
            });
        } else if i == period - 1 {
            atr = tr_values[0..=i].iter().sum::<f64>() / period as f64;
            values.push(IndicatorPoint {
                date: bar.date,
                valid: true,
                value: atr,
            });
        } else {
            atr = (atr * (period - 1) as f64 + tr_values[i]) / period as f64;
            values.push(IndicatorPoint {
                date: bar.date,
                valid: true,
                value: atr,
            });
        }
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Atr(period),
        values,
    }
}
