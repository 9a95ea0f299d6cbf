//! Technical indicator series types.
//!
//! Indicators are pure transforms `(bars, period) -> series`, aligned 1:1
//! with the input bars. A point is marked invalid during the warm-up window
//! (first `period - 1` bars) where the lookback has insufficient history;
//! consumers must treat invalid points as "undefined", never as zero.

pub mod atr;
pub mod ema;

use chrono::NaiveDate;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub valid: bool,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Atr(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value at bar index `i`, or `None` during warm-up / out of range.
    pub fn value_at(&self, i: usize) -> Option<f64> {
        self.values
            .get(i)
            .filter(|p| p.valid)
            .map(|p| p.value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
        }
    }
}
