//! Position tracking and the stop ratchet.

use chrono::NaiveDate;

/// A single open long position. At most one exists per run (no pyramiding,
/// no shorting).
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub quantity: f64,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
    pub stop: Option<f64>,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity * price
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.quantity * (price - self.entry_price)
    }

    /// Raise the protective stop to `desired` if that tightens it.
    ///
    /// This is the single enforcement point of the ratchet invariant: the
    /// stop is monotonically non-decreasing for the life of the position.
    /// Policies only ever propose a desired minimum; they never see, let
    /// alone lower, the attached stop.
    pub fn raise_stop(&mut self, desired: f64) {
        match self.stop {
            Some(current) if desired <= current => {}
            _ => self.stop = Some(desired),
        }
    }

    /// Whether the bar trades through the stop.
    pub fn should_stop_out(&self, bar_low: f64) -> bool {
        match self.stop {
            Some(stop) => bar_low <= stop,
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub quantity: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub pnl: f64,
}
