//! Portfolio state and equity tracking.

use chrono::NaiveDate;

use super::position::{ClosedTrade, Position};

#[derive(Debug, Clone, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

/// Account state owned by the backtest engine. Policies read a snapshot of
/// it each bar and influence it only through the orders they emit.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_capital: f64,
    pub position: Option<Position>,
    pub closed_trades: Vec<ClosedTrade>,
    pub equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            initial_capital,
            position: None,
            closed_trades: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn has_position(&self) -> bool {
        self.position.is_some()
    }

    pub fn record_trade(&mut self, trade: ClosedTrade) {
        self.closed_trades.push(trade);
    }

    pub fn record_equity(&mut self, date: NaiveDate, equity: f64) {
        self.equity_curve.push(EquityPoint { date, equity });
    }

    /// Cash plus open position marked to `price`.
    pub fn total_equity(&self, price: f64) -> f64 {
        let position_value = self
            .position
            .as_ref()
            .map(|pos| pos.market_value(price))
            .unwrap_or(0.0);
        self.cash + position_value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_position(quantity: f64) -> Position {
        Position {
            quantity,
            entry_price: 100.0,
            entry_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            stop: None,
        }
    }

    #[test]
    fn new_portfolio() {
        let portfolio = Portfolio::new(10_000.0);
        assert!((portfolio.cash - 10_000.0).abs() < f64::EPSILON);
        assert!((portfolio.initial_capital - 10_000.0).abs() < f64::EPSILON);
        assert!(portfolio.position.is_none());
        assert!(portfolio.closed_trades.is_empty());
        assert!(portfolio.equity_curve.is_empty());
    }

    #[test]
    fn has_position() {
        let mut portfolio = Portfolio::new(10_000.0);
        assert!(!portfolio.has_position());
        portfolio.position = Some(sample_position(50.0));
        assert!(portfolio.has_position());
    }

    #[test]
    fn record_equity() {
        let mut portfolio = Portfolio::new(10_000.0);
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();

        portfolio.record_equity(date, 10_500.0);
        assert_eq!(portfolio.equity_curve.len(), 1);
        assert_eq!(portfolio.equity_curve[0].date, date);
        assert!((portfolio.equity_curve[0].equity - 10_500.0).abs() < f64::EPSILON);
    }

    #[test]
    fn total_equity_no_position() {
        let portfolio = Portfolio::new(10_000.0);
        assert!((portfolio.total_equity(110.0) - 10_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn total_equity_marks_to_market() {
        let mut portfolio = Portfolio::new(10_000.0);
        portfolio.position = Some(sample_position(100.0));
        portfolio.cash = 0.0;

        assert!((portfolio.total_equity(150.0) - 15_000.0).abs() < f64::EPSILON);
    }
}
