//! Performance metrics for a completed run.

use super::portfolio::{EquityPoint, Portfolio};

const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    /// Total return as a fraction (0.10 = +10%).
    pub total_return: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown: f64,
    pub trades_won: usize,
    pub trades_lost: usize,
    pub win_rate: f64,
}

impl Metrics {
    pub fn compute(portfolio: &Portfolio, risk_free_rate: f64) -> Self {
        let equity_curve = &portfolio.equity_curve;
        let initial_capital = portfolio.initial_capital;

        let final_equity = equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(initial_capital);

        let total_return = if initial_capital > 0.0 {
            (final_equity - initial_capital) / initial_capital
        } else {
            0.0
        };

        let trading_days = equity_curve.len() as f64;
        let years = trading_days / TRADING_DAYS_PER_YEAR;
        let annualized_return = if years > 0.0 && total_return.is_finite() && total_return > -1.0 {
            (1.0 + total_return).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let max_drawdown = compute_drawdown(equity_curve);

        let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;
        let sharpe_ratio = compute_sharpe(equity_curve, daily_rf);

        let mut trades_won = 0usize;
        let mut trades_lost = 0usize;
        for trade in &portfolio.closed_trades {
            if trade.pnl > 0.0 {
                trades_won += 1;
            } else if trade.pnl < 0.0 {
                trades_lost += 1;
            }
        }
        let total_trades = portfolio.closed_trades.len();
        let win_rate = if total_trades > 0 {
            trades_won as f64 / total_trades as f64
        } else {
            0.0
        };

        Metrics {
            total_return,
            annualized_return,
            sharpe_ratio,
            max_drawdown,
            trades_won,
            trades_lost,
            win_rate,
        }
    }
}

fn compute_drawdown(equity_curve: &[EquityPoint]) -> f64 {
    if equity_curve.is_empty() {
        return 0.0;
    }

    let mut peak = equity_curve[0].equity;
    let mut max_dd = 0.0_f64;

    for point in equity_curve {
        if point.equity > peak {
            peak = point.equity;
        } else if peak > 0.0 {
            let dd = (peak - point.equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

fn compute_sharpe(equity_curve: &[EquityPoint], daily_rf: f64) -> f64 {
    if equity_curve.len() < 2 {
        return 0.0;
    }

    let returns: Vec<f64> = equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0].equity;
            let curr = w[1].equity;
            if prev > 0.0 { (curr - prev) / prev } else { 0.0 }
        })
        .collect();

    let n = returns.len() as f64;
    let mean: f64 = returns.iter().sum::<f64>() / n;
    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    if stddev > 0.0 {
        ((mean - daily_rf) / stddev) * TRADING_DAYS_PER_YEAR.sqrt()
    } else {
        0.0
    }
}
