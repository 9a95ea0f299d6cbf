//! Backtest engine and bar loop.
//!
//! The engine owns all mutable account state. Per bar, strictly in order:
//! check the resting stop against the bar's range, snapshot equity, ask the
//! policy for orders, apply them, record the equity curve point. One bar is
//! fully settled before the next is considered, so decisions depend on the
//! position/equity state left by the previous bar.

use crate::domain::error::EmatrendError;
use crate::domain::execution::{
    check_stop_trigger, enter_long, exit_position, ExecutionConfig,
};
use crate::domain::indicator::IndicatorSeries;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::policy::{BarContext, Order, PolicyParams, RiskPolicy};
use crate::domain::portfolio::Portfolio;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_cash: f64,
    pub commission_per_trade: f64,
    pub commission_pct: f64,
    pub risk_free_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_cash: 10_000.0,
            commission_per_trade: 0.0,
            commission_pct: 0.0,
            risk_free_rate: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub portfolio: Portfolio,
    pub bars_processed: usize,
}

/// Run one policy over a pre-annotated series.
///
/// `signals` and `atr` must be aligned 1:1 with `bars` (the signal generator
/// and indicator layer produce them that way). An open position at the end
/// of data stays open; the final equity point marks it to the last close.
pub fn run_backtest(
    bars: &[OhlcvBar],
    signals: &[u8],
    atr: &IndicatorSeries,
    policy: RiskPolicy,
    params: &PolicyParams,
    config: &BacktestConfig,
) -> Result<BacktestResult, EmatrendError> {
    if signals.len() != bars.len() {
        return Err(EmatrendError::Data {
            reason: format!(
                "signal series length {} does not match {} bars",
                signals.len(),
                bars.len()
            ),
        });
    }
    if atr.len() != bars.len() {
        return Err(EmatrendError::Data {
            reason: format!(
                "ATR series length {} does not match {} bars",
                atr.len(),
                bars.len()
            ),
        });
    }

    let exec_config = ExecutionConfig {
        commission_per_trade: config.commission_per_trade,
        commission_pct: config.commission_pct,
    };
    let mut portfolio = Portfolio::new(config.initial_cash);

    for (i, bar) in bars.iter().enumerate() {
        // Intrabar stop fill happens before the close-of-bar decision.
        check_stop_trigger(&mut portfolio, bar.open, bar.low, bar.date, &exec_config);

        let equity = portfolio.total_equity(bar.close);
        let ctx = BarContext {
            bar,
            signal: signals[i],
            atr: atr.value_at(i),
            equity,
            position: portfolio.position.as_ref(),
        };
        let orders = policy.decide(&ctx, params);

        for order in orders {
            match order {
                Order::RaiseStop { desired } => {
                    if let Some(position) = portfolio.position.as_mut() {
                        position.raise_stop(desired);
                    }
                }
                Order::Enter { quantity, stop } => {
                    enter_long(
                        &mut portfolio,
                        quantity,
                        bar.close,
                        bar.date,
                        stop,
                        &exec_config,
                    );
                }
                Order::Exit => {
                    exit_position(&mut portfolio, bar.close, bar.date, &exec_config);
                }
            }
        }

        portfolio.record_equity(bar.date, portfolio.total_equity(bar.close));
    }

    Ok(BacktestResult {
        portfolio,
        bars_processed: bars.len(),
    })
}
