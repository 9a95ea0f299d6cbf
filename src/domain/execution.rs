//! Order execution and fill simulation.
//!
//! Applies policy orders to the portfolio: entry cost and commission
//! deduction, exit proceeds, and engine-side stop trigger checking.

use chrono::NaiveDate;

use super::portfolio::Portfolio;
use super::position::{ClosedTrade, Position};

/// Commission model shared by all policies.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    pub commission_per_trade: f64,
    pub commission_pct: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            commission_per_trade: 0.0,
            commission_pct: 0.0,
        }
    }
}

/// flat_fee + (trade_value * pct / 100)
pub fn calculate_commission(trade_value: f64, config: &ExecutionConfig) -> f64 {
    config.commission_per_trade + (trade_value * config.commission_pct / 100.0)
}

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered { cost: f64, commission: f64 },
    InsufficientCash,
    AlreadyInPosition,
}

/// Open a long position at `price` with an optional protective stop.
///
/// The policy already sized the order from its equity snapshot; the engine
/// still refuses fills the cash cannot cover (commission can tip a
/// full-equity entry over), skipping silently rather than erroring.
pub fn enter_long(
    portfolio: &mut Portfolio,
    quantity: f64,
    price: f64,
    date: NaiveDate,
    stop: Option<f64>,
    config: &ExecutionConfig,
) -> EntryResult {
    if portfolio.has_position() {
        return EntryResult::AlreadyInPosition;
    }

    let cost = quantity * price;
    let commission = calculate_commission(cost, config);
    let total_cost = cost + commission;

    if quantity <= 0.0 || total_cost > portfolio.cash {
        return EntryResult::InsufficientCash;
    }

    portfolio.cash -= total_cost;
    portfolio.position = Some(Position {
        quantity,
        entry_price: price,
        entry_date: date,
        stop,
    });

    EntryResult::Entered { cost, commission }
}

/// Result of an exit.
#[derive(Debug, Clone, PartialEq)]
pub struct ExitResult {
    pub exit_price: f64,
    pub pnl: f64,
}

/// Close the open position at `price`, recording the trade.
pub fn exit_position(
    portfolio: &mut Portfolio,
    price: f64,
    exit_date: NaiveDate,
    config: &ExecutionConfig,
) -> Option<ExitResult> {
    let position = portfolio.position.take()?;

    let exit_value = position.quantity * price;
    let exit_commission = calculate_commission(exit_value, config);
    let pnl = position.quantity * (price - position.entry_price) - exit_commission;

    portfolio.cash += exit_value - exit_commission;

    let trade = ClosedTrade {
        quantity: position.quantity,
        entry_price: position.entry_price,
        exit_price: price,
        entry_date: position.entry_date,
        exit_date,
        pnl,
    };
    portfolio.record_trade(trade);

    Some(ExitResult {
        exit_price: price,
        pnl,
    })
}

/// Check the open position's stop against the bar's low and close it at the
/// stop fill if the bar traded through it.
///
/// Fill price is the stop itself, or the bar's open when the bar gapped
/// below the stop (a resting stop cannot fill above the open).
pub fn check_stop_trigger(
    portfolio: &mut Portfolio,
    bar_open: f64,
    bar_low: f64,
    date: NaiveDate,
    config: &ExecutionConfig,
) -> Option<ExitResult> {
    let stop = {
        let position = portfolio.position.as_ref()?;
        if !position.should_stop_out(bar_low) {
            return None;
        }
        position.stop?
    };

    let fill = if bar_open < stop { bar_open } else { stop };
    exit_position(portfolio, fill, date, config)
}
