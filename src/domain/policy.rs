//! Per-bar position management policies.
//!
//! The three policies share one entry/exit skeleton (FLAT → LONG → FLAT,
//! long only, at most one position) and differ in stop placement, sizing and
//! ratchet behavior:
//!
//! - [`RiskPolicy::FullCapital`]: deploy all equity on signal, no stop.
//! - [`RiskPolicy::FixedStop`]: ATR stop fixed at entry, size capped so a
//!   stop-out loses at most `risk_percent` of equity.
//! - [`RiskPolicy::TrailingStop`]: ATR stop ratcheted upward every bar,
//!   entries gated on intrabar volatility.
//!
//! A policy is a read-only function of the bar snapshot: it emits orders and
//! never touches portfolio state. The closed set of variants is deliberate;
//! there is no plugin registration.

use crate::domain::error::EmatrendError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::position::Position;

/// Setup-time parameters shared by the policies. Fixed once a run starts.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyParams {
    pub atr_period: usize,
    pub fixed_atr_multiplier: f64,
    pub trailing_atr_multiplier: f64,
    /// Percent of equity risked per fixed-stop entry (1.0 = 1%).
    pub risk_percent: f64,
    /// Max (high - low) / close allowed for a trailing-stop entry.
    pub volatility_cap: f64,
    /// When false, full-equity entries are floored to whole units.
    pub allow_fractional_size: bool,
}

impl Default for PolicyParams {
    fn default() -> Self {
        PolicyParams {
            atr_period: 14,
            fixed_atr_multiplier: 2.0,
            trailing_atr_multiplier: 3.0,
            risk_percent: 1.0,
            volatility_cap: 0.02,
            allow_fractional_size: false,
        }
    }
}

/// Read-only snapshot handed to a policy once per bar.
#[derive(Debug, Clone)]
pub struct BarContext<'a> {
    pub bar: &'a OhlcvBar,
    pub signal: u8,
    /// Current ATR, `None` during indicator warm-up.
    pub atr: Option<f64>,
    /// Account equity (cash + open position marked to this bar's close).
    pub equity: f64,
    pub position: Option<&'a Position>,
}

/// An order emitted by a policy, applied by the backtest engine.
///
/// `RaiseStop` carries a desired *minimum* stop; the engine ratchets the
/// attached stop to `max(existing, desired)` so the monotonicity invariant
/// is enforced in exactly one place.
#[derive(Debug, Clone, PartialEq)]
pub enum Order {
    Enter { quantity: f64, stop: Option<f64> },
    Exit,
    RaiseStop { desired: f64 },
}

/// The three risk-management variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskPolicy {
    FullCapital,
    FixedStop,
    TrailingStop,
}

impl RiskPolicy {
    pub fn parse(name: &str) -> Result<Self, EmatrendError> {
        match name.trim().to_lowercase().as_str() {
            "full" | "full_capital" => Ok(RiskPolicy::FullCapital),
            "fixed" | "fixed_stop" => Ok(RiskPolicy::FixedStop),
            "trailing" | "trailing_stop" => Ok(RiskPolicy::TrailingStop),
            other => Err(EmatrendError::UnknownPolicy { name: other.into() }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RiskPolicy::FullCapital => "full-capital",
            RiskPolicy::FixedStop => "fixed-stop",
            RiskPolicy::TrailingStop => "trailing-stop",
        }
    }

    /// Decide what to do on this bar.
    ///
    /// Returns at most two orders; when a stop update and an exit occur on
    /// the same bar the `RaiseStop` comes first, so the position is
    /// protected before it is closed. Entry and exit can never co-occur:
    /// entries require a flat account, exits an open position, and the
    /// snapshot does not change mid-decision.
    pub fn decide(&self, ctx: &BarContext<'_>, params: &PolicyParams) -> Vec<Order> {
        match self {
            RiskPolicy::FullCapital => self.decide_full_capital(ctx, params),
            RiskPolicy::FixedStop => self.decide_fixed_stop(ctx, params),
            RiskPolicy::TrailingStop => self.decide_trailing_stop(ctx, params),
        }
    }

    fn decide_full_capital(&self, ctx: &BarContext<'_>, params: &PolicyParams) -> Vec<Order> {
        if ctx.signal == 1 && ctx.position.is_none() {
            let quantity = full_equity_size(ctx.equity, ctx.bar.close, params);
            if quantity > 0.0 {
                return vec![Order::Enter {
                    quantity,
                    stop: None,
                }];
            }
        } else if ctx.signal == 0 && ctx.position.is_some() {
            return vec![Order::Exit];
        }
        vec![]
    }

    fn decide_fixed_stop(&self, ctx: &BarContext<'_>, params: &PolicyParams) -> Vec<Order> {
        if ctx.signal == 1 && ctx.position.is_none() {
            // ATR undefined or zero: no stop distance, skip the entry
            // rather than divide by zero.
            let Some(atr) = ctx.atr.filter(|a| *a > 0.0) else {
                return vec![];
            };
            let close = ctx.bar.close;
            let stop = close - params.fixed_atr_multiplier * atr;
            let risk_per_unit = close - stop;
            if risk_per_unit <= 0.0 {
                return vec![];
            }

            let equity_risk = ctx.equity * (params.risk_percent / 100.0);
            // Risk cap, bounded by what equity can actually buy. The risk
            // formula yields a fractional quantity by construction.
            let quantity = (equity_risk / risk_per_unit).min(ctx.equity / close);
            if quantity > 0.0 {
                return vec![Order::Enter {
                    quantity,
                    stop: Some(stop),
                }];
            }
        } else if ctx.signal == 0 && ctx.position.is_some() {
            // Unconditional exit on signal loss; the fixed stop itself is
            // never adjusted after entry.
            return vec![Order::Exit];
        }
        vec![]
    }

    fn decide_trailing_stop(&self, ctx: &BarContext<'_>, params: &PolicyParams) -> Vec<Order> {
        let mut orders = Vec::with_capacity(2);

        if ctx.position.is_some() {
            // Stop update first: the position gets protected even on the
            // bar it is closed. ATR warm-up makes this a no-op.
            if let Some(atr) = ctx.atr {
                orders.push(Order::RaiseStop {
                    desired: ctx.bar.close - params.trailing_atr_multiplier * atr,
                });
            }
            if ctx.signal == 0 {
                orders.push(Order::Exit);
            }
        } else if ctx.signal == 1 && ctx.bar.range_ratio() <= params.volatility_cap {
            let Some(atr) = ctx.atr else {
                return orders;
            };
            let close = ctx.bar.close;
            let quantity = full_equity_size(ctx.equity, close, params);
            if quantity > 0.0 {
                orders.push(Order::Enter {
                    quantity,
                    stop: Some(close - params.trailing_atr_multiplier * atr),
                });
            }
        }

        orders
    }
}

/// Size an entry that deploys all available equity at `price`.
fn full_equity_size(equity: f64, price: f64, params: &PolicyParams) -> f64 {
    if price <= 0.0 || equity <= 0.0 {
        return 0.0;
    }
    let quantity = equity / price;
    if params.allow_fractional_size {
        quantity
    } else {
        quantity.floor()
    }
}
