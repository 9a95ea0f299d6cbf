//! Long/flat signal generation from EMA alignment.
//!
//! Signal(bar) = 1 iff EMA(fast) > EMA(mid), EMA(mid) > EMA(slow) and
//! close > EMA(fast), all strict. Any EMA still in warm-up forces 0: an
//! undefined indicator value can never produce a long signal.

use crate::domain::indicator::ema::calculate_ema;
use crate::domain::ohlcv::OhlcvBar;

#[derive(Debug, Clone, PartialEq)]
pub struct SignalConfig {
    pub ema_fast: usize,
    pub ema_mid: usize,
    pub ema_slow: usize,
}

impl Default for SignalConfig {
    fn default() -> Self {
        SignalConfig {
            ema_fast: 20,
            ema_mid: 60,
            ema_slow: 120,
        }
    }
}

/// Compute the per-bar long/flat signal for a series.
///
/// Pure function of the bars: each signal depends only on the EMAs and close
/// at its own index, so perturbing a later bar never changes an earlier
/// signal, and re-running on identical input is bit-identical.
pub fn generate_signal(bars: &[OhlcvBar], config: &SignalConfig) -> Vec<u8> {
    let fast = calculate_ema(bars, config.ema_fast);
    let mid = calculate_ema(bars, config.ema_mid);
    let slow = calculate_ema(bars, config.ema_slow);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            match (fast.value_at(i), mid.value_at(i), slow.value_at(i)) {
                (Some(f), Some(m), Some(s)) => {
                    u8::from(f > m && m > s && bar.close > f)
                }
                _ => 0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_bars(prices: &[f64]) -> Vec<OhlcvBar> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| OhlcvBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect()
    }

    fn short_config() -> SignalConfig {
        SignalConfig {
            ema_fast: 2,
            ema_mid: 3,
            ema_slow: 5,
        }
    }

    #[test]
    fn signal_zero_during_warmup() {
        // Strong uptrend, but the slow EMA needs 5 bars
        let bars = make_bars(&[10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0]);
        let signals = generate_signal(&bars, &short_config());

        assert_eq!(signals.len(), bars.len());
        for signal in &signals[0..4] {
            assert_eq!(*signal, 0);
        }
    }

    #[test]
    fn signal_one_in_sustained_uptrend() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 5.0).collect();
        let bars = make_bars(&prices);
        let signals = generate_signal(&bars, &short_config());

        // Once all EMAs are defined, a monotone rise keeps fast > mid > slow
        // and close above fast.
        for signal in &signals[5..] {
            assert_eq!(*signal, 1);
        }
    }

    #[test]
    fn signal_zero_when_emas_equal() {
        // Flat prices: all EMAs converge on the price, close == EMA.
        // Strict inequality required, so the signal must stay 0.
        let bars = make_bars(&[100.0; 20]);
        let signals = generate_signal(&bars, &short_config());

        for signal in &signals {
            assert_eq!(*signal, 0);
        }
    }

    #[test]
    fn signal_zero_in_downtrend() {
        let prices: Vec<f64> = (0..30).map(|i| 300.0 - i as f64 * 5.0).collect();
        let bars = make_bars(&prices);
        let signals = generate_signal(&bars, &short_config());

        for signal in &signals {
            assert_eq!(*signal, 0);
        }
    }

    #[test]
    fn signal_values_are_binary() {
        let prices: Vec<f64> = (0..50)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 20.0 + i as f64)
            .collect();
        let bars = make_bars(&prices);
        let signals = generate_signal(&bars, &short_config());

        for signal in &signals {
            assert!(*signal == 0 || *signal == 1);
        }
    }

    #[test]
    fn signal_idempotent() {
        let prices: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 1.3).sin() * 10.0).collect();
        let bars = make_bars(&prices);
        let first = generate_signal(&bars, &short_config());
        let second = generate_signal(&bars, &short_config());
        assert_eq!(first, second);
    }

    #[test]
    fn signal_no_lookahead() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + i as f64 * 2.0).collect();
        let bars = make_bars(&prices);
        let baseline = generate_signal(&bars, &short_config());

        // Crash the last bar: signals before it must not move.
        let mut perturbed = bars.clone();
        let last = perturbed.len() - 1;
        perturbed[last].close = 1.0;
        perturbed[last].open = 1.0;
        perturbed[last].high = 1.0;
        perturbed[last].low = 1.0;
        let changed = generate_signal(&perturbed, &short_config());

        assert_eq!(baseline[..last], changed[..last]);
    }

    #[test]
    fn signal_empty_series() {
        let signals = generate_signal(&[], &SignalConfig::default());
        assert!(signals.is_empty());
    }

    #[test]
    fn default_lengths() {
        let config = SignalConfig::default();
        assert_eq!(config.ema_fast, 20);
        assert_eq!(config.ema_mid, 60);
        assert_eq!(config.ema_slow, 120);
    }
}
