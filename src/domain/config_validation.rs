//! Configuration validation.
//!
//! Validates all config fields before a backtest runs, so bad values fail
//! fast instead of surfacing mid-simulation.

use crate::domain::error::EmatrendError;
use crate::domain::policy::RiskPolicy;
use crate::ports::config_port::ConfigPort;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), EmatrendError> {
    validate_initial_cash(config)?;
    validate_commission(config)?;
    validate_risk_free_rate(config)?;
    Ok(())
}

pub fn validate_risk_config(config: &dyn ConfigPort) -> Result<(), EmatrendError> {
    validate_atr_period(config)?;
    validate_multipliers(config)?;
    validate_risk_percent(config)?;
    validate_volatility_cap(config)?;
    validate_policy_name(config)?;
    Ok(())
}

pub fn validate_signal_config(config: &dyn ConfigPort) -> Result<(), EmatrendError> {
    let fast = config.get_int("signal", "ema_fast", 20);
    let mid = config.get_int("signal", "ema_mid", 60);
    let slow = config.get_int("signal", "ema_slow", 120);

    for (key, value) in [("ema_fast", fast), ("ema_mid", mid), ("ema_slow", slow)] {
        if value <= 0 {
            return Err(EmatrendError::ConfigInvalid {
                section: "signal".into(),
                key: key.into(),
                reason: format!("{key} must be positive"),
            });
        }
    }

    if !(fast < mid && mid < slow) {
        return Err(EmatrendError::ConfigInvalid {
            section: "signal".into(),
            key: "ema_fast".into(),
            reason: format!(
                "EMA lengths must be strictly ordered fast < mid < slow, got {fast}/{mid}/{slow}"
            ),
        });
    }
    Ok(())
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), EmatrendError> {
    let value = config.get_double("backtest", "initial_cash", 10_000.0);
    if value <= 0.0 {
        return Err(EmatrendError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_cash".to_string(),
            reason: "initial_cash must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_commission(config: &dyn ConfigPort) -> Result<(), EmatrendError> {
    let per_trade = config.get_double("backtest", "commission_per_trade", 0.0);
    if per_trade < 0.0 {
        return Err(EmatrendError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "commission_per_trade".to_string(),
            reason: "commission_per_trade must be non-negative".to_string(),
        });
    }
    let pct = config.get_double("backtest", "commission_pct", 0.0);
    if pct < 0.0 {
        return Err(EmatrendError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "commission_pct".to_string(),
            reason: "commission_pct must be non-negative".to_string(),
        });
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), EmatrendError> {
    let value = config.get_double("backtest", "risk_free_rate", 0.0);
    if !(0.0..1.0).contains(&value) {
        return Err(EmatrendError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "risk_free_rate".to_string(),
            reason: "risk_free_rate must be in [0, 1)".to_string(),
        });
    }
    Ok(())
}

fn validate_atr_period(config: &dyn ConfigPort) -> Result<(), EmatrendError> {
    let value = config.get_int("risk", "atr_period", 14);
    if value <= 0 {
        return Err(EmatrendError::ConfigInvalid {
            section: "risk".to_string(),
            key: "atr_period".to_string(),
            reason: "atr_period must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_multipliers(config: &dyn ConfigPort) -> Result<(), EmatrendError> {
    for key in ["fixed_atr_multiplier", "trailing_atr_multiplier"] {
        let default = if key.starts_with("fixed") { 2.0 } else { 3.0 };
        let value = config.get_double("risk", key, default);
        if value <= 0.0 {
            return Err(EmatrendError::ConfigInvalid {
                section: "risk".to_string(),
                key: key.to_string(),
                reason: format!("{key} must be positive"),
            });
        }
    }
    Ok(())
}

fn validate_risk_percent(config: &dyn ConfigPort) -> Result<(), EmatrendError> {
    let value = config.get_double("risk", "risk_percent", 1.0);
    if value <= 0.0 || value > 100.0 {
        return Err(EmatrendError::ConfigInvalid {
            section: "risk".to_string(),
            key: "risk_percent".to_string(),
            reason: "risk_percent must be in (0, 100]".to_string(),
        });
    }
    Ok(())
}

fn validate_volatility_cap(config: &dyn ConfigPort) -> Result<(), EmatrendError> {
    let value = config.get_double("risk", "volatility_cap", 0.02);
    if value <= 0.0 {
        return Err(EmatrendError::ConfigInvalid {
            section: "risk".to_string(),
            key: "volatility_cap".to_string(),
            reason: "volatility_cap must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_policy_name(config: &dyn ConfigPort) -> Result<(), EmatrendError> {
    if let Some(name) = config.get_string("risk", "policy") {
        RiskPolicy::parse(&name)?;
    }
    Ok(())
}
