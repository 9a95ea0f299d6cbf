//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{run_backtest, BacktestConfig, BacktestResult};
use crate::domain::config_validation::{
    validate_backtest_config, validate_risk_config, validate_signal_config,
};
use crate::domain::error::EmatrendError;
use crate::domain::indicator::atr::calculate_atr;
use crate::domain::metrics::Metrics;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::policy::{PolicyParams, RiskPolicy};
use crate::domain::signal::{generate_signal, SignalConfig};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "ematrend", about = "EMA trend strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest with one risk policy
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// CSV price file (overrides [backtest] data_path)
        #[arg(long)]
        data: Option<PathBuf>,
        /// Risk policy: full, fixed or trailing (overrides [risk] policy)
        #[arg(short, long)]
        policy: Option<String>,
    },
    /// Run all three risk policies over the same series
    Compare {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show bar count and date range for a price file
    Info {
        #[arg(long)]
        data: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data,
            policy,
        } => run_backtest_command(&config, data.as_ref(), policy.as_deref()),
        Command::Compare { config, data } => run_compare(&config, data.as_ref()),
        Command::Validate { config } => run_validate(&config),
        Command::Info { data } => run_info(&data),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = EmatrendError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> BacktestConfig {
    BacktestConfig {
        initial_cash: adapter.get_double("backtest", "initial_cash", 10_000.0),
        commission_per_trade: adapter.get_double("backtest", "commission_per_trade", 0.0),
        commission_pct: adapter.get_double("backtest", "commission_pct", 0.0),
        risk_free_rate: adapter.get_double("backtest", "risk_free_rate", 0.0),
    }
}

pub fn build_policy_params(adapter: &dyn ConfigPort) -> PolicyParams {
    PolicyParams {
        atr_period: adapter.get_int("risk", "atr_period", 14) as usize,
        fixed_atr_multiplier: adapter.get_double("risk", "fixed_atr_multiplier", 2.0),
        trailing_atr_multiplier: adapter.get_double("risk", "trailing_atr_multiplier", 3.0),
        risk_percent: adapter.get_double("risk", "risk_percent", 1.0),
        volatility_cap: adapter.get_double("risk", "volatility_cap", 0.02),
        allow_fractional_size: adapter.get_bool("risk", "allow_fractional_size", false),
    }
}

pub fn build_signal_config(adapter: &dyn ConfigPort) -> SignalConfig {
    SignalConfig {
        ema_fast: adapter.get_int("signal", "ema_fast", 20) as usize,
        ema_mid: adapter.get_int("signal", "ema_mid", 60) as usize,
        ema_slow: adapter.get_int("signal", "ema_slow", 120) as usize,
    }
}

pub fn resolve_policy(
    policy_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<RiskPolicy, EmatrendError> {
    match policy_override {
        Some(name) => RiskPolicy::parse(name),
        None => match config.get_string("risk", "policy") {
            Some(name) => RiskPolicy::parse(&name),
            None => Ok(RiskPolicy::FullCapital),
        },
    }
}

pub fn resolve_data_path(
    data_override: Option<&PathBuf>,
    config: &dyn ConfigPort,
) -> Result<PathBuf, EmatrendError> {
    if let Some(path) = data_override {
        return Ok(path.clone());
    }
    config
        .get_string("backtest", "data_path")
        .map(PathBuf::from)
        .ok_or_else(|| EmatrendError::ConfigMissing {
            section: "backtest".into(),
            key: "data_path".into(),
        })
}

fn validate_all(adapter: &dyn ConfigPort) -> Result<(), EmatrendError> {
    validate_backtest_config(adapter)?;
    validate_signal_config(adapter)?;
    validate_risk_config(adapter)?;
    Ok(())
}

fn load_bars(path: &PathBuf, minimum: usize) -> Result<Vec<OhlcvBar>, EmatrendError> {
    let adapter = CsvAdapter::new(path.clone());
    let bars = adapter.fetch_ohlcv()?;
    if bars.len() < minimum {
        return Err(EmatrendError::InsufficientData {
            bars: bars.len(),
            minimum,
        });
    }
    Ok(bars)
}

fn run_one_policy(
    bars: &[OhlcvBar],
    signals: &[u8],
    policy: RiskPolicy,
    params: &PolicyParams,
    bt_config: &BacktestConfig,
) -> Result<(BacktestResult, Metrics), EmatrendError> {
    let atr = calculate_atr(bars, params.atr_period);
    let result = run_backtest(bars, signals, &atr, policy, params, bt_config)?;
    let metrics = Metrics::compute(&result.portfolio, bt_config.risk_free_rate);
    Ok((result, metrics))
}

fn print_summary(policy: RiskPolicy, result: &BacktestResult, metrics: &Metrics) {
    eprintln!("\n=== {} ===", policy.name());
    eprintln!("Total Return:     {:.2}%", metrics.total_return * 100.0);
    eprintln!("Annualized:       {:.2}%", metrics.annualized_return * 100.0);
    eprintln!("Sharpe Ratio:     {:.2}", metrics.sharpe_ratio);
    eprintln!("Max Drawdown:     -{:.1}%", metrics.max_drawdown * 100.0);
    eprintln!(
        "Trades:           {} ({} won / {} lost, {:.1}% win rate)",
        result.portfolio.closed_trades.len(),
        metrics.trades_won,
        metrics.trades_lost,
        metrics.win_rate * 100.0,
    );
    if result.portfolio.has_position() {
        eprintln!("Note: position still open at end of data (marked to last close)");
    }
}

fn run_backtest_command(
    config_path: &PathBuf,
    data_override: Option<&PathBuf>,
    policy_override: Option<&str>,
) -> ExitCode {
    // Stage 1: load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_all(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let bt_config = build_backtest_config(&adapter);
    let params = build_policy_params(&adapter);
    let signal_config = build_signal_config(&adapter);

    let policy = match resolve_policy(policy_override, &adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 2: load price data
    let data_path = match resolve_data_path(data_override, &adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Loading prices from {}", data_path.display());
    let bars = match load_bars(&data_path, signal_config.ema_slow) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!(
        "Loaded {} bars, {} to {}",
        bars.len(),
        bars[0].date,
        bars[bars.len() - 1].date,
    );

    // Stage 3: annotate and run
    let signals = generate_signal(&bars, &signal_config);
    eprintln!(
        "Running {} policy over {} bars",
        policy.name(),
        bars.len()
    );
    let (result, metrics) = match run_one_policy(&bars, &signals, policy, &params, &bt_config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 4: report
    print_summary(policy, &result, &metrics);
    println!(
        "{} return={:.2}% sharpe={:.2}",
        policy.name(),
        metrics.total_return * 100.0,
        metrics.sharpe_ratio,
    );
    ExitCode::SUCCESS
}

fn run_compare(config_path: &PathBuf, data_override: Option<&PathBuf>) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_all(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let bt_config = build_backtest_config(&adapter);
    let params = build_policy_params(&adapter);
    let signal_config = build_signal_config(&adapter);

    let data_path = match resolve_data_path(data_override, &adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!("Loading prices from {}", data_path.display());
    let bars = match load_bars(&data_path, signal_config.ema_slow) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // One signal series, three independent runs against private state.
    let signals = generate_signal(&bars, &signal_config);
    eprintln!("Comparing policies over {} bars", bars.len());

    for policy in [
        RiskPolicy::FullCapital,
        RiskPolicy::FixedStop,
        RiskPolicy::TrailingStop,
    ] {
        let (result, metrics) =
            match run_one_policy(&bars, &signals, policy, &params, &bt_config) {
                Ok(r) => r,
                Err(e) => {
                    eprintln!("error: {e}");
                    return (&e).into();
                }
            };
        print_summary(policy, &result, &metrics);
        println!(
            "{} return={:.2}% sharpe={:.2}",
            policy.name(),
            metrics.total_return * 100.0,
            metrics.sharpe_ratio,
        );
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_all(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    let policy = match resolve_policy(None, &adapter) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let signal_config = build_signal_config(&adapter);
    let params = build_policy_params(&adapter);

    eprintln!("\nResolved configuration:");
    eprintln!("  policy:          {}", policy.name());
    eprintln!(
        "  EMA lengths:     {}/{}/{}",
        signal_config.ema_fast, signal_config.ema_mid, signal_config.ema_slow,
    );
    eprintln!("  ATR period:      {}", params.atr_period);
    eprintln!(
        "  ATR multipliers: fixed {:.1}, trailing {:.1}",
        params.fixed_atr_multiplier, params.trailing_atr_multiplier,
    );
    eprintln!("  risk percent:    {:.2}%", params.risk_percent);
    eprintln!("  volatility cap:  {:.3}", params.volatility_cap);

    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_info(data_path: &PathBuf) -> ExitCode {
    let adapter = CsvAdapter::new(data_path.clone());
    match adapter.get_data_range() {
        Ok(Some((first, last, count))) => {
            println!("{}: {} bars, {} to {}", data_path.display(), count, first, last);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("{}: no data found", data_path.display());
            ExitCode::from(5u8)
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
