//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::log_audit_adapter::LogAuditAdapter;
use crate::domain::backtest::{self, BacktestConfig};
use crate::domain::compare::{self, PerformanceSummary};
use crate::domain::config_validation::{
    optional_number, signal_config, signal_names, validate_config,
};
use crate::domain::decision::{self, DecisionWeights};
use crate::domain::error::CryptomindError;
use crate::domain::indicator::IndicatorPoint;
use crate::domain::signal::{self, SignalConfig};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

pub const DEFAULT_TIMEFRAME: &str = "1h";

#[derive(Parser, Debug)]
#[command(name = "cryptomind", about = "Technical signals, decisions and backtests for crypto")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the last-bar snapshot of every configured signal
    Signals {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        timeframe: Option<String>,
    },
    /// Aggregate configured signals into a BUY/HOLD/SELL recommendation
    Decide {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        timeframe: Option<String>,
    },
    /// Replay configured signals through the backtest simulator
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        timeframe: Option<String>,
        #[arg(long)]
        initial_cash: Option<f64>,
        #[arg(long)]
        fee_bps: Option<f64>,
    },
    /// Compare return and volatility across symbols
    Compare {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated; defaults to every symbol with data
        #[arg(long, value_delimiter = ',')]
        symbols: Vec<String>,
        #[arg(long)]
        timeframe: Option<String>,
        /// Trailing bars to use; 0 uses the whole series
        #[arg(long, default_value_t = 0)]
        limit: usize,
    },
    /// List symbols with price data for a timeframe
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        timeframe: Option<String>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Signals {
            config,
            symbol,
            timeframe,
        } => run_signals(&config, &symbol, timeframe.as_deref()),
        Command::Decide {
            config,
            symbol,
            timeframe,
        } => run_decide(&config, &symbol, timeframe.as_deref()),
        Command::Backtest {
            config,
            symbol,
            timeframe,
            initial_cash,
            fee_bps,
        } => run_backtest(
            &config,
            &symbol,
            timeframe.as_deref(),
            initial_cash,
            fee_bps,
        ),
        Command::Compare {
            config,
            symbols,
            timeframe,
            limit,
        } => run_compare(&config, &symbols, timeframe.as_deref(), limit),
        Command::ListSymbols { config, timeframe } => {
            run_list_symbols(&config, timeframe.as_deref())
        }
        Command::Validate { config } => run_validate(&config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, CryptomindError> {
    FileConfigAdapter::from_file(path).map_err(|e| CryptomindError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Load and validate in one step; every command starts here.
fn load_validated(path: &Path) -> Result<FileConfigAdapter, CryptomindError> {
    eprintln!("Loading config from {}", path.display());
    let adapter = load_config(path)?;
    validate_config(&adapter)?;
    Ok(adapter)
}

pub fn resolve_timeframe(cli_value: Option<&str>, config: &dyn ConfigPort) -> String {
    cli_value
        .map(String::from)
        .or_else(|| config.get_string("data", "timeframe"))
        .unwrap_or_else(|| DEFAULT_TIMEFRAME.to_string())
}

pub fn build_data_port(config: &dyn ConfigPort) -> CsvAdapter {
    let dir = config
        .get_string("data", "dir")
        .unwrap_or_else(|| ".".to_string());
    CsvAdapter::new(PathBuf::from(dir))
}

pub fn build_signal_configs(config: &dyn ConfigPort) -> Result<Vec<SignalConfig>, CryptomindError> {
    signal_names(config)
        .iter()
        .map(|name| signal_config(config, name))
        .collect()
}

pub fn build_weights(config: &dyn ConfigPort) -> Result<DecisionWeights, CryptomindError> {
    let defaults = DecisionWeights::default();
    Ok(DecisionWeights {
        technical: optional_number(config, "decision", "technical")?.unwrap_or(defaults.technical),
        onchain: optional_number(config, "decision", "onchain")?.unwrap_or(defaults.onchain),
        sentiment: optional_number(config, "decision", "sentiment")?.unwrap_or(defaults.sentiment),
    })
}

/// Config file values, overridden by whatever was passed on the command line.
pub fn build_backtest_config(
    config: &dyn ConfigPort,
    initial_cash: Option<f64>,
    fee_bps: Option<f64>,
) -> Result<BacktestConfig, CryptomindError> {
    let defaults = BacktestConfig::default();
    let file_cash = optional_number(config, "backtest", "initial_cash")?;
    let file_fee = optional_number(config, "backtest", "fee_bps")?;
    Ok(BacktestConfig {
        initial_cash: initial_cash
            .or(file_cash)
            .unwrap_or(defaults.initial_cash),
        fee_bps: fee_bps.or(file_fee).unwrap_or(defaults.fee_bps),
    })
}

fn format_point(name: &str, point: &IndicatorPoint) -> String {
    let value = point
        .value
        .map(|v| format!("{v:.4}"))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:<14} {}  value={:>12}  trigger={:+}",
        name,
        point.ts.to_rfc3339(),
        value,
        point.trigger.as_i8()
    )
}

fn run_signals(
    config_path: &Path,
    symbol: &str,
    timeframe: Option<&str>,
) -> Result<(), CryptomindError> {
    let adapter = load_validated(config_path)?;
    let timeframe = resolve_timeframe(timeframe, &adapter);
    let configs = build_signal_configs(&adapter)?;

    let series = build_data_port(&adapter).fetch_series(symbol, &timeframe)?;
    eprintln!(
        "Running {} signals on {} {} ({} bars)",
        configs.len(),
        symbol,
        timeframe,
        series.len()
    );

    let snapshots =
        signal::run_signals_audited(&series, &configs, &LogAuditAdapter, symbol, &timeframe)?;
    for (name, point) in &snapshots {
        println!("{}", format_point(name, point));
    }
    Ok(())
}

fn run_decide(
    config_path: &Path,
    symbol: &str,
    timeframe: Option<&str>,
) -> Result<(), CryptomindError> {
    let adapter = load_validated(config_path)?;
    let timeframe = resolve_timeframe(timeframe, &adapter);
    let configs = build_signal_configs(&adapter)?;
    let weights = build_weights(&adapter)?;

    let series = build_data_port(&adapter).fetch_series(symbol, &timeframe)?;
    let result = decision::decide(&series, &configs, Some(weights))?;

    println!("Symbol:          {} ({})", symbol, timeframe);
    println!("Score:           {:.4}", result.score);
    println!("Recommendation:  {}", result.recommendation);
    println!(
        "Weights:         technical={} onchain={} sentiment={}",
        result.weights.technical, result.weights.onchain, result.weights.sentiment
    );
    for (name, point) in &result.details {
        println!("  {}", format_point(name, point));
    }
    Ok(())
}

fn run_backtest(
    config_path: &Path,
    symbol: &str,
    timeframe: Option<&str>,
    initial_cash: Option<f64>,
    fee_bps: Option<f64>,
) -> Result<(), CryptomindError> {
    let adapter = load_validated(config_path)?;
    let timeframe = resolve_timeframe(timeframe, &adapter);
    let configs = build_signal_configs(&adapter)?;
    let bt_config = build_backtest_config(&adapter, initial_cash, fee_bps)?;

    let series = build_data_port(&adapter).fetch_series(symbol, &timeframe)?;
    eprintln!(
        "Running backtest: {} {} ({} bars, {} signals)",
        symbol,
        timeframe,
        series.len(),
        configs.len()
    );

    let result = backtest::run_backtest(&series, &configs, &bt_config)?;

    eprintln!("\n=== Backtest Results ===");
    println!("Initial Cash:    {:.2}", bt_config.initial_cash);
    println!("Final Equity:    {:.2}", result.final_equity);
    println!("Return:          {:.2}%", result.return_ratio * 100.0);
    println!("Trades:          {}", result.trade_count);
    for fill in &result.fills {
        println!(
            "  {} {:<4} price={:.4} qty={:.8} fee={:.4}",
            fill.ts.to_rfc3339(),
            fill.side,
            fill.price,
            fill.quantity,
            fill.fee
        );
    }
    Ok(())
}

fn run_compare(
    config_path: &Path,
    symbols: &[String],
    timeframe: Option<&str>,
    limit: usize,
) -> Result<(), CryptomindError> {
    let adapter = load_validated(config_path)?;
    let timeframe = resolve_timeframe(timeframe, &adapter);
    let data_port = build_data_port(&adapter);

    let symbols = if symbols.is_empty() {
        data_port.list_symbols(&timeframe)?
    } else {
        symbols.to_vec()
    };
    let summaries = compare_symbols(&data_port, &symbols, &timeframe, limit)?;

    println!(
        "{:<12} {:>12} {:>12} {:>14}",
        "symbol", "return", "volatility", "last"
    );
    for s in &summaries {
        println!(
            "{:<12} {:>11.2}% {:>11.4}% {:>14.4}",
            s.symbol,
            s.total_return * 100.0,
            s.volatility * 100.0,
            s.last
        );
    }
    Ok(())
}

/// Summarize each symbol, skipping those that fail; errors only if none succeed.
pub fn compare_symbols(
    data_port: &dyn DataPort,
    symbols: &[String],
    timeframe: &str,
    limit: usize,
) -> Result<Vec<PerformanceSummary>, CryptomindError> {
    let mut summaries = Vec::with_capacity(symbols.len());
    let mut last_err = None;

    for symbol in symbols {
        let summary = data_port
            .fetch_series(symbol, timeframe)
            .and_then(|series| compare::summarize(symbol, &series, limit));
        match summary {
            Ok(s) => summaries.push(s),
            Err(e) => {
                eprintln!("warning: skipping {} ({})", symbol, e);
                last_err = Some(e);
            }
        }
    }

    match last_err {
        Some(e) if summaries.is_empty() => Err(e),
        _ => Ok(summaries),
    }
}

fn run_list_symbols(config_path: &Path, timeframe: Option<&str>) -> Result<(), CryptomindError> {
    let adapter = load_validated(config_path)?;
    let timeframe = resolve_timeframe(timeframe, &adapter);
    let symbols = build_data_port(&adapter).list_symbols(&timeframe)?;

    if symbols.is_empty() {
        eprintln!("No symbols found for timeframe {}", timeframe);
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), CryptomindError> {
    let adapter = load_validated(config_path)?;
    let configs = build_signal_configs(&adapter)?;

    eprintln!("\nSignals:");
    for config in &configs {
        let resolved = signal::resolve(config)?;
        eprintln!("  {:<14} {:?}", config.name, resolved);
    }
    eprintln!("\nConfiguration is valid.");
    Ok(())
}
