use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use stochrsi_core::Bar;
use stochrsi_data::{csv_loader, CsvDataProvider};
use stochrsi_indicators::{BarIndicator, MovingAverageType, StochRsi, StochRsiConfig};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "stochrsi")]
#[command(about = "Stochastic RSI over OHLCV bar files")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", env = "STOCHRSI_LOG")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute StochRSI for every bar in a CSV file
    Run(RunArgs),

    /// List instruments with a CSV file in a data directory
    Instruments {
        /// Directory of `<instrument>.csv` files
        #[arg(short, long)]
        dir: PathBuf,
    },

    /// List available RSI smoothing types
    MaTypes,
}

#[derive(Args, Debug, Default)]
#[command(group(ArgGroup::new("source").required(true).args(["data", "instrument"])))]
struct RunArgs {
    /// Path to CSV data file
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Directory of `<instrument>.csv` files
    #[arg(long, requires = "instrument")]
    dir: Option<PathBuf>,

    /// Instrument to load from `--dir`
    #[arg(short, long, requires = "dir")]
    instrument: Option<String>,

    /// TOML file with `period`, `ma_type` and `name`
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RSI / window period (overrides the config file)
    #[arg(short, long)]
    period: Option<usize>,

    /// RSI smoothing: simple, exponential, wilders (overrides the config file)
    #[arg(short, long)]
    ma_type: Option<MovingAverageType>,

    /// Indicator display name (overrides the config file)
    #[arg(short, long)]
    name: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Only print bars once the indicator is warmed up
    #[arg(long)]
    ready_only: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Csv,
    Json,
}

#[derive(Debug, Serialize)]
struct Row {
    timestamp: DateTime<Utc>,
    close: Decimal,
    value: Decimal,
    ready: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for the indicator output
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.json_logs {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    match cli.command {
        Commands::Run(args) => run(args)?,
        Commands::Instruments { dir } => {
            let instruments = CsvDataProvider::new(&dir)
                .available_instruments()
                .with_context(|| format!("Failed to list {}", dir.display()))?;
            for instrument in instruments {
                println!("{}", instrument);
            }
        }
        Commands::MaTypes => {
            println!("Available RSI smoothing types:");
            println!("  simple      - rolling mean of gains / losses (default)");
            println!("  exponential - EMA seeded with the simple mean, k = 2 / (period + 1)");
            println!("  wilders     - Wilder's smoothing, k = 1 / period");
        }
    }

    Ok(())
}

fn run(args: RunArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let mut stoch = config.build().context("Invalid StochRSI configuration")?;

    tracing::info!(indicator = %stoch.name(), "Starting StochRSI run");

    let bars = load_bars(&args)?;
    tracing::info!(bars = bars.len(), "Loaded historical data");

    if bars.is_empty() {
        anyhow::bail!("No bars loaded from CSV file");
    }

    let rows = compute_rows(&mut stoch, &bars, args.ready_only);
    write_rows(&mut std::io::stdout().lock(), &rows, args.format)?;

    tracing::info!(
        indicator = %stoch.name(),
        samples = stoch.samples(),
        warm_up = stoch.warm_up_period(),
        ready = stoch.is_ready(),
        last = %stoch.current(),
        "Run complete"
    );

    Ok(())
}

/// Either a single file (`--data`) or an instrument in a data directory.
fn load_bars(args: &RunArgs) -> Result<Vec<Bar>> {
    match (&args.data, &args.dir, &args.instrument) {
        (Some(path), _, _) => csv_loader::load_bars_from_csv(path)
            .with_context(|| format!("Failed to load bars from {}", path.display())),
        (None, Some(dir), Some(instrument)) => CsvDataProvider::new(dir)
            .load_bars(instrument)
            .with_context(|| format!("Failed to load {} from {}", instrument, dir.display())),
        _ => anyhow::bail!("Either --data or --dir with --instrument is required"),
    }
}

/// Config file first, then command-line overrides.
fn resolve_config(args: &RunArgs) -> Result<StochRsiConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            StochRsiConfig::from_toml_str(&text)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => StochRsiConfig::default(),
    };

    if let Some(period) = args.period {
        config.period = period;
    }
    if let Some(ma_type) = args.ma_type {
        config.ma_type = ma_type;
    }
    if let Some(name) = &args.name {
        config.name = Some(name.clone());
    }
    Ok(config)
}

fn compute_rows(stoch: &mut StochRsi, bars: &[Bar], ready_only: bool) -> Vec<Row> {
    bars.iter()
        .filter_map(|bar| {
            let value = stoch.update(bar);
            let ready = stoch.is_ready();
            (ready || !ready_only).then(|| Row {
                timestamp: bar.timestamp,
                close: bar.close,
                value,
                ready,
            })
        })
        .collect()
}

fn write_rows<W: Write>(out: &mut W, rows: &[Row], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => {
            writeln!(out, "{:<26} {:>14} {:>32} {:>6}", "timestamp", "close", "stoch_rsi", "ready")?;
            for row in rows {
                writeln!(
                    out,
                    "{:<26} {:>14} {:>32} {:>6}",
                    row.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    row.close,
                    row.value.round_dp(8),
                    row.ready
                )?;
            }
        }
        OutputFormat::Csv => {
            writeln!(out, "timestamp,close,stoch_rsi,ready")?;
            for row in rows {
                writeln!(
                    out,
                    "{},{},{},{}",
                    row.timestamp.to_rfc3339(),
                    row.close,
                    row.value,
                    row.ready
                )?;
            }
        }
        OutputFormat::Json => {
            for row in rows {
                writeln!(out, "{}", serde_json::to_string(row)?)?;
            }
        }
    }

    out.flush()?;
    Ok(())
}
