//! TrendCast CLI — scheduled forecast pipeline and fetch preview.
//!
//! Commands:
//! - `run` — fetch history, fit the trend model, upsert history + forecast
//!   into the remote store. Exits 1 on missing credentials or any stage
//!   failure.
//! - `fetch` — fetch and print the cleaned history without touching the
//!   store. No credentials required.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use trendcast_core::data::{fetch_history, YahooProvider};
use trendcast_runner::{
    run_pipeline, JobConfig, PipelineOutcome, PostgrestClient, StoreConfig,
};

#[derive(Parser)]
#[command(
    name = "trendcast",
    about = "TrendCast — daily price-trend forecast pipeline"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and upload history plus the forecast.
    Run {
        /// Path to a TOML job config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Instrument symbol (e.g. BTC-USD). Overrides the config file.
        #[arg(long)]
        symbol: Option<String>,

        /// Days of history to request. Overrides the config file.
        #[arg(long)]
        lookback: Option<i64>,

        /// Training window, in feature rows. Overrides the config file.
        #[arg(long)]
        window: Option<usize>,

        /// Model version tag written on every record.
        #[arg(long)]
        model_version: Option<String>,
    },
    /// Fetch and print the cleaned history without uploading.
    Fetch {
        /// Instrument symbol (e.g. BTC-USD).
        #[arg(long, default_value = "BTC-USD")]
        symbol: String,

        /// Days of history to request.
        #[arg(long, default_value_t = 60)]
        lookback: i64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            symbol,
            lookback,
            window,
            model_version,
        } => run_cmd(config, symbol, lookback, window, model_version),
        Commands::Fetch { symbol, lookback } => fetch_cmd(&symbol, lookback),
    }
}

fn run_cmd(
    config_path: Option<PathBuf>,
    symbol: Option<String>,
    lookback: Option<i64>,
    window: Option<usize>,
    model_version: Option<String>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => JobConfig::from_file(&path)?,
        None => JobConfig::default(),
    };
    if let Some(symbol) = symbol {
        config.symbol = symbol;
    }
    if let Some(lookback) = lookback {
        config.lookback_days = lookback;
    }
    if let Some(window) = window {
        config.training_window = window;
    }
    if let Some(tag) = model_version {
        config.model_version = tag;
    }
    if let Err(e) = config.validate() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    // Credentials are validated before any network call is made.
    let store_config = match StoreConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    let store = match PostgrestClient::new(&store_config) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let provider = YahooProvider::new();
    let today = chrono::Local::now().date_naive();

    match run_pipeline(&config, &provider, &store, today) {
        Ok(outcome) => {
            print_summary(&outcome, &config.model_version);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn fetch_cmd(symbol: &str, lookback: i64) -> Result<()> {
    let provider = YahooProvider::new();
    let today = chrono::Local::now().date_naive();

    let bars = match fetch_history(&provider, symbol, today, lookback) {
        Ok(bars) => bars,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    println!(
        "{} rows for {symbol} ({} to {})",
        bars.len(),
        bars.first().unwrap().date,
        bars.last().unwrap().date
    );
    println!();
    println!(
        "{:<12} {:>12} {:>12} {:>12} {:>12} {:>12}",
        "Date", "Open", "High", "Low", "Close", "Volume"
    );
    println!("{}", "-".repeat(76));
    for bar in &bars {
        println!(
            "{:<12} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12}",
            bar.date.to_string(),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        );
    }

    Ok(())
}

fn print_summary(outcome: &PipelineOutcome, model_version: &str) {
    println!();
    println!("=== Forecast Summary ===");
    println!("Symbol:         {}", outcome.symbol);
    println!("Model:          {model_version}");
    println!(
        "History:        {} rows ({} to {})",
        outcome.bar_count, outcome.first_date, outcome.last_date
    );
    println!("Features:       {} rows", outcome.feature_count);
    println!();
    println!("--- Fit ---");
    println!("Slope:          {:+.4} per day", outcome.fit.slope);
    println!("MAE:            {:.2}", outcome.fit.mae);
    println!("RMSE:           {:.2}", outcome.fit.rmse);
    println!("R²:             {:.4}", outcome.fit.r_squared);
    println!();
    println!("--- Forecast for {} ---", outcome.forecast_date);
    println!("Prediction:     {:.2}", outcome.fit.prediction);
    println!(
        "95% interval:   [{:.2}, {:.2}]",
        outcome.fit.lower_bound, outcome.fit.upper_bound
    );
    println!("Confidence:     {:.1}%", outcome.fit.confidence * 100.0);
    println!();
    println!("Uploaded {} rows. Done.", outcome.uploaded_rows);
}
