//! polyrest CLI - Query stock market data from a paginated REST API.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use polyrest_lib::prelude::*;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod display;

use commands::market::{AggsArgs, TradesArgs};
use commands::short::{ShortInterestArgs, ShortVolumeArgs};
use commands::tickers::{TickerArgs, TickersArgs};
use display::{Format, Output};

#[derive(Parser)]
#[command(name = "polyrest")]
#[command(about = "Query stock market data from a paginated REST API", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API key (overrides the config file and POLYREST_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv", global = true)]
    format: Format,

    /// Output file path. Defaults to stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Stop after this many records
    #[arg(long, global = true)]
    max_items: Option<usize>,
}

#[derive(Subcommand)]
enum Commands {
    /// List tickers
    Tickers(TickersArgs),

    /// Show details for one ticker
    Ticker(TickerArgs),

    /// List daily short sale volume
    ShortVolume(ShortVolumeArgs),

    /// List bi-monthly short interest
    ShortInterest(ShortInterestArgs),

    /// List trades for a ticker
    Trades(TradesArgs),

    /// List aggregate (OHLCV) bars for a ticker
    Aggs(AggsArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let config = load_config(cli.config.as_deref(), cli.api_key)?;
    let client = RestClient::new(&config).context("Failed to create client")?;
    let service = StocksService::new(client);

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let output = Output {
        format: cli.format,
        path: cli.output,
        max_items: cli.max_items,
        quiet: cli.quiet,
    };

    match command {
        Commands::Tickers(args) => commands::tickers::list(&service, args, &output, cancel).await,
        Commands::Ticker(args) => {
            commands::tickers::details(&service, args, &output, &cancel).await
        }
        Commands::ShortVolume(args) => {
            commands::short::volume(&service, args, &output, cancel).await
        }
        Commands::ShortInterest(args) => {
            commands::short::interest(&service, args, &output, cancel).await
        }
        Commands::Trades(args) => commands::market::trades(&service, args, &output, cancel).await,
        Commands::Aggs(args) => commands::market::aggs(&service, args, &output, cancel).await,
    }
}

/// Logs go to stderr so they never mix with records written to stdout.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("warn,polyrest={level},polyrest_fetch={level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Config file, then environment, then command-line flags.
fn load_config(path: Option<&Path>, api_key: Option<String>) -> Result<ClientConfig> {
    let config = match path {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ClientConfig::load_default().context("Failed to load default config")?,
    };

    let mut config = config.with_env_overrides();
    if let Some(api_key) = api_key {
        config.api_key = api_key;
    }

    tracing::debug!(?config, "Loaded configuration");
    Ok(config)
}

fn cancel_on_ctrl_c(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, stopping after the current request");
            cancel.cancel();
        }
    });
}
