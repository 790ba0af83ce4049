//! Ticker reference commands.
//!
//! `tickers` streams the reference listing; `ticker` fetches the details of a
//! single symbol.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use polyrest_lib::prelude::*;
use tokio_util::sync::CancellationToken;

use crate::display::{Order, Output, collect, write_records};

/// Filters for the ticker listing.
#[derive(Args)]
pub(crate) struct TickersArgs {
    /// Exact ticker symbol
    #[arg(long)]
    ticker: Option<String>,

    /// Only tickers sorting at or after this one
    #[arg(long)]
    from_ticker: Option<String>,

    /// Only tickers sorting before this one
    #[arg(long)]
    to_ticker: Option<String>,

    /// Security type (e.g., CS, ETF, ADRC)
    #[arg(long = "type")]
    ticker_type: Option<String>,

    /// Market (stocks, crypto, fx, otc, indices)
    #[arg(long, default_value = "stocks")]
    market: String,

    /// Primary exchange MIC (e.g., XNAS)
    #[arg(long)]
    exchange: Option<String>,

    /// Search pattern matched against ticker and name
    #[arg(short, long)]
    search: Option<String>,

    /// Include delisted tickers
    #[arg(long)]
    include_inactive: bool,

    /// Point-in-time date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Sort direction
    #[arg(long, value_enum)]
    order: Option<Order>,

    /// Page size requested from the API
    #[arg(long)]
    limit: Option<u32>,
}

impl TickersArgs {
    fn into_request(self) -> TickersRequest {
        TickersRequest {
            ticker: self.ticker,
            ticker_gte: self.from_ticker,
            ticker_lt: self.to_ticker,
            ticker_type: self.ticker_type,
            market: Some(self.market),
            exchange: self.exchange,
            search: self.search,
            active: (!self.include_inactive).then_some(true),
            date: self.date,
            order: self.order.map(Into::into),
            limit: self.limit,
            ..Default::default()
        }
    }
}

/// Arguments for the ticker details command.
#[derive(Args)]
pub(crate) struct TickerArgs {
    /// Ticker symbol (e.g., AAPL)
    ticker: String,

    /// Point-in-time date (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,
}

/// List tickers matching the given filters.
pub(crate) async fn list(
    service: &StocksService,
    args: TickersArgs,
    output: &Output,
    cancel: CancellationToken,
) -> Result<()> {
    let request = args.into_request();
    let stream = service.list_tickers(&request, cancel.clone());
    let tickers = collect(stream, output, "tickers", &cancel).await?;
    write_records(&tickers, output)
}

/// Show details for one ticker.
pub(crate) async fn details(
    service: &StocksService,
    args: TickerArgs,
    output: &Output,
    cancel: &CancellationToken,
) -> Result<()> {
    let details = service
        .get_ticker_details(&args.ticker, args.date, cancel)
        .await
        .with_context(|| format!("Failed to fetch details for {}", args.ticker))?;
    write_records(std::slice::from_ref(&details), output)
}
