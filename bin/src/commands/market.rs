//! Trade and aggregate bar commands.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use polyrest_lib::prelude::*;
use tokio_util::sync::CancellationToken;

use crate::display::{Order, Output, collect, write_records};

/// Arguments for the trades listing.
#[derive(Args)]
pub(crate) struct TradesArgs {
    /// Ticker symbol (e.g., AAPL)
    ticker: String,

    /// Only trades at or after this date (YYYY-MM-DD) or epoch nanoseconds
    #[arg(long)]
    from: Option<String>,

    /// Only trades before this date (YYYY-MM-DD) or epoch nanoseconds
    #[arg(long)]
    to: Option<String>,

    /// Sort direction
    #[arg(long, value_enum)]
    order: Option<Order>,

    /// Page size requested from the API
    #[arg(long)]
    limit: Option<u32>,
}

/// Arguments for the aggregate bars listing.
#[derive(Args)]
pub(crate) struct AggsArgs {
    /// Ticker symbol (e.g., AAPL)
    ticker: String,

    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    from: NaiveDate,

    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Bar unit (second, minute, hour, day, week, month, quarter, year)
    #[arg(short, long, default_value = "day")]
    timespan: Timespan,

    /// Number of units per bar
    #[arg(short, long, default_value = "1")]
    multiplier: u32,

    /// Do not adjust results for splits
    #[arg(long)]
    unadjusted: bool,

    /// Sort by timestamp
    #[arg(long, value_enum)]
    order: Option<Order>,

    /// Maximum number of base aggregates queried
    #[arg(long)]
    limit: Option<u32>,
}

/// List trades for a ticker.
pub(crate) async fn trades(
    service: &StocksService,
    args: TradesArgs,
    output: &Output,
    cancel: CancellationToken,
) -> Result<()> {
    let request = TradesRequest {
        timestamp_gte: args.from,
        timestamp_lt: args.to,
        order: args.order.map(Into::into),
        limit: args.limit,
        ..Default::default()
    };
    let stream = service.list_trades(&args.ticker, &request, cancel.clone());
    let trades = collect(stream, output, "trades", &cancel).await?;
    write_records(&trades, output)
}

/// List aggregate bars for a ticker.
pub(crate) async fn aggs(
    service: &StocksService,
    args: AggsArgs,
    output: &Output,
    cancel: CancellationToken,
) -> Result<()> {
    let end = args.to.unwrap_or_else(|| chrono::Utc::now().date_naive());
    let range = DateRange::new(args.from, end).context("Invalid date range")?;

    let mut request = AggregatesRequest::new(args.multiplier, args.timespan, range);
    request.adjusted = args.unadjusted.then_some(false);
    request.sort = args.order.map(Into::into);
    request.limit = args.limit;

    let stream = service.list_aggregates(&args.ticker, &request, cancel.clone());
    let bars = collect(stream, output, "bars", &cancel).await?;
    write_records(&bars, output)
}
