//! Short selling commands.

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use polyrest_lib::prelude::*;
use tokio_util::sync::CancellationToken;

use crate::display::{Order, Output, collect, write_records};

/// Filters for the daily short volume listing.
#[derive(Args)]
pub(crate) struct ShortVolumeArgs {
    /// Ticker symbols (repeat or comma separate for several)
    #[arg(long, value_delimiter = ',')]
    ticker: Vec<String>,

    /// Exact trading date (YYYY-MM-DD)
    #[arg(long, conflicts_with_all = ["from", "to"])]
    date: Option<NaiveDate>,

    /// First trading date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last trading date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Minimum short volume ratio (percent)
    #[arg(long)]
    min_ratio: Option<f64>,

    /// Sort direction
    #[arg(long, value_enum)]
    order: Option<Order>,

    /// Page size requested from the API
    #[arg(long)]
    limit: Option<u32>,
}

impl ShortVolumeArgs {
    fn into_request(self) -> ShortVolumeRequest {
        let (ticker, ticker_any_of) = split_tickers(self.ticker);
        ShortVolumeRequest {
            ticker,
            ticker_any_of,
            date: self.date,
            date_gte: self.from,
            date_lte: self.to,
            volume_ratio_gte: self.min_ratio,
            order: self.order.map(Into::into),
            limit: self.limit,
            ..Default::default()
        }
    }
}

/// Filters for the short interest listing.
#[derive(Args)]
pub(crate) struct ShortInterestArgs {
    /// Ticker symbols (repeat or comma separate for several)
    #[arg(long, value_delimiter = ',')]
    ticker: Vec<String>,

    /// First settlement date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last settlement date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Sort direction
    #[arg(long, value_enum)]
    order: Option<Order>,

    /// Page size requested from the API
    #[arg(long)]
    limit: Option<u32>,
}

impl ShortInterestArgs {
    fn into_request(self) -> ShortInterestRequest {
        let (ticker, ticker_any_of) = split_tickers(self.ticker);
        ShortInterestRequest {
            ticker,
            ticker_any_of,
            settlement_date_gte: self.from,
            settlement_date_lte: self.to,
            order: self.order.map(Into::into),
            limit: self.limit,
            ..Default::default()
        }
    }
}

/// One ticker is an exact match; several become an `any_of` filter.
fn split_tickers(mut tickers: Vec<String>) -> (Option<String>, Vec<String>) {
    if tickers.len() == 1 {
        (tickers.pop(), Vec::new())
    } else {
        (None, tickers)
    }
}

/// List daily short volume.
pub(crate) async fn volume(
    service: &StocksService,
    args: ShortVolumeArgs,
    output: &Output,
    cancel: CancellationToken,
) -> Result<()> {
    let request = args.into_request();
    let stream = service.list_short_volume(&request, cancel.clone());
    let records = collect(stream, output, "short volume records", &cancel).await?;
    write_records(&records, output)
}

/// List short interest.
pub(crate) async fn interest(
    service: &StocksService,
    args: ShortInterestArgs,
    output: &Output,
    cancel: CancellationToken,
) -> Result<()> {
    let request = args.into_request();
    let stream = service.list_short_interest(&request, cancel.clone());
    let records = collect(stream, output, "short interest records", &cancel).await?;
    write_records(&records, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_tickers() {
        assert_eq!(split_tickers(vec![]), (None, vec![]));
        assert_eq!(
            split_tickers(vec!["AAPL".to_string()]),
            (Some("AAPL".to_string()), vec![])
        );
        assert_eq!(
            split_tickers(vec!["AAPL".to_string(), "MSFT".to_string()]),
            (None, vec!["AAPL".to_string(), "MSFT".to_string()])
        );
    }
}
