//! Endpoint paths.
//!
//! An [`Endpoint`] is a list of raw path segments. Segments are percent-encoded
//! individually when joined onto the base URL, so a ticker containing `/` or
//! `.` cannot escape its segment.

use polyrest_types::AggregatesRequest;
use std::fmt;

/// Path of one API endpoint, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    segments: Vec<String>,
}

impl Endpoint {
    /// Creates an endpoint from raw path segments.
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Ticker reference listing: `/v3/reference/tickers`.
    #[must_use]
    pub fn tickers() -> Self {
        Self::new(["v3", "reference", "tickers"])
    }

    /// Ticker details: `/v3/reference/tickers/{ticker}`.
    #[must_use]
    pub fn ticker_details(ticker: &str) -> Self {
        Self::new(["v3", "reference", "tickers", ticker])
    }

    /// Daily short volume: `/stocks/v1/short-volume`.
    #[must_use]
    pub fn short_volume() -> Self {
        Self::new(["stocks", "v1", "short-volume"])
    }

    /// Short interest: `/stocks/v1/short-interest`.
    #[must_use]
    pub fn short_interest() -> Self {
        Self::new(["stocks", "v1", "short-interest"])
    }

    /// Trades for one ticker: `/v3/trades/{ticker}`.
    #[must_use]
    pub fn trades(ticker: &str) -> Self {
        Self::new(["v3", "trades", ticker])
    }

    /// Aggregate bars:
    /// `/v2/aggs/ticker/{ticker}/range/{multiplier}/{timespan}/{from}/{to}`.
    #[must_use]
    pub fn aggregates(ticker: &str, request: &AggregatesRequest) -> Self {
        Self::new([
            "v2".to_string(),
            "aggs".to_string(),
            "ticker".to_string(),
            ticker.to_string(),
            "range".to_string(),
            request.multiplier.to_string(),
            request.timespan.as_str().to_string(),
            request.range.start_str(),
            request.range.end_str(),
        ])
    }

    /// Returns the raw path segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}
