//! Typed, rate-limited client for a paginated JSON market-data REST API.
//!
//! This is a facade crate that re-exports functionality from the polyrest
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```ignore
//! use polyrest_lib::prelude::*;
//! use futures::StreamExt;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::load_default()?.with_env_overrides();
//!     let stocks = StocksService::new(RestClient::new(&config)?);
//!
//!     let request = TickersRequest {
//!         market: Some("stocks".to_string()),
//!         ..Default::default()
//!     };
//!     let mut tickers = stocks.list_tickers(&request, CancellationToken::new());
//!     while let Some(ticker) = tickers.next().await {
//!         println!("{}", ticker?.symbol);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/polyrest/polyrest/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use polyrest_types::*;

// Re-export the request pipeline
#[cfg(feature = "fetch")]
pub use polyrest_fetch::{
    BASE_RETRY_DELAY, ClientConfig, ConfigError, Endpoint, HttpTransport, RateLimiter,
    RawResponse, ResiliencePolicy, RestClient, RetryPolicy, StocksService, TOO_MANY_REQUESTS,
    Transport, config, paginate, rate_limited,
};

// Re-export formatters
#[cfg(feature = "format")]
pub use polyrest_format::{
    CsvFormatter, FormatError, Formatter, JsonFormatter, JsonStyle, OutputFormat, Record,
};

/// Prelude module for convenient imports.
///
/// ```
/// use polyrest_lib::prelude::*;
/// ```
pub mod prelude {
    pub use polyrest_types::{
        Aggregate, AggregatesRequest, ApiError, Cursor, DateRange, Envelope, Page, PolyrestError,
        Result, ShortInterest, ShortInterestRequest, ShortVolume, ShortVolumeRequest, SortOrder,
        Ticker, TickerDetails, TickersRequest, Timespan, Trade, TradesRequest,
    };

    #[cfg(feature = "fetch")]
    pub use polyrest_fetch::{ClientConfig, ConfigError, RestClient, StocksService};

    #[cfg(feature = "format")]
    pub use polyrest_format::{CsvFormatter, Formatter, JsonFormatter, OutputFormat, Record};
}
