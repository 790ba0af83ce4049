//! Typed stock market operations.

use chrono::NaiveDate;
use futures::stream::{self, BoxStream, StreamExt};
use polyrest_types::{
    Aggregate, AggregatesRequest, Page, PolyrestError, RequestSpec, Result, ShortInterest,
    ShortInterestRequest, ShortVolume, ShortVolumeRequest, Ticker, TickerDetails, TickersRequest,
    Trade, TradesRequest, serde_util::DATE_FORMAT,
};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::client::RestClient;
use crate::url::Endpoint;

/// Typed facade over the stock market endpoints.
///
/// Listing operations return lazy streams: nothing is requested until the
/// stream is polled, and every further page is fetched only once the previous
/// one has been consumed. Argument errors are reported before any request is
/// made, as the only item of the stream.
#[derive(Debug, Clone)]
pub struct StocksService {
    client: RestClient,
}

impl StocksService {
    /// Creates the service on top of a client.
    #[must_use]
    pub const fn new(client: RestClient) -> Self {
        Self { client }
    }

    /// Returns the underlying client.
    #[must_use]
    pub const fn client(&self) -> &RestClient {
        &self.client
    }

    /// Lists tickers matching `request`.
    pub fn list_tickers(
        &self,
        request: &TickersRequest,
        cancel: CancellationToken,
    ) -> BoxStream<'static, Result<Ticker>> {
        self.list(Endpoint::tickers(), request, cancel)
    }

    /// Fetches details for one ticker, optionally as of `date`.
    ///
    /// # Errors
    ///
    /// Returns [`PolyrestError::InvalidArgument`] for a blank ticker,
    /// [`PolyrestError::Cancelled`] if `cancel` fires, or the request error.
    pub async fn get_ticker_details(
        &self,
        ticker: &str,
        date: Option<NaiveDate>,
        cancel: &CancellationToken,
    ) -> Result<TickerDetails> {
        let ticker = require_ticker(ticker)?;
        let query: Vec<(String, String)> = date
            .map(|date| ("date".to_string(), date.format(DATE_FORMAT).to_string()))
            .into_iter()
            .collect();

        let envelope = self
            .client
            .call::<TickerDetails>(&Endpoint::ticker_details(ticker), &query, None, cancel)
            .await?;
        envelope
            .classify()
            .and_then(Page::into_value)
            .map_err(PolyrestError::Api)
    }

    /// Lists daily short volume records matching `request`.
    pub fn list_short_volume(
        &self,
        request: &ShortVolumeRequest,
        cancel: CancellationToken,
    ) -> BoxStream<'static, Result<ShortVolume>> {
        self.list(Endpoint::short_volume(), request, cancel)
    }

    /// Lists short interest records matching `request`.
    pub fn list_short_interest(
        &self,
        request: &ShortInterestRequest,
        cancel: CancellationToken,
    ) -> BoxStream<'static, Result<ShortInterest>> {
        self.list(Endpoint::short_interest(), request, cancel)
    }

    /// Lists trades for `ticker`.
    pub fn list_trades(
        &self,
        ticker: &str,
        request: &TradesRequest,
        cancel: CancellationToken,
    ) -> BoxStream<'static, Result<Trade>> {
        match require_ticker(ticker) {
            Ok(ticker) => self.list(Endpoint::trades(ticker), request, cancel),
            Err(err) => failed(err),
        }
    }

    /// Lists aggregate bars for `ticker`.
    pub fn list_aggregates(
        &self,
        ticker: &str,
        request: &AggregatesRequest,
        cancel: CancellationToken,
    ) -> BoxStream<'static, Result<Aggregate>> {
        let ticker = match require_ticker(ticker) {
            Ok(ticker) => ticker,
            Err(err) => return failed(err),
        };
        if request.multiplier == 0 {
            return failed(PolyrestError::InvalidArgument {
                name: "multiplier",
                reason: "must be greater than zero",
            });
        }
        self.list(Endpoint::aggregates(ticker, request), request, cancel)
    }

    fn list<T, R>(
        &self,
        endpoint: Endpoint,
        request: &R,
        cancel: CancellationToken,
    ) -> BoxStream<'static, Result<T>>
    where
        T: DeserializeOwned + Send + 'static,
        R: RequestSpec,
    {
        match request.to_query() {
            Ok(query) => {
                tracing::debug!(%endpoint, params = query.len(), "Starting paginated listing");
                self.client.paginate(endpoint, query, cancel)
            }
            Err(err) => failed(err),
        }
    }
}

fn require_ticker(ticker: &str) -> Result<&str> {
    let ticker = ticker.trim();
    if ticker.is_empty() {
        return Err(PolyrestError::InvalidArgument {
            name: "ticker",
            reason: "must not be blank",
        });
    }
    Ok(ticker)
}

fn failed<T: Send + 'static>(err: PolyrestError) -> BoxStream<'static, Result<T>> {
    stream::once(async move { Err(err) }).boxed()
}
