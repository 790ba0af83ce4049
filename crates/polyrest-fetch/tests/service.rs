//! End-to-end tests of the service over a scripted transport.

use async_trait::async_trait;
use chrono::NaiveDate;
use futures::StreamExt;
use polyrest_fetch::{ClientConfig, Endpoint, RawResponse, RestClient, StocksService, Transport};
use polyrest_types::{
    AggregatesRequest, Cursor, DateRange, PolyrestError, Result, SortOrder, TickersRequest,
    Timespan, TradesRequest,
};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
struct Call {
    path: String,
    query: Vec<(String, String)>,
    cursor: Option<String>,
    at: Instant,
}

/// Replays canned responses in order and records every request.
#[derive(Debug, Default)]
struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<RawResponse>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedTransport {
    fn new(responses: Vec<Result<RawResponse>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(
        &self,
        endpoint: &Endpoint,
        query: &[(String, String)],
        cursor: Option<&Cursor>,
    ) -> Result<RawResponse> {
        self.calls.lock().unwrap().push(Call {
            path: endpoint.to_string(),
            query: query.to_vec(),
            cursor: cursor.map(|c| c.as_str().to_string()),
            at: Instant::now(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PolyrestError::Transport("script exhausted".to_string())))
    }
}

fn ok(body: Value) -> Result<RawResponse> {
    Ok(RawResponse::new(200, serde_json::to_vec(&body).unwrap()))
}

fn ticker_page(symbols: &[&str], cursor: Option<&str>) -> Result<RawResponse> {
    let results: Vec<Value> = symbols
        .iter()
        .map(|symbol| json!({"ticker": symbol, "name": format!("{symbol} Inc.")}))
        .collect();
    let mut body = json!({
        "status": "OK",
        "request_id": "req",
        "count": symbols.len(),
        "results": results,
    });
    if let Some(cursor) = cursor {
        body["next_url"] = json!(format!("https://api.polygon.io/v3/reference/tickers?cursor={cursor}"));
    }
    ok(body)
}

fn throttled() -> Result<RawResponse> {
    Ok(RawResponse::new(429, r#"{"status":"ERROR","request_id":"slow"}"#)
        .with_retry_after(Duration::from_secs(1)))
}

fn service_with(transport: Arc<ScriptedTransport>, config: ClientConfig) -> StocksService {
    StocksService::new(RestClient::with_transport(&config, transport).unwrap())
}

fn service(transport: Arc<ScriptedTransport>) -> StocksService {
    service_with(transport, ClientConfig::with_api_key("test-key"))
}

async fn symbols(stream: futures::stream::BoxStream<'static, Result<polyrest_types::Ticker>>) -> Vec<String> {
    stream.map(|ticker| ticker.unwrap().symbol).collect().await
}

#[tokio::test]
async fn test_pages_are_concatenated_in_order() {
    let transport = ScriptedTransport::new(vec![
        ticker_page(&["A", "AA"], Some("C1")),
        ticker_page(&["AAA"], Some("C2")),
        ticker_page(&["AAAU", "AACG"], None),
    ]);
    let request = TickersRequest {
        market: Some("stocks".to_string()),
        order: Some(SortOrder::Asc),
        ..Default::default()
    };

    let items = symbols(service(transport.clone()).list_tickers(&request, CancellationToken::new())).await;

    assert_eq!(items, vec!["A", "AA", "AAA", "AAAU", "AACG"]);
    let calls = transport.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|call| call.path == "/v3/reference/tickers"));
    assert_eq!(
        calls.iter().map(|call| call.cursor.clone()).collect::<Vec<_>>(),
        vec![None, Some("C1".to_string()), Some("C2".to_string())]
    );
    // The request spec is resent unchanged with every page.
    assert!(calls.iter().all(|call| call.query == calls[0].query));
    assert!(calls[0].query.contains(&("market".to_string(), "stocks".to_string())));
}

#[tokio::test]
async fn test_nothing_is_fetched_until_polled() {
    let transport = ScriptedTransport::new(vec![ticker_page(&["A"], None)]);
    let stream = service(transport.clone()).list_tickers(&TickersRequest::default(), CancellationToken::new());

    assert!(transport.calls().is_empty());
    drop(stream);
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_failure_on_second_page_ends_stream() {
    let transport = ScriptedTransport::new(vec![
        ticker_page(&["A", "AA"], Some("C1")),
        Ok(RawResponse::new(
            403,
            r#"{"status":"NOT_AUTHORIZED","request_id":"r2","message":"Plan does not include this data"}"#,
        )),
        ticker_page(&["ZZZ"], None),
    ]);

    let results: Vec<Result<polyrest_types::Ticker>> = service(transport.clone())
        .list_tickers(&TickersRequest::default(), CancellationToken::new())
        .collect()
        .await;

    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok() && results[1].is_ok());
    match &results[2] {
        Err(PolyrestError::Api(err)) => {
            assert_eq!(err.status, "NOT_AUTHORIZED");
            assert_eq!(err.request_id.as_deref(), Some("r2"));
            assert_eq!(err.http_status, Some(403));
        }
        other => panic!("expected API error, got {other:?}"),
    }
    assert_eq!(transport.calls().len(), 2);
}

#[tokio::test]
async fn test_cancellation_stops_without_error() {
    let transport = ScriptedTransport::new(vec![
        ticker_page(&["A", "AA", "AAA"], Some("C1")),
        ticker_page(&["B"], None),
    ]);
    let cancel = CancellationToken::new();
    let mut stream = service(transport.clone()).list_tickers(&TickersRequest::default(), cancel.clone());

    assert_eq!(stream.next().await.unwrap().unwrap().symbol, "A");
    cancel.cancel();

    assert!(stream.next().await.is_none());
    assert_eq!(transport.calls().len(), 1);
}

/// Never answers within any test's lifetime.
#[derive(Debug)]
struct StalledTransport;

#[async_trait]
impl Transport for StalledTransport {
    async fn get(
        &self,
        _endpoint: &Endpoint,
        _query: &[(String, String)],
        _cursor: Option<&Cursor>,
    ) -> Result<RawResponse> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        ticker_page(&["LATE"], None)
    }
}

fn stalled_service() -> StocksService {
    let config = ClientConfig::with_api_key("test-key");
    StocksService::new(RestClient::with_transport(&config, Arc::new(StalledTransport)).unwrap())
}

fn cancel_after(delay: Duration) -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        token.cancel();
    });
    cancel
}

#[tokio::test(start_paused = true)]
async fn test_cancel_aborts_in_flight_page_request() {
    let start = Instant::now();
    let cancel = cancel_after(Duration::from_secs(1));

    let items: Vec<_> = stalled_service()
        .list_tickers(&TickersRequest::default(), cancel)
        .collect()
        .await;

    assert!(items.is_empty());
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_aborts_in_flight_single_request() {
    let start = Instant::now();
    let cancel = cancel_after(Duration::from_secs(1));

    let err = stalled_service()
        .get_ticker_details("AAPL", None, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, PolyrestError::Cancelled));
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_blank_ticker_rejected_before_any_request() {
    let transport = ScriptedTransport::new(vec![]);
    let service = service(transport.clone());
    let cancel = CancellationToken::new();

    let trades: Vec<_> = service
        .list_trades("  ", &TradesRequest::default(), cancel.clone())
        .collect()
        .await;
    assert_eq!(trades.len(), 1);
    assert!(matches!(
        trades[0],
        Err(PolyrestError::InvalidArgument { name: "ticker", .. })
    ));

    let details = service.get_ticker_details("", None, &cancel).await;
    assert!(matches!(details, Err(PolyrestError::InvalidArgument { .. })));

    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_zero_multiplier_rejected() {
    let transport = ScriptedTransport::new(vec![]);
    let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let request = AggregatesRequest::new(0, Timespan::Minute, DateRange::single_day(day));

    let bars: Vec<_> = service(transport.clone())
        .list_aggregates("AAPL", &request, CancellationToken::new())
        .collect()
        .await;

    assert!(matches!(
        bars[..],
        [Err(PolyrestError::InvalidArgument { name: "multiplier", .. })]
    ));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_page_bound_stops_repeating_cursor() {
    let transport = ScriptedTransport::new(
        (0..10).map(|_| ticker_page(&["LOOP"], Some("SAME"))).collect(),
    );
    let config = ClientConfig {
        max_pages: 3,
        ..ClientConfig::with_api_key("test-key")
    };

    let results: Vec<_> = service_with(transport.clone(), config)
        .list_tickers(&TickersRequest::default(), CancellationToken::new())
        .collect()
        .await;

    assert_eq!(results.len(), 4);
    assert!(matches!(
        results[3],
        Err(PolyrestError::PageLimitExceeded { pages: 3 })
    ));
    assert_eq!(transport.calls().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_throttling_retried_with_linear_backoff() {
    let transport = ScriptedTransport::new(vec![throttled(), throttled(), throttled(), throttled()]);

    let err = service(transport.clone())
        .get_ticker_details("AAPL", None, &CancellationToken::new())
        .await
        .unwrap_err();

    let api = err.api_error().unwrap();
    assert!(err.is_rate_limited());
    assert_eq!(api.retry_after, Some(Duration::from_secs(1)));
    assert_eq!(api.request_id.as_deref(), Some("slow"));

    let calls = transport.calls();
    assert_eq!(calls.len(), 4);
    let gaps: Vec<u128> = calls
        .windows(2)
        .map(|pair| pair[1].at.duration_since(pair[0].at).as_millis())
        .collect();
    for (gap, expected) in gaps.iter().zip([200, 400, 600]) {
        assert!((expected..expected + 50).contains(gap), "gap {gap}ms, expected {expected}ms");
    }
}

#[tokio::test(start_paused = true)]
async fn test_timeout_then_success() {
    let transport = ScriptedTransport::new(vec![
        Err(PolyrestError::Timeout {
            timeout: Duration::from_secs(30),
        }),
        ok(json!({
            "status": "OK",
            "request_id": "r1",
            "results": {"ticker": "AAPL", "name": "Apple Inc.", "list_date": "1980-12-12"}
        })),
    ]);

    let details = service(transport.clone())
        .get_ticker_details("AAPL", NaiveDate::from_ymd_opt(2024, 1, 2), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(details.symbol, "AAPL");
    assert_eq!(details.list_date, NaiveDate::from_ymd_opt(1980, 12, 12));
    let calls = transport.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].path, "/v3/reference/tickers/AAPL");
    assert_eq!(calls[0].query, vec![("date".to_string(), "2024-01-02".to_string())]);
}

#[tokio::test]
async fn test_server_errors_are_not_retried() {
    let transport = ScriptedTransport::new(vec![
        Ok(RawResponse::new(503, "Service Unavailable")),
        ticker_page(&["A"], None),
    ]);

    let err = service(transport.clone())
        .get_ticker_details("AAPL", None, &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PolyrestError::Transport(_)));
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn test_local_budget_fails_fast() {
    let transport = ScriptedTransport::new(vec![
        ticker_page(&["A"], Some("C1")),
        ticker_page(&["B"], Some("C2")),
        ticker_page(&["C"], None),
    ]);
    let config = ClientConfig {
        rate_limit_count: 2,
        rate_limit_window_seconds: 60,
        ..ClientConfig::with_api_key("test-key")
    };

    let results: Vec<_> = service_with(transport.clone(), config)
        .list_tickers(&TickersRequest::default(), CancellationToken::new())
        .collect()
        .await;

    assert_eq!(results.len(), 3);
    assert!(results[2].as_ref().unwrap_err().is_rate_limited());
    assert_eq!(transport.calls().len(), 2);
}

#[tokio::test]
async fn test_single_item_cancelled() {
    let transport = ScriptedTransport::new(vec![ticker_page(&["A"], None)]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = service(transport.clone())
        .get_ticker_details("AAPL", None, &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, PolyrestError::Cancelled));
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_aggregates_and_trades_paths() {
    let transport = ScriptedTransport::new(vec![
        ok(json!({
            "status": "OK",
            "request_id": "a1",
            "resultsCount": 1,
            "results": [{"v": 100.0, "o": 1.0, "c": 2.0, "h": 2.5, "l": 0.5, "t": 1704171600000_i64}]
        })),
        ok(json!({
            "status": "OK",
            "request_id": "t1",
            "count": 1,
            "results": [{"sip_timestamp": 1704171600000000000_i64, "price": 10.0, "size": 5}]
        })),
    ]);
    let service = service(transport.clone());
    let cancel = CancellationToken::new();
    let range = DateRange::new(
        NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
    )
    .unwrap();

    let bars: Vec<_> = service
        .list_aggregates("AAPL", &AggregatesRequest::new(1, Timespan::Hour, range), cancel.clone())
        .collect()
        .await;
    let trades: Vec<_> = service
        .list_trades("AAPL", &TradesRequest::default(), cancel)
        .collect()
        .await;

    assert_eq!(bars.len(), 1);
    assert!(bars[0].as_ref().unwrap().is_bullish());
    assert_eq!(trades.len(), 1);
    assert!((trades[0].as_ref().unwrap().notional() - 50.0).abs() < 1e-9);

    let calls = transport.calls();
    assert_eq!(calls[0].path, "/v2/aggs/ticker/AAPL/range/1/hour/2024-01-02/2024-01-05");
    assert_eq!(calls[1].path, "/v3/trades/AAPL");
}

#[tokio::test]
async fn test_concurrent_streams_share_budget() {
    let transport = ScriptedTransport::new(
        (0..4).map(|_| ticker_page(&["A"], None)).collect(),
    );
    let config = ClientConfig {
        rate_limit_count: 3,
        rate_limit_window_seconds: 60,
        ..ClientConfig::with_api_key("test-key")
    };
    let service = service_with(transport.clone(), config);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let stream = service.list_tickers(&TickersRequest::default(), CancellationToken::new());
            tokio::spawn(async move { stream.collect::<Vec<_>>().await })
        })
        .collect();

    let mut throttled = 0;
    for handle in handles {
        let results = handle.await.unwrap();
        if results.iter().any(|r| r.as_ref().is_err_and(PolyrestError::is_rate_limited)) {
            throttled += 1;
        }
    }

    assert_eq!(throttled, 1);
    assert_eq!(transport.calls().len(), 3);
}
