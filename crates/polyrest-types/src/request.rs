//! Request specs: filter, sort and limit parameters for one logical query.
//!
//! A request spec is immutable for the lifetime of a paginated fetch; only the
//! cursor changes between pages. Range filters use the API's dotted names
//! (`ticker.gte`, `date.lt`, ...) and `any_of` filters are sent comma separated.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{DateRange, PolyrestError, Result, Timespan};

/// Parameters of one logical query, encodable as URL query pairs.
pub trait RequestSpec: Serialize {
    /// Encodes the spec as `(name, value)` query pairs sorted by name.
    ///
    /// Unset filters are omitted.
    ///
    /// # Errors
    ///
    /// Returns [`PolyrestError::Encode`] if the spec contains nested objects.
    fn to_query(&self) -> Result<Vec<(String, String)>> {
        query_pairs(self)
    }
}

/// Encodes any serializable value as query pairs, sorted by name.
///
/// # Errors
///
/// Returns [`PolyrestError::Encode`] if the value is not a flat map.
pub fn query_pairs<S: Serialize + ?Sized>(spec: &S) -> Result<Vec<(String, String)>> {
    let value = serde_json::to_value(spec).map_err(|e| PolyrestError::Encode(e.to_string()))?;
    let map = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) => map,
        other => {
            return Err(PolyrestError::Encode(format!(
                "request spec must be a map, got {other}"
            )));
        }
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        if let Some(text) = encode_value(&key, value)? {
            pairs.push((key, text));
        }
    }
    Ok(pairs)
}

fn encode_value(key: &str, value: Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text)),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        Value::Number(number) => Ok(Some(number.to_string())),
        Value::Array(items) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                if let Some(part) = encode_value(key, item)? {
                    parts.push(part);
                }
            }
            Ok((!parts.is_empty()).then(|| parts.join(",")))
        }
        Value::Object(_) => Err(PolyrestError::Encode(format!(
            "`{key}` cannot be a nested object"
        ))),
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// Filters for the ticker reference listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickersRequest {
    /// Exact ticker symbol.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    /// Tickers greater than.
    #[serde(rename = "ticker.gt", skip_serializing_if = "Option::is_none")]
    pub ticker_gt: Option<String>,
    /// Tickers greater than or equal.
    #[serde(rename = "ticker.gte", skip_serializing_if = "Option::is_none")]
    pub ticker_gte: Option<String>,
    /// Tickers less than.
    #[serde(rename = "ticker.lt", skip_serializing_if = "Option::is_none")]
    pub ticker_lt: Option<String>,
    /// Tickers less than or equal.
    #[serde(rename = "ticker.lte", skip_serializing_if = "Option::is_none")]
    pub ticker_lte: Option<String>,
    /// Security type (e.g. `CS`, `ETF`).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub ticker_type: Option<String>,
    /// Market (`stocks`, `crypto`, `fx`, `otc`, `indices`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market: Option<String>,
    /// Primary exchange MIC.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    /// CUSIP code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cusip: Option<String>,
    /// SEC central index key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cik: Option<String>,
    /// Point-in-time date.
    #[serde(
        with = "crate::serde_util::optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<NaiveDate>,
    /// Free-text search on ticker and name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Only active (or only inactive) tickers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// Sort direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Field to sort by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl RequestSpec for TickersRequest {}

/// Filters for the daily short volume listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShortVolumeRequest {
    /// Exact ticker symbol.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    /// Any of these tickers.
    #[serde(rename = "ticker.any_of", skip_serializing_if = "Vec::is_empty")]
    pub ticker_any_of: Vec<String>,
    /// Tickers greater than.
    #[serde(rename = "ticker.gt", skip_serializing_if = "Option::is_none")]
    pub ticker_gt: Option<String>,
    /// Tickers greater than or equal.
    #[serde(rename = "ticker.gte", skip_serializing_if = "Option::is_none")]
    pub ticker_gte: Option<String>,
    /// Tickers less than.
    #[serde(rename = "ticker.lt", skip_serializing_if = "Option::is_none")]
    pub ticker_lt: Option<String>,
    /// Tickers less than or equal.
    #[serde(rename = "ticker.lte", skip_serializing_if = "Option::is_none")]
    pub ticker_lte: Option<String>,
    /// Exact trading date.
    #[serde(
        with = "crate::serde_util::optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<NaiveDate>,
    /// Any of these trading dates.
    #[serde(rename = "date.any_of", skip_serializing_if = "Vec::is_empty")]
    pub date_any_of: Vec<NaiveDate>,
    /// Dates after.
    #[serde(
        rename = "date.gt",
        with = "crate::serde_util::optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_gt: Option<NaiveDate>,
    /// Dates on or after.
    #[serde(
        rename = "date.gte",
        with = "crate::serde_util::optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_gte: Option<NaiveDate>,
    /// Dates before.
    #[serde(
        rename = "date.lt",
        with = "crate::serde_util::optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_lt: Option<NaiveDate>,
    /// Dates on or before.
    #[serde(
        rename = "date.lte",
        with = "crate::serde_util::optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_lte: Option<NaiveDate>,
    /// Exact short volume ratio.
    #[serde(rename = "short_volume_ratio", skip_serializing_if = "Option::is_none")]
    pub volume_ratio: Option<f64>,
    /// Short volume ratio greater than.
    #[serde(rename = "short_volume_ratio.gt", skip_serializing_if = "Option::is_none")]
    pub volume_ratio_gt: Option<f64>,
    /// Short volume ratio greater than or equal.
    #[serde(rename = "short_volume_ratio.gte", skip_serializing_if = "Option::is_none")]
    pub volume_ratio_gte: Option<f64>,
    /// Short volume ratio less than.
    #[serde(rename = "short_volume_ratio.lt", skip_serializing_if = "Option::is_none")]
    pub volume_ratio_lt: Option<f64>,
    /// Short volume ratio less than or equal.
    #[serde(rename = "short_volume_ratio.lte", skip_serializing_if = "Option::is_none")]
    pub volume_ratio_lte: Option<f64>,
    /// Exact total volume.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_volume: Option<u64>,
    /// Total volume greater than.
    #[serde(rename = "total_volume.gt", skip_serializing_if = "Option::is_none")]
    pub total_volume_gt: Option<u64>,
    /// Total volume greater than or equal.
    #[serde(rename = "total_volume.gte", skip_serializing_if = "Option::is_none")]
    pub total_volume_gte: Option<u64>,
    /// Total volume less than.
    #[serde(rename = "total_volume.lt", skip_serializing_if = "Option::is_none")]
    pub total_volume_lt: Option<u64>,
    /// Total volume less than or equal.
    #[serde(rename = "total_volume.lte", skip_serializing_if = "Option::is_none")]
    pub total_volume_lte: Option<u64>,
    /// Sort direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Field to sort by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl RequestSpec for ShortVolumeRequest {}

/// Filters for the bi-monthly short interest listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShortInterestRequest {
    /// Exact ticker symbol.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    /// Any of these tickers.
    #[serde(rename = "ticker.any_of", skip_serializing_if = "Vec::is_empty")]
    pub ticker_any_of: Vec<String>,
    /// Tickers greater than.
    #[serde(rename = "ticker.gt", skip_serializing_if = "Option::is_none")]
    pub ticker_gt: Option<String>,
    /// Tickers greater than or equal.
    #[serde(rename = "ticker.gte", skip_serializing_if = "Option::is_none")]
    pub ticker_gte: Option<String>,
    /// Tickers less than.
    #[serde(rename = "ticker.lt", skip_serializing_if = "Option::is_none")]
    pub ticker_lt: Option<String>,
    /// Tickers less than or equal.
    #[serde(rename = "ticker.lte", skip_serializing_if = "Option::is_none")]
    pub ticker_lte: Option<String>,
    /// SEC central index key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cik: Option<String>,
    /// Any of these central index keys.
    #[serde(rename = "cik.any_of", skip_serializing_if = "Vec::is_empty")]
    pub cik_any_of: Vec<String>,
    /// Exact settlement date.
    #[serde(
        with = "crate::serde_util::optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub settlement_date: Option<NaiveDate>,
    /// Settlement dates after.
    #[serde(
        rename = "settlement_date.gt",
        with = "crate::serde_util::optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub settlement_date_gt: Option<NaiveDate>,
    /// Settlement dates on or after.
    #[serde(
        rename = "settlement_date.gte",
        with = "crate::serde_util::optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub settlement_date_gte: Option<NaiveDate>,
    /// Settlement dates before.
    #[serde(
        rename = "settlement_date.lt",
        with = "crate::serde_util::optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub settlement_date_lt: Option<NaiveDate>,
    /// Settlement dates on or before.
    #[serde(
        rename = "settlement_date.lte",
        with = "crate::serde_util::optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub settlement_date_lte: Option<NaiveDate>,
    /// Sort direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Field to sort by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl RequestSpec for ShortInterestRequest {}

/// Filters for the trade listing of one ticker.
///
/// Timestamp filters accept a `yyyy-MM-dd` date or epoch nanoseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TradesRequest {
    /// Exact timestamp or date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Timestamps after.
    #[serde(rename = "timestamp.gt", skip_serializing_if = "Option::is_none")]
    pub timestamp_gt: Option<String>,
    /// Timestamps at or after.
    #[serde(rename = "timestamp.gte", skip_serializing_if = "Option::is_none")]
    pub timestamp_gte: Option<String>,
    /// Timestamps before.
    #[serde(rename = "timestamp.lt", skip_serializing_if = "Option::is_none")]
    pub timestamp_lt: Option<String>,
    /// Timestamps at or before.
    #[serde(rename = "timestamp.lte", skip_serializing_if = "Option::is_none")]
    pub timestamp_lte: Option<String>,
    /// Sort direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Field to sort by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl RequestSpec for TradesRequest {}

/// Aggregate bar query for one ticker.
///
/// Bar size and date range are part of the URL path and are never sent as
/// query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregatesRequest {
    /// Number of timespans per bar.
    #[serde(skip)]
    pub multiplier: u32,
    /// Bar unit.
    #[serde(skip)]
    pub timespan: Timespan,
    /// Inclusive date range.
    #[serde(skip)]
    pub range: DateRange,
    /// Whether results are adjusted for splits.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjusted: Option<bool>,
    /// Sort by timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortOrder>,
    /// Maximum number of base aggregates queried.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl AggregatesRequest {
    /// Creates a request for `multiplier` x `timespan` bars over `range`.
    #[must_use]
    pub const fn new(multiplier: u32, timespan: Timespan, range: DateRange) -> Self {
        Self {
            multiplier,
            timespan,
            range,
            adjusted: None,
            sort: None,
            limit: None,
        }
    }
}

impl RequestSpec for AggregatesRequest {}
