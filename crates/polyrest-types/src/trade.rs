//! Trade and aggregate bar records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::serde_util::from_epoch_nanos;

/// A single trade.
///
/// Timestamps are epoch nanoseconds as reported by the exchange feed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Trade {
    /// Ticker symbol.
    #[serde(rename = "T", default)]
    pub symbol: Option<String>,
    /// SIP timestamp in nanoseconds.
    #[serde(rename = "t", alias = "sip_timestamp")]
    pub timestamp_nanos: i64,
    /// Participant timestamp in nanoseconds.
    #[serde(rename = "y", alias = "participant_timestamp", default)]
    pub participant_timestamp_nanos: Option<i64>,
    /// TRF timestamp in nanoseconds.
    #[serde(rename = "f", alias = "trf_timestamp", default)]
    pub trf_timestamp_nanos: Option<i64>,
    /// Sequence number.
    #[serde(rename = "q", alias = "sequence_number", default)]
    pub sequence_number: Option<i64>,
    /// Trade identifier.
    #[serde(rename = "i", alias = "id", default)]
    pub trade_id: Option<String>,
    /// Exchange identifier.
    #[serde(rename = "x", alias = "exchange", default)]
    pub exchange_id: Option<i32>,
    /// Trade size.
    #[serde(rename = "s", alias = "size", default)]
    pub size: f64,
    /// Trade price.
    #[serde(rename = "p", alias = "price", default)]
    pub price: f64,
    /// Trade condition codes.
    #[serde(rename = "c", alias = "conditions", default)]
    pub conditions: Option<Vec<i32>>,
    /// Tape (1 = NYSE, 2 = AMEX, 3 = Nasdaq).
    #[serde(rename = "z", alias = "tape", default)]
    pub tape: Option<i32>,
    /// Trade reporting facility identifier.
    #[serde(rename = "r", alias = "trf_id", default)]
    pub trf_id: Option<i32>,
}

impl Trade {
    /// Returns the SIP timestamp truncated to millisecond precision.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        from_epoch_nanos(self.timestamp_nanos)
    }

    /// Returns the notional value of the trade.
    #[must_use]
    pub fn notional(&self) -> f64 {
        self.price * self.size
    }
}

/// An aggregate (OHLCV) bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    /// Ticker symbol.
    #[serde(rename = "T", default)]
    pub symbol: Option<String>,
    /// Start of the bar window.
    #[serde(rename = "t", with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Number of trades in the window.
    #[serde(rename = "n", default)]
    pub transactions: Option<u64>,
    /// Trading volume.
    #[serde(rename = "v")]
    pub volume: f64,
    /// Volume weighted average price.
    #[serde(rename = "vw", default)]
    pub vwap: Option<f64>,
    /// Open price.
    #[serde(rename = "o")]
    pub open: f64,
    /// Close price.
    #[serde(rename = "c")]
    pub close: f64,
    /// High price.
    #[serde(rename = "h")]
    pub high: f64,
    /// Low price.
    #[serde(rename = "l")]
    pub low: f64,
    /// Whether the bar is for an OTC ticker.
    #[serde(rename = "otc", default)]
    pub is_otc: Option<bool>,
}

impl Aggregate {
    /// Returns the price range (high - low).
    #[must_use]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Returns true if the bar closed above its open.
    #[must_use]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }
}
