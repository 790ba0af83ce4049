//! Short selling records.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily short sale volume for one ticker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShortVolume {
    /// Ticker symbol.
    #[serde(default)]
    pub ticker: Option<String>,
    /// Trading date.
    #[serde(default, with = "crate::serde_util::optional_date")]
    pub date: Option<NaiveDate>,
    /// Total reported volume.
    #[serde(default)]
    pub total_volume: Option<u64>,
    /// Short sale volume.
    #[serde(rename = "short_volume", default)]
    pub volume: Option<u64>,
    /// Short volume as a percentage of total volume.
    #[serde(rename = "short_volume_ratio", default)]
    pub volume_ratio: Option<f64>,
    /// Non-exempt short volume.
    #[serde(default)]
    pub non_exempt_volume: Option<u64>,
    /// Exempt short volume.
    #[serde(default)]
    pub exempt_volume: Option<u64>,
    /// NYSE short volume.
    #[serde(rename = "nyse_short_volume", default)]
    pub nyse_volume: Option<u64>,
    /// NYSE exempt short volume.
    #[serde(rename = "nyse_short_volume_exempt", default)]
    pub nyse_volume_exempt: Option<u64>,
    /// Nasdaq Carteret short volume.
    #[serde(rename = "nasdaq_carteret_short_volume", default)]
    pub nasdaq_carteret_volume: Option<u64>,
    /// Nasdaq Carteret exempt short volume.
    #[serde(rename = "nasdaq_carteret_short_volume_exempt", default)]
    pub nasdaq_carteret_volume_exempt: Option<u64>,
    /// Nasdaq Chicago short volume.
    #[serde(rename = "nasdaq_chicago_short_volume", default)]
    pub nasdaq_chicago_volume: Option<u64>,
    /// Nasdaq Chicago exempt short volume.
    #[serde(rename = "nasdaq_chicago_short_volume_exempt", default)]
    pub nasdaq_chicago_volume_exempt: Option<u64>,
    /// FINRA ADF short volume.
    #[serde(rename = "adf_short_volume", default)]
    pub adf_volume: Option<u64>,
    /// FINRA ADF exempt short volume.
    #[serde(rename = "adf_short_volume_exempt", default)]
    pub adf_volume_exempt: Option<u64>,
}

/// Short interest reported for one settlement date.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShortInterest {
    /// Ticker symbol.
    #[serde(default)]
    pub ticker: Option<String>,
    /// SEC central index key.
    #[serde(default)]
    pub cik: Option<String>,
    /// Settlement date of the report.
    #[serde(default, with = "crate::serde_util::optional_date")]
    pub settlement_date: Option<NaiveDate>,
    /// Shares sold short.
    #[serde(rename = "short_interest", default)]
    pub quantity: Option<i64>,
    /// Change since the previous report.
    #[serde(rename = "short_interest_change", default)]
    pub change: Option<i64>,
    /// Percentage change since the previous report.
    #[serde(rename = "short_interest_change_percent", default)]
    pub change_percent: Option<f64>,
    /// Average daily trading volume.
    #[serde(default)]
    pub average_daily_volume: Option<i64>,
    /// Days needed to cover the short position.
    #[serde(default)]
    pub days_to_cover: Option<f64>,
    /// Shares outstanding.
    #[serde(default)]
    pub shares_outstanding: Option<i64>,
    /// Short interest as a percentage of shares outstanding.
    #[serde(rename = "short_interest_percent_of_shares_outstanding", default)]
    pub percent_of_shares_outstanding: Option<f64>,
    /// Free float shares.
    #[serde(default)]
    pub float_shares: Option<i64>,
    /// Short interest as a percentage of the float.
    #[serde(rename = "short_interest_percent_of_float", default)]
    pub percent_of_float: Option<f64>,
}
