//! Ticker reference records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A ticker from the reference listing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ticker {
    /// Ticker symbol.
    #[serde(rename = "ticker", default)]
    pub symbol: String,
    /// Company or asset name.
    #[serde(default)]
    pub name: String,
    /// Market type.
    #[serde(default)]
    pub market: Option<String>,
    /// Locale (`us`, `global`).
    #[serde(default)]
    pub locale: Option<String>,
    /// Primary listing exchange.
    #[serde(default)]
    pub primary_exchange: Option<String>,
    /// Security type.
    #[serde(rename = "type", default)]
    pub ticker_type: Option<String>,
    /// Whether the ticker is actively traded.
    #[serde(default)]
    pub active: Option<bool>,
    /// Trading currency.
    #[serde(default)]
    pub currency_name: Option<String>,
    /// SEC central index key.
    #[serde(default)]
    pub cik: Option<String>,
    /// Composite OpenFIGI.
    #[serde(default)]
    pub composite_figi: Option<String>,
    /// Share class OpenFIGI.
    #[serde(default)]
    pub share_class_figi: Option<String>,
    /// Last time the record was updated.
    #[serde(
        rename = "last_updated_utc",
        default,
        with = "crate::serde_util::optional_timestamp"
    )]
    pub last_updated: Option<DateTime<Utc>>,
    /// When the ticker was delisted.
    #[serde(
        rename = "delisted_utc",
        default,
        with = "crate::serde_util::optional_timestamp"
    )]
    pub delisted: Option<DateTime<Utc>>,
}

/// Company headquarters address.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TickerAddress {
    /// First address line.
    #[serde(default)]
    pub address1: Option<String>,
    /// City.
    #[serde(default)]
    pub city: Option<String>,
    /// State or region.
    #[serde(default)]
    pub state: Option<String>,
    /// Postal code.
    #[serde(default)]
    pub postal_code: Option<String>,
}

/// Branding assets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TickerBranding {
    /// Logo URL.
    #[serde(default)]
    pub logo_url: Option<String>,
    /// Icon URL.
    #[serde(default)]
    pub icon_url: Option<String>,
}

/// Detailed information about one ticker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TickerDetails {
    /// Ticker symbol.
    #[serde(rename = "ticker", default)]
    pub symbol: String,
    /// Company or asset name.
    #[serde(default)]
    pub name: String,
    /// Market type.
    #[serde(default)]
    pub market: Option<String>,
    /// Locale.
    #[serde(default)]
    pub locale: Option<String>,
    /// Primary listing exchange.
    #[serde(default)]
    pub primary_exchange: Option<String>,
    /// Security type.
    #[serde(rename = "type", default)]
    pub ticker_type: Option<String>,
    /// Whether the ticker is actively traded.
    #[serde(default)]
    pub active: Option<bool>,
    /// Trading currency.
    #[serde(default)]
    pub currency_name: Option<String>,
    /// Business description.
    #[serde(default)]
    pub description: Option<String>,
    /// Company homepage.
    #[serde(default)]
    pub homepage_url: Option<String>,
    /// Number of employees.
    #[serde(default)]
    pub total_employees: Option<u64>,
    /// First listing date.
    #[serde(default, with = "crate::serde_util::optional_date")]
    pub list_date: Option<NaiveDate>,
    /// Branding assets.
    #[serde(default)]
    pub branding: Option<TickerBranding>,
    /// Market capitalisation.
    #[serde(default)]
    pub market_cap: Option<f64>,
    /// Weighted shares outstanding.
    #[serde(default)]
    pub weighted_shares_outstanding: Option<u64>,
    /// Shares outstanding for this share class.
    #[serde(default)]
    pub share_class_shares_outstanding: Option<u64>,
    /// Headquarters address.
    #[serde(default)]
    pub address: Option<TickerAddress>,
    /// Phone number.
    #[serde(default)]
    pub phone_number: Option<String>,
    /// Standard industrial classification code.
    #[serde(default)]
    pub sic_code: Option<String>,
    /// SIC description.
    #[serde(default)]
    pub sic_description: Option<String>,
    /// Root of the ticker (e.g. `BRK` for `BRK.A`).
    #[serde(default)]
    pub ticker_root: Option<String>,
}
