//! Tabular views of the record types.

use chrono::{DateTime, NaiveDate, Utc};
use polyrest_types::{
    Aggregate, ShortInterest, ShortVolume, Ticker, TickerDetails, Trade, serde_util::DATE_FORMAT,
};
use serde::Serialize;
use std::fmt::Display;

/// A record that can be written as one row of a table.
pub trait Record: Serialize + Sync {
    /// Column names, in row order.
    const COLUMNS: &'static [&'static str];

    /// Cell values, one per column. Missing values are empty strings.
    fn values(&self) -> Vec<String>;
}

fn opt<T: Display>(value: Option<&T>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}

fn date(value: Option<NaiveDate>) -> String {
    value
        .map(|date| date.format(DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value
        .map(|ts| ts.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
        .unwrap_or_default()
}

impl Record for Ticker {
    const COLUMNS: &'static [&'static str] = &[
        "ticker",
        "name",
        "market",
        "locale",
        "primary_exchange",
        "type",
        "active",
        "currency_name",
        "cik",
        "composite_figi",
        "share_class_figi",
        "last_updated_utc",
        "delisted_utc",
    ];

    fn values(&self) -> Vec<String> {
        vec![
            self.symbol.clone(),
            self.name.clone(),
            opt(self.market.as_ref()),
            opt(self.locale.as_ref()),
            opt(self.primary_exchange.as_ref()),
            opt(self.ticker_type.as_ref()),
            opt(self.active.as_ref()),
            opt(self.currency_name.as_ref()),
            opt(self.cik.as_ref()),
            opt(self.composite_figi.as_ref()),
            opt(self.share_class_figi.as_ref()),
            timestamp(self.last_updated),
            timestamp(self.delisted),
        ]
    }
}

impl Record for TickerDetails {
    const COLUMNS: &'static [&'static str] = &[
        "ticker",
        "name",
        "market",
        "primary_exchange",
        "type",
        "active",
        "list_date",
        "market_cap",
        "total_employees",
        "weighted_shares_outstanding",
        "sic_code",
        "sic_description",
        "homepage_url",
        "city",
        "state",
    ];

    fn values(&self) -> Vec<String> {
        let address = self.address.as_ref();
        vec![
            self.symbol.clone(),
            self.name.clone(),
            opt(self.market.as_ref()),
            opt(self.primary_exchange.as_ref()),
            opt(self.ticker_type.as_ref()),
            opt(self.active.as_ref()),
            date(self.list_date),
            opt(self.market_cap.as_ref()),
            opt(self.total_employees.as_ref()),
            opt(self.weighted_shares_outstanding.as_ref()),
            opt(self.sic_code.as_ref()),
            opt(self.sic_description.as_ref()),
            opt(self.homepage_url.as_ref()),
            opt(address.and_then(|a| a.city.as_ref())),
            opt(address.and_then(|a| a.state.as_ref())),
        ]
    }
}

impl Record for ShortVolume {
    const COLUMNS: &'static [&'static str] = &[
        "ticker",
        "date",
        "total_volume",
        "short_volume",
        "short_volume_ratio",
        "exempt_volume",
        "non_exempt_volume",
        "nyse_short_volume",
        "nasdaq_carteret_short_volume",
        "nasdaq_chicago_short_volume",
        "adf_short_volume",
    ];

    fn values(&self) -> Vec<String> {
        vec![
            opt(self.ticker.as_ref()),
            date(self.date),
            opt(self.total_volume.as_ref()),
            opt(self.volume.as_ref()),
            opt(self.volume_ratio.as_ref()),
            opt(self.exempt_volume.as_ref()),
            opt(self.non_exempt_volume.as_ref()),
            opt(self.nyse_volume.as_ref()),
            opt(self.nasdaq_carteret_volume.as_ref()),
            opt(self.nasdaq_chicago_volume.as_ref()),
            opt(self.adf_volume.as_ref()),
        ]
    }
}

impl Record for ShortInterest {
    const COLUMNS: &'static [&'static str] = &[
        "ticker",
        "settlement_date",
        "short_interest",
        "short_interest_change",
        "short_interest_change_percent",
        "average_daily_volume",
        "days_to_cover",
        "shares_outstanding",
        "float_shares",
    ];

    fn values(&self) -> Vec<String> {
        vec![
            opt(self.ticker.as_ref()),
            date(self.settlement_date),
            opt(self.quantity.as_ref()),
            opt(self.change.as_ref()),
            opt(self.change_percent.as_ref()),
            opt(self.average_daily_volume.as_ref()),
            opt(self.days_to_cover.as_ref()),
            opt(self.shares_outstanding.as_ref()),
            opt(self.float_shares.as_ref()),
        ]
    }
}

impl Record for Trade {
    const COLUMNS: &'static [&'static str] = &[
        "timestamp",
        "price",
        "size",
        "exchange",
        "conditions",
        "tape",
        "sequence_number",
        "id",
    ];

    fn values(&self) -> Vec<String> {
        let conditions = self
            .conditions
            .as_ref()
            .map(|codes| {
                codes
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .unwrap_or_default();
        vec![
            timestamp(self.timestamp()),
            self.price.to_string(),
            self.size.to_string(),
            opt(self.exchange_id.as_ref()),
            conditions,
            opt(self.tape.as_ref()),
            opt(self.sequence_number.as_ref()),
            opt(self.trade_id.as_ref()),
        ]
    }
}

impl Record for Aggregate {
    const COLUMNS: &'static [&'static str] = &[
        "timestamp",
        "open",
        "high",
        "low",
        "close",
        "volume",
        "vwap",
        "transactions",
    ];

    fn values(&self) -> Vec<String> {
        vec![
            timestamp(Some(self.timestamp)),
            self.open.to_string(),
            self.high.to_string(),
            self.low.to_string(),
            self.close.to_string(),
            self.volume.to_string(),
            opt(self.vwap.as_ref()),
            opt(self.transactions.as_ref()),
        ]
    }
}
