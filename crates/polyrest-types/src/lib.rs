//! Core types for the polyrest market-data REST client.
//!
//! This crate provides the data structures shared by the polyrest crates:
//!
//! - [`Envelope`] - Generic response wrapper and its classification into a [`Page`]
//! - [`Cursor`] - Opaque pagination token extracted from `next_url`
//! - [`PolyrestError`] / [`ApiError`] - Error taxonomy
//! - [`RequestSpec`] - Filter/sort/limit parameters for one logical query
//! - [`Ticker`], [`TickerDetails`], [`ShortVolume`], [`ShortInterest`], [`Trade`],
//!   [`Aggregate`] - Record types

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/polyrest/polyrest/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cursor;
mod date_range;
mod envelope;
mod error;
mod request;
pub mod serde_util;
mod short_data;
mod ticker;
mod timespan;
mod trade;

pub use cursor::{CURSOR_PARAM, Cursor};
pub use date_range::DateRange;
pub use envelope::{Envelope, Page, SUCCESS_STATUSES};
pub use error::{
    ApiError, DEFAULT_ERROR_MESSAGE, DateRangeError, PolyrestError, RATE_LIMIT_STATUS, Result,
};
pub use request::{
    AggregatesRequest, RequestSpec, ShortInterestRequest, ShortVolumeRequest, SortOrder,
    TickersRequest, TradesRequest, query_pairs,
};
pub use short_data::{ShortInterest, ShortVolume};
pub use ticker::{Ticker, TickerAddress, TickerBranding, TickerDetails};
pub use timespan::{Timespan, TimespanParseError};
pub use trade::{Aggregate, Trade};
