//! Request pipeline for the polyrest market-data REST client.
//!
//! This crate provides everything between a typed operation and the network:
//!
//! - [`ClientConfig`] - Settings loaded from TOML and the environment
//! - [`Transport`] / [`HttpTransport`] - Single GET requests over `reqwest`
//! - [`ResiliencePolicy`] - Sliding-window rate limiting composed with retry
//! - [`paginate`] - Lazy cursor-driven streaming of paginated listings
//! - [`RestClient`] - Policy-wrapped requests and envelope decoding
//! - [`StocksService`] - Typed stock market operations

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/polyrest/polyrest/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
pub mod config;
mod paginate;
mod policy;
mod rate_limit;
mod retry;
mod service;
mod transport;
pub mod url;

pub use client::RestClient;
pub use config::{ClientConfig, ConfigError};
pub use paginate::paginate;
pub use policy::{ResiliencePolicy, rate_limited};
pub use rate_limit::RateLimiter;
pub use retry::{BASE_RETRY_DELAY, RetryPolicy};
pub use service::StocksService;
pub use transport::{HttpTransport, RawResponse, TOO_MANY_REQUESTS, Transport};
pub use url::Endpoint;
