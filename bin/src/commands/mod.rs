//! CLI command implementations.

pub(crate) mod market;
pub(crate) mod short;
pub(crate) mod tickers;
