//! Output formatters for the polyrest market-data REST client.
//!
//! This crate provides formatters for writing fetched records to various
//! output formats:
//!
//! - [`CsvFormatter`] - CSV/TSV format
//! - [`JsonFormatter`] - JSON array or NDJSON format
//!
//! Every record type implements [`Record`], which gives it a fixed column
//! layout for tabular output.

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/polyrest/polyrest/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod csv;
mod formatter;
mod json;
mod record;

pub use crate::csv::CsvFormatter;
pub use formatter::{FormatError, Formatter, OutputFormat};
pub use json::{JsonFormatter, JsonStyle};
pub use record::Record;
