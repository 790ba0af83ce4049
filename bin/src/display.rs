//! Display utilities and output formatting for the polyrest CLI.

use anyhow::{Context, Result};
use clap::ValueEnum;
use futures::StreamExt;
use futures::stream::BoxStream;
use indicatif::{ProgressBar, ProgressStyle};
use polyrest_lib::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Output format for fetched records.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum Format {
    Csv,
    Tsv,
    Json,
    Ndjson,
}

impl Format {
    /// Returns the file extension for this format.
    pub(crate) const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Tsv => "tsv",
            Self::Json => "json",
            Self::Ndjson => "ndjson",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Sort direction accepted on the command line.
#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum Order {
    Asc,
    Desc,
}

impl From<Order> for SortOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Asc => Self::Asc,
            Order::Desc => Self::Desc,
        }
    }
}

/// Where and how records are written.
pub(crate) struct Output {
    pub(crate) format: Format,
    pub(crate) path: Option<PathBuf>,
    pub(crate) max_items: Option<usize>,
    pub(crate) quiet: bool,
}

/// Drains a record stream behind a spinner.
///
/// Stops early once `max_items` records were read; dropping the stream at
/// that point means no further pages are requested. A cancelled stream ends
/// quietly and whatever was fetched so far is kept.
pub(crate) async fn collect<T>(
    mut stream: BoxStream<'static, polyrest_lib::Result<T>>,
    output: &Output,
    label: &str,
    cancel: &CancellationToken,
) -> Result<Vec<T>> {
    let progress = if output.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} {msg}")
                .context("Invalid progress template")?,
        );
        pb.set_message(label.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    };

    let mut records = Vec::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(record) => {
                records.push(record);
                progress.inc(1);
            }
            Err(err) => {
                progress.abandon_with_message(format!("Failed after {} {label}", records.len()));
                return Err(err).with_context(|| format!("Failed to fetch {label}"));
            }
        }
        if output.max_items.is_some_and(|max| records.len() >= max) {
            break;
        }
    }

    let finish_msg = if cancel.is_cancelled() {
        format!("Cancelled after {} {label}", records.len())
    } else {
        format!("Fetched {} {label}", records.len())
    };
    progress.finish_with_message(finish_msg);

    Ok(records)
}

/// Write records to the output file, or stdout when none was given.
pub(crate) fn write_records<T: Record>(records: &[T], output: &Output) -> Result<()> {
    match &output.path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_with(records, BufWriter::new(file), output.format)?;
            if !output.quiet {
                eprintln!("Output written to: {} ({})", path.display(), output.format);
            }
        }
        None => write_with(records, BufWriter::new(std::io::stdout()), output.format)?,
    }
    Ok(())
}

fn write_with<T: Record, W: Write + Send>(records: &[T], writer: W, format: Format) -> Result<()> {
    match format {
        Format::Csv => CsvFormatter::new().write_records(records, writer)?,
        Format::Tsv => CsvFormatter::tsv().write_records(records, writer)?,
        Format::Json => JsonFormatter::new().write_records(records, writer)?,
        Format::Ndjson => JsonFormatter::ndjson().write_records(records, writer)?,
    }
    Ok(())
}
