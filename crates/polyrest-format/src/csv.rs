//! CSV output format.

use std::borrow::Cow;
use std::io::Write;

use crate::{FormatError, Formatter, Record};

/// CSV formatter.
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    /// Field delimiter (default: comma).
    delimiter: char,
    /// Whether to include header row.
    include_header: bool,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvFormatter {
    /// Creates a new CSV formatter with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: ',',
            include_header: true,
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether to include a header row.
    #[must_use]
    pub const fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    /// Creates a tab-separated values (TSV) formatter.
    #[must_use]
    pub const fn tsv() -> Self {
        Self {
            delimiter: '\t',
            include_header: true,
        }
    }

    /// Quotes a field if it contains the delimiter, a quote or a line break.
    fn escape<'a>(&self, field: &'a str) -> Cow<'a, str> {
        let needs_quotes = field
            .chars()
            .any(|c| c == self.delimiter || c == '"' || c == '\n' || c == '\r');
        if needs_quotes {
            Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
        } else {
            Cow::Borrowed(field)
        }
    }

    fn write_row<W: Write, S: AsRef<str>>(&self, writer: &mut W, fields: &[S]) -> Result<(), FormatError> {
        let mut delimiter = [0u8; 4];
        let delimiter = self.delimiter.encode_utf8(&mut delimiter).as_bytes();
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                writer.write_all(delimiter)?;
            }
            writer.write_all(self.escape(field.as_ref()).as_bytes())?;
        }
        writeln!(writer)?;
        Ok(())
    }
}

impl Formatter for CsvFormatter {
    fn write_records<T: Record, W: Write + Send>(
        &self,
        records: &[T],
        mut writer: W,
    ) -> Result<(), FormatError> {
        if self.include_header {
            self.write_row(&mut writer, T::COLUMNS)?;
        }

        for record in records {
            self.write_row(&mut writer, &record.values())?;
        }

        writer.flush()?;
        Ok(())
    }

    fn extension(&self) -> &str {
        if self.delimiter == '\t' { "tsv" } else { "csv" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use polyrest_types::{ShortInterest, Ticker};
    use std::io::Cursor;

    fn create_test_ticker() -> Ticker {
        Ticker {
            symbol: "BRK.A".to_string(),
            name: "Berkshire Hathaway, Inc. \"Class A\"".to_string(),
            active: Some(true),
            ..Default::default()
        }
    }

    #[test]
    fn test_csv_tickers() {
        let formatter = CsvFormatter::new();
        let mut output = Cursor::new(Vec::new());

        formatter
            .write_records(&[create_test_ticker()], &mut output)
            .unwrap();

        let result = String::from_utf8(output.into_inner()).unwrap();
        let mut lines = result.lines();
        assert!(lines.next().unwrap().starts_with("ticker,name,market"));
        assert_eq!(
            lines.next().unwrap(),
            "BRK.A,\"Berkshire Hathaway, Inc. \"\"Class A\"\"\",,,,,true,,,,,,"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_csv_no_header() {
        let formatter = CsvFormatter::new().with_header(false);
        let record = ShortInterest {
            ticker: Some("A".to_string()),
            settlement_date: NaiveDate::from_ymd_opt(2024, 1, 12),
            quantity: Some(1500),
            ..Default::default()
        };
        let mut output = Cursor::new(Vec::new());

        formatter.write_records(&[record], &mut output).unwrap();

        let result = String::from_utf8(output.into_inner()).unwrap();
        assert!(!result.contains("settlement_date"));
        assert!(result.starts_with("A,2024-01-12,1500,"));
    }

    #[test]
    fn test_tsv() {
        let formatter = CsvFormatter::tsv();
        let mut output = Cursor::new(Vec::new());

        formatter
            .write_records(&[create_test_ticker()], &mut output)
            .unwrap();

        let result = String::from_utf8(output.into_inner()).unwrap();
        assert!(result.contains("ticker\tname\tmarket"));
        assert!(result.contains("BRK.A\t\"Berkshire Hathaway, Inc. \"\"Class A\"\"\"\t"));
        assert_eq!(formatter.extension(), "tsv");
    }

    #[test]
    fn test_empty_input_writes_header_only() {
        let mut output = Cursor::new(Vec::new());
        CsvFormatter::new()
            .write_records::<Ticker, _>(&[], &mut output)
            .unwrap();
        assert_eq!(String::from_utf8(output.into_inner()).unwrap().lines().count(), 1);
    }
}
