//! Aggregate bar timespans.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Size unit of an aggregate bar; combined with a multiplier (e.g. 5 x minute).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Timespan {
    /// Second bars.
    Second,
    /// Minute bars.
    Minute,
    /// Hour bars.
    Hour,
    /// Daily bars.
    #[default]
    Day,
    /// Weekly bars.
    Week,
    /// Monthly bars.
    Month,
    /// Quarterly bars.
    Quarter,
    /// Yearly bars.
    Year,
}

impl Timespan {
    /// Returns the identifier used in aggregate URLs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }

    /// Returns all available timespans.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Second,
            Self::Minute,
            Self::Hour,
            Self::Day,
            Self::Week,
            Self::Month,
            Self::Quarter,
            Self::Year,
        ]
    }
}

impl std::fmt::Display for Timespan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Timespan {
    type Err = TimespanParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "s" | "sec" | "second" => Ok(Self::Second),
            "m" | "min" | "minute" => Ok(Self::Minute),
            "h" | "hour" => Ok(Self::Hour),
            "d" | "day" | "daily" => Ok(Self::Day),
            "w" | "week" | "weekly" => Ok(Self::Week),
            "mo" | "month" | "monthly" => Ok(Self::Month),
            "q" | "quarter" => Ok(Self::Quarter),
            "y" | "year" | "yearly" => Ok(Self::Year),
            _ => Err(TimespanParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid timespan string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimespanParseError(String);

impl std::fmt::Display for TimespanParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid timespan '{}', expected one of: second, minute, hour, day, week, month, quarter, year",
            self.0
        )
    }
}

impl std::error::Error for TimespanParseError {}
