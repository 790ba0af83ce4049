//! Error types for polyrest.

use chrono::NaiveDate;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for polyrest operations.
pub type Result<T> = std::result::Result<T, PolyrestError>;

/// Message used when a failed envelope carries no message of its own.
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred while processing the API request";

/// Status reported by errors raised for rate limiting.
pub const RATE_LIMIT_STATUS: &str = "RATE_LIMIT";

/// Errors that can occur while talking to the API.
#[derive(Error, Debug)]
pub enum PolyrestError {
    /// A required argument was missing or blank.
    #[error("Invalid argument `{name}`: {reason}")]
    InvalidArgument {
        /// Name of the offending argument.
        name: &'static str,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Network or connection failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out after {timeout:?}")]
    Timeout {
        /// The configured request timeout.
        timeout: Duration,
    },

    /// The API (or the local rate limiter) refused the request.
    #[error("Rate limited: {0}")]
    RateLimited(ApiError),

    /// The API answered with a non-success envelope.
    #[error("API error: {0}")]
    Api(ApiError),

    /// A successful response body did not match the envelope shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A request spec could not be encoded as query parameters.
    #[error("Encode error: {0}")]
    Encode(String),

    /// The pagination safety bound was reached.
    #[error("Pagination stopped after {pages} pages")]
    PageLimitExceeded {
        /// Number of pages fetched before stopping.
        pages: u32,
    },

    /// A single-item operation was cancelled before it completed.
    #[error("Operation cancelled")]
    Cancelled,

    /// Invalid date range.
    #[error(transparent)]
    DateRange(#[from] DateRangeError),
}

impl PolyrestError {
    /// Returns the API error details when this error came from the API.
    #[must_use]
    pub const fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::RateLimited(err) | Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Returns true if the error was caused by rate limiting.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}

/// Details of a failed API request.
///
/// Carries everything needed to correlate the failure with API-side logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} ({})", self.details())]
pub struct ApiError {
    /// Human readable message.
    pub message: String,
    /// Status string reported by the API.
    pub status: String,
    /// Request identifier, if the API returned one.
    pub request_id: Option<String>,
    /// HTTP status code, when known.
    pub http_status: Option<u16>,
    /// How long to wait before retrying (rate-limit errors only).
    pub retry_after: Option<Duration>,
}

impl ApiError {
    /// Creates an error with the given message and status.
    #[must_use]
    pub fn new(message: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: status.into(),
            request_id: None,
            http_status: None,
            retry_after: None,
        }
    }

    /// Creates a rate-limit error.
    #[must_use]
    pub fn rate_limited(retry_after: Option<Duration>) -> Self {
        Self {
            retry_after,
            ..Self::new("Rate limit exceeded.", RATE_LIMIT_STATUS)
        }
    }

    /// Sets the request id. Blank ids are dropped.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        let request_id = request_id.into();
        self.request_id = (!request_id.trim().is_empty()).then_some(request_id);
        self
    }

    /// Sets the HTTP status code.
    #[must_use]
    pub const fn with_http_status(mut self, http_status: u16) -> Self {
        self.http_status = Some(http_status);
        self
    }

    fn details(&self) -> String {
        let mut details = format!("status: {}", self.status);
        if let Some(request_id) = &self.request_id {
            details.push_str(&format!(", request_id: {request_id}"));
        }
        if let Some(http_status) = self.http_status {
            details.push_str(&format!(", http_status: {http_status}"));
        }
        if let Some(retry_after) = self.retry_after {
            details.push_str(&format!(", retry_after: {}s", retry_after.as_secs()));
        }
        details
    }
}

/// Error for invalid date ranges.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    /// Start date is after end date.
    #[error("Invalid date range: {start} > {end}")]
    InvalidRange {
        /// The start date.
        start: NaiveDate,
        /// The end date.
        end: NaiveDate,
    },
}
