//! Generic response envelope and its classification.

use serde::{Deserialize, Serialize};

use crate::{ApiError, Cursor, DEFAULT_ERROR_MESSAGE};

/// Statuses that mark a successful response.
pub const SUCCESS_STATUSES: [&str; 2] = ["OK", "success"];

/// Generic wrapper around every API response.
///
/// `T` is the payload shape: a single record for detail endpoints, a `Vec` of
/// records for paginated listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Opaque request identifier used for correlation.
    #[serde(default)]
    pub request_id: String,
    /// Response status (`OK` or `success` on success).
    pub status: String,
    /// The payload.
    #[serde(rename = "results", default = "none")]
    pub value: Option<T>,
    /// Number of items in the payload, when it is a sequence.
    #[serde(default)]
    pub count: Option<u32>,
    /// Item count as reported by the aggregates endpoints.
    #[serde(default, rename = "resultsCount", skip_serializing_if = "Option::is_none")]
    pub results_count: Option<u32>,
    /// URL of the next page, carrying the continuation cursor.
    #[serde(default)]
    pub next_url: Option<String>,
    /// Human readable detail, mostly present on failure.
    #[serde(default)]
    pub message: Option<String>,
    /// Error text of the generic error shape; used when `message` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// `#[serde(default)]` on a generic `Option<T>` would require `T: Default`.
const fn none<T>() -> Option<T> {
    None
}

/// A successfully classified envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// The payload.
    pub value: Option<T>,
    /// Number of items in the payload.
    pub count: Option<u32>,
    /// Cursor for the next page, `None` at the end of the sequence.
    pub cursor: Option<Cursor>,
}

impl<T> Page<T> {
    /// Returns true if the page holds items to deliver.
    #[must_use]
    pub fn has_items(&self) -> bool {
        self.count.is_some_and(|count| count > 0)
    }

    /// Unwraps the payload of a single-item response.
    ///
    /// # Errors
    ///
    /// Returns an error if the success envelope carried no payload.
    pub fn into_value(self) -> Result<T, ApiError> {
        self.value
            .ok_or_else(|| ApiError::new("Response did not contain any results", "NO_RESULTS"))
    }
}

impl<T> Envelope<T> {
    /// Creates a successful envelope around `value`.
    #[must_use]
    pub fn ok(value: T) -> Self {
        Self {
            request_id: String::new(),
            status: "OK".to_string(),
            value: Some(value),
            count: None,
            results_count: None,
            next_url: None,
            message: None,
            error: None,
        }
    }

    /// Creates a failed envelope.
    #[must_use]
    pub fn error(status: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            request_id: String::new(),
            status: status.into(),
            value: None,
            count: None,
            results_count: None,
            next_url: None,
            message: Some(message.into()),
            error: None,
        }
    }

    /// Sets the item count.
    #[must_use]
    pub const fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Sets the next page URL.
    #[must_use]
    pub fn with_next_url(mut self, next_url: impl Into<String>) -> Self {
        self.next_url = Some(next_url.into());
        self
    }

    /// Sets the request id.
    #[must_use]
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    /// Returns true if the status marks a successful response.
    #[must_use]
    pub fn is_success(&self) -> bool {
        SUCCESS_STATUSES.contains(&self.status.as_str())
    }

    /// Returns the continuation cursor embedded in `next_url`.
    #[must_use]
    pub fn cursor(&self) -> Option<Cursor> {
        self.next_url.as_deref().and_then(Cursor::from_next_url)
    }

    /// Returns the item count, whichever key the endpoint reported it under.
    #[must_use]
    pub const fn item_count(&self) -> Option<u32> {
        match self.count {
            Some(count) => Some(count),
            None => self.results_count,
        }
    }

    /// Builds the error describing a failed envelope.
    #[must_use]
    pub fn to_error(&self) -> ApiError {
        let message = self
            .message
            .clone()
            .or_else(|| self.error.clone())
            .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());
        ApiError::new(message, self.status.clone()).with_request_id(self.request_id.clone())
    }

    /// Classifies the envelope as a page of results or an API error.
    ///
    /// This is a pure function of the envelope contents.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] built from the envelope when its status is not
    /// a success status.
    pub fn classify(self) -> Result<Page<T>, ApiError> {
        if !self.is_success() {
            return Err(self.to_error());
        }
        let cursor = self.cursor();
        let count = self.item_count();
        Ok(Page {
            value: self.value,
            count,
            cursor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_statuses() {
        assert!(Envelope::ok(1).is_success());
        let mut envelope = Envelope::ok(1);
        envelope.status = "success".to_string();
        assert!(envelope.is_success());

        for status in ["", "ERROR", "ok", "DELAYED", "Success"] {
            envelope.status = status.to_string();
            assert!(!envelope.is_success(), "{status:?} should be a failure");
        }
    }

    #[test]
    fn test_classify_failure_uses_message() {
        let envelope: Envelope<Vec<u32>> =
            Envelope::error("ERROR", "Unknown API Key").with_request_id("abc");
        let err = envelope.classify().unwrap_err();

        assert_eq!(err.message, "Unknown API Key");
        assert_eq!(err.status, "ERROR");
        assert_eq!(err.request_id.as_deref(), Some("abc"));
        assert_eq!(err.http_status, None);
    }

    #[test]
    fn test_classify_failure_default_message() {
        let mut envelope: Envelope<u32> = Envelope::error("NOT_FOUND", "");
        envelope.message = None;
        let err = envelope.classify().unwrap_err();
        assert_eq!(err.message, DEFAULT_ERROR_MESSAGE);
    }

    #[test]
    fn test_classify_success_extracts_cursor() {
        let page = Envelope::ok(vec![1, 2])
            .with_count(2)
            .with_next_url("https://api.example.com/v3/reference/tickers?cursor=NEXT")
            .classify()
            .unwrap();

        assert_eq!(page.value, Some(vec![1, 2]));
        assert!(page.has_items());
        assert_eq!(page.cursor.unwrap().as_str(), "NEXT");
    }

    #[test]
    fn test_failure_never_yields_cursor() {
        let envelope: Envelope<Vec<u32>> =
            Envelope::error("ERROR", "boom").with_next_url("https://x/y?cursor=ABC");
        assert!(envelope.classify().is_err());
    }

    #[test]
    fn test_classification_is_repeatable() {
        let envelope = Envelope::ok(vec!["a".to_string()])
            .with_count(1)
            .with_next_url("https://x/y?cursor=C1");
        assert_eq!(envelope.clone().classify(), envelope.classify());

        let failed: Envelope<Vec<String>> = Envelope::error("ERROR", "nope");
        assert_eq!(failed.clone().classify(), failed.classify());
    }

    #[test]
    fn test_deserialize_wire_envelope() {
        let json = r#"{
            "request_id": "31d59dda",
            "status": "OK",
            "count": 2,
            "next_url": "https://api.polygon.io/v3/reference/tickers?cursor=YWN0aXZl",
            "results": [1, 2]
        }"#;
        let envelope: Envelope<Vec<u32>> = serde_json::from_str(json).unwrap();

        assert_eq!(envelope.request_id, "31d59dda");
        assert_eq!(envelope.count, Some(2));
        assert_eq!(envelope.cursor().unwrap().as_str(), "YWN0aXZl");
    }

    #[test]
    fn test_deserialize_error_body() {
        let json = r#"{"status":"ERROR","request_id":"x1","error":"Unknown API Key"}"#;
        let envelope: Envelope<Vec<u32>> = serde_json::from_str(json).unwrap();

        assert_eq!(envelope.value, None);
        assert_eq!(envelope.to_error().message, "Unknown API Key");
    }

    #[test]
    fn test_error_and_message_both_present() {
        let json = r#"{
            "status": "NOT_AUTHORIZED",
            "request_id": "x2",
            "error": "generic",
            "message": "You are not entitled to this data."
        }"#;
        let envelope: Envelope<Vec<u32>> = serde_json::from_str(json).unwrap();
        let err = envelope.classify().unwrap_err();

        assert_eq!(err.message, "You are not entitled to this data.");
        assert_eq!(err.status, "NOT_AUTHORIZED");
        assert_eq!(err.request_id.as_deref(), Some("x2"));
    }

    #[test]
    fn test_count_and_results_count_both_present() {
        let json = r#"{"status":"OK","count":3,"resultsCount":2,"results":[1,2,3]}"#;
        let envelope: Envelope<Vec<u32>> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.classify().unwrap().count, Some(3));

        let json = r#"{"status":"OK","resultsCount":2,"results":[1,2]}"#;
        let envelope: Envelope<Vec<u32>> = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.classify().unwrap().count, Some(2));
    }

    #[test]
    fn test_missing_payload_on_single_item() {
        let mut envelope = Envelope::ok(5u32);
        envelope.value = None;
        assert!(envelope.classify().unwrap().into_value().is_err());
    }
}
