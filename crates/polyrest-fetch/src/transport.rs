//! HTTP transport.
//!
//! The [`Transport`] trait is the seam between the request pipeline and the
//! network: it issues exactly one GET and hands back the status, the
//! `Retry-After` hint and the raw body. Classification, retry and decoding all
//! happen above it.

use async_trait::async_trait;
use bytes::Bytes;
use polyrest_types::{CURSOR_PARAM, Cursor, PolyrestError, Result};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{Client, Url};
use std::time::Duration;

use crate::config::{ClientConfig, ConfigError};
use crate::url::Endpoint;

/// HTTP status returned when the API throttles a caller.
pub const TOO_MANY_REQUESTS: u16 = 429;

/// An HTTP response as seen by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed `Retry-After` header, when present.
    pub retry_after: Option<Duration>,
    /// Response body.
    pub body: Bytes,
}

impl RawResponse {
    /// Creates a response without a `Retry-After` hint.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            retry_after: None,
            body: body.into(),
        }
    }

    /// Sets the `Retry-After` hint.
    #[must_use]
    pub const fn with_retry_after(mut self, retry_after: Duration) -> Self {
        self.retry_after = Some(retry_after);
        self
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns true for HTTP 429.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        self.status == TOO_MANY_REQUESTS
    }
}

/// Issues single GET requests against the API.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Sends one GET request.
    ///
    /// `query` holds the encoded request spec; `cursor`, when present, is
    /// appended verbatim as the `cursor` parameter.
    ///
    /// # Errors
    ///
    /// Returns [`PolyrestError::Timeout`] if the request timed out and
    /// [`PolyrestError::Transport`] for any other network failure. Non-2xx
    /// responses are not errors at this level.
    async fn get(
        &self,
        endpoint: &Endpoint,
        query: &[(String, String)],
        cursor: Option<&Cursor>,
    ) -> Result<RawResponse>;
}

/// [`Transport`] backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpTransport {
    /// Builds the transport from a configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or API key is unusable or the HTTP
    /// client cannot be created.
    pub fn new(config: &ClientConfig) -> std::result::Result<Self, ConfigError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ConfigError::Invalid(vec![format!("base_url is invalid: {e}")]))?;

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key)).map_err(|_| {
            ConfigError::Invalid(vec![
                "api_key contains characters not allowed in an HTTP header".to_string(),
            ])
        })?;
        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(10))
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            base_url,
            timeout: config.timeout(),
        })
    }

    /// Returns the base URL requests are sent to.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds the request URL for `endpoint`, carrying `cursor` if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot take path segments.
    pub fn url_for(&self, endpoint: &Endpoint, cursor: Option<&Cursor>) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                PolyrestError::Transport(format!("base URL {} cannot be a base", self.base_url))
            })?
            .pop_if_empty()
            .extend(endpoint.segments());

        // The token is passed back exactly as the API issued it.
        url.set_query(cursor.map(|cursor| format!("{CURSOR_PARAM}{cursor}")).as_deref());
        Ok(url)
    }

    fn map_error(&self, err: reqwest::Error) -> PolyrestError {
        if err.is_timeout() {
            PolyrestError::Timeout {
                timeout: self.timeout,
            }
        } else {
            PolyrestError::Transport(err.to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        endpoint: &Endpoint,
        query: &[(String, String)],
        cursor: Option<&Cursor>,
    ) -> Result<RawResponse> {
        let url = self.url_for(endpoint, cursor)?;
        tracing::trace!(%url, params = query.len(), "GET");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let status = response.status().as_u16();
        let retry_after = parse_retry_after(response.headers());
        let body = response.bytes().await.map_err(|e| self.map_error(e))?;

        Ok(RawResponse {
            status,
            retry_after,
            body,
        })
    }
}

/// Parses a delta-seconds `Retry-After` header.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base_url: &str) -> HttpTransport {
        let config = ClientConfig {
            base_url: base_url.to_string(),
            ..ClientConfig::with_api_key("test-key")
        };
        HttpTransport::new(&config).unwrap()
    }

    #[test]
    fn test_url_without_cursor() {
        let url = transport("https://api.example.com")
            .url_for(&Endpoint::tickers(), None)
            .unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v3/reference/tickers");
    }

    #[test]
    fn test_url_keeps_base_path() {
        let url = transport("https://api.example.com/proxy/")
            .url_for(&Endpoint::trades("AAPL"), None)
            .unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/proxy/v3/trades/AAPL");
    }

    #[test]
    fn test_url_with_cursor_verbatim() {
        let cursor = Cursor::from("YXA9MiZhcz0mbGltaXQ9Mg%3D%3D".to_string());
        let url = transport("https://api.example.com")
            .url_for(&Endpoint::short_volume(), Some(&cursor))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/stocks/v1/short-volume?cursor=YXA9MiZhcz0mbGltaXQ9Mg%3D%3D"
        );
    }

    #[test]
    fn test_segments_are_escaped() {
        let url = transport("https://api.example.com")
            .url_for(&Endpoint::ticker_details("A/B"), None)
            .unwrap();
        assert_eq!(url.path(), "/v3/reference/tickers/A%2FB");
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);

        headers.insert(RETRY_AFTER, HeaderValue::from_static("7"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(7)));

        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[test]
    fn test_raw_response_status_classes() {
        assert!(RawResponse::new(200, "{}").is_success());
        assert!(!RawResponse::new(404, "{}").is_success());
        assert!(RawResponse::new(TOO_MANY_REQUESTS, "").is_rate_limited());
    }
}
