//! REST client: transport, resilience policy and envelope decoding.

use futures::stream::{BoxStream, StreamExt};
use polyrest_types::{ApiError, Cursor, Envelope, PolyrestError, Result};
use serde::de::{DeserializeOwned, IgnoredAny};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::{ClientConfig, ConfigError};
use crate::paginate::paginate;
use crate::policy::ResiliencePolicy;
use crate::transport::{HttpTransport, RawResponse, TOO_MANY_REQUESTS, Transport};
use crate::url::Endpoint;

/// Longest slice of an undecodable body echoed into an error message.
const BODY_SNIPPET_LEN: usize = 200;

/// Client for the REST API.
///
/// Cloning is cheap; clones share the transport and the rate-limit budget.
#[derive(Debug, Clone)]
pub struct RestClient {
    transport: Arc<dyn Transport>,
    policy: ResiliencePolicy,
    max_pages: u32,
}

impl RestClient {
    /// Creates a client talking HTTP to the configured base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: &ClientConfig) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let transport = HttpTransport::new(config)?;
        tracing::debug!(base_url = %transport.base_url(), "Created REST client");
        Self::with_transport(config, Arc::new(transport))
    }

    /// Creates a client on top of a custom transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_transport(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            transport,
            policy: ResiliencePolicy::from_config(config),
            max_pages: config.max_pages,
        })
    }

    /// Returns the resilience policy.
    #[must_use]
    pub const fn policy(&self) -> &ResiliencePolicy {
        &self.policy
    }

    /// Returns the pagination bound.
    #[must_use]
    pub const fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Performs one request and decodes the response envelope.
    ///
    /// The returned envelope may still carry a failure status; classifying it
    /// is up to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, is throttled, is cancelled or
    /// the response cannot be decoded.
    pub async fn call<T: DeserializeOwned>(
        &self,
        endpoint: &Endpoint,
        query: &[(String, String)],
        cursor: Option<&Cursor>,
        cancel: &CancellationToken,
    ) -> Result<Envelope<T>> {
        tracing::debug!(%endpoint, cursor = cursor.map(Cursor::as_str), "Sending request");
        let transport = &self.transport;
        let response = self
            .policy
            .execute(cancel, move || async move {
                // Abandons the in-flight request; dropping it aborts the I/O.
                tokio::select! {
                    () = cancel.cancelled() => Err(PolyrestError::Cancelled),
                    response = transport.get(endpoint, query, cursor) => response,
                }
            })
            .await?;
        decode_response(endpoint, response)
    }

    /// Streams every item of a paginated listing.
    ///
    /// The stream owns a clone of the client and may outlive `self`.
    pub fn paginate<T>(
        &self,
        endpoint: Endpoint,
        query: Vec<(String, String)>,
        cancel: CancellationToken,
    ) -> BoxStream<'static, Result<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.clone();
        let endpoint = Arc::new(endpoint);
        let query: Arc<[(String, String)]> = query.into();
        let token = cancel.clone();

        let fetch = move |cursor: Option<Cursor>| {
            let client = client.clone();
            let endpoint = Arc::clone(&endpoint);
            let query = Arc::clone(&query);
            let cancel = token.clone();
            async move {
                client
                    .call::<Vec<T>>(&endpoint, &query, cursor.as_ref(), &cancel)
                    .await
            }
        };

        paginate(fetch, cancel, self.max_pages).boxed()
    }
}

/// Maps a raw response onto an envelope or an error.
fn decode_response<T: DeserializeOwned>(
    endpoint: &Endpoint,
    response: RawResponse,
) -> Result<Envelope<T>> {
    if response.is_rate_limited() {
        let request_id = serde_json::from_slice::<Envelope<IgnoredAny>>(&response.body)
            .map(|envelope| envelope.request_id)
            .unwrap_or_default();
        tracing::warn!(%endpoint, retry_after = ?response.retry_after, "Request throttled by the API");
        return Err(PolyrestError::RateLimited(
            ApiError::rate_limited(response.retry_after)
                .with_request_id(request_id)
                .with_http_status(TOO_MANY_REQUESTS),
        ));
    }

    if !response.is_success() {
        return match serde_json::from_slice::<Envelope<IgnoredAny>>(&response.body) {
            Ok(envelope) => {
                let err = envelope.to_error().with_http_status(response.status);
                tracing::debug!(%endpoint, error = %err, "API returned an error");
                Err(PolyrestError::Api(err))
            }
            Err(_) => Err(PolyrestError::Transport(format!(
                "HTTP {} from {endpoint}: {}",
                response.status,
                body_snippet(&response.body)
            ))),
        };
    }

    serde_json::from_slice(&response.body)
        .map_err(|e| PolyrestError::Decode(format!("{endpoint}: {e}")))
}

fn body_snippet(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let mut snippet: String = text.chars().take(BODY_SNIPPET_LEN).collect();
    if text.chars().nth(BODY_SNIPPET_LEN).is_some() {
        snippet.push_str("...");
    }
    snippet
}
