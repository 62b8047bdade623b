//! HTTP client for the insight GraphQL API.
//!
//! Wraps `reqwest` with the API's fixed headers and typed response handling.
//! [`InsightClient::execute`] performs exactly one round trip and never
//! retries; [`InsightClient::execute_with_retries`] additionally waits out
//! HTTP 429 responses. Every successful round trip is returned as a
//! [`QueryOutcome`], so GraphQL `errors` are visible to the caller as data
//! rather than folded into transport failures.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::retry::retry_on_rate_limit;
use crate::types::{parse_outcome, GraphqlRequest, QueryOutcome};

pub const DEFAULT_ENDPOINT: &str = "https://api.polecat.com/graphql";

/// Connection settings shared by every query a client runs.
#[derive(Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub token: String,
    pub timeout_secs: u64,
    /// Number of results requested per page for paginated queries.
    pub page_size: u32,
    /// Upper bound on the wait honoured from a `Retry-After` header.
    pub max_retry_wait_secs: u64,
    /// Number of retries after the first rate-limited attempt.
    pub max_retries: u32,
}

impl ClientConfig {
    /// Creates a config for the production endpoint with default limits
    /// (60 s timeout, 100 results per page, 30 s max wait, 3 retries).
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            token: token.into(),
            timeout_secs: 60,
            page_size: 100,
            max_retry_wait_secs: 30,
            max_retries: 3,
        }
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    #[must_use]
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, max_retry_wait_secs: u64) -> Self {
        self.max_retries = max_retries;
        self.max_retry_wait_secs = max_retry_wait_secs;
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("token", &"[redacted]")
            .field("timeout_secs", &self.timeout_secs)
            .field("page_size", &self.page_size)
            .field("max_retry_wait_secs", &self.max_retry_wait_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// Client for the insight GraphQL API.
///
/// The config is fixed at construction; use [`ClientConfig::with_endpoint`]
/// to point at a mock server in tests.
pub struct InsightClient {
    client: Client,
    endpoint: Url,
    config: ClientConfig,
}

impl InsightClient {
    /// Builds a client from `config`.
    ///
    /// # Errors
    ///
    /// - [`ApiError::InvalidConfig`] if the endpoint is not a valid URL or the
    ///   token cannot be sent as a header value.
    /// - [`ApiError::Http`] if the underlying `reqwest::Client` cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let endpoint = Url::parse(&config.endpoint).map_err(|e| {
            ApiError::InvalidConfig(format!("invalid endpoint '{}': {e}", config.endpoint))
        })?;

        let mut auth = HeaderValue::from_str(&format!("api-key {}", config.token))
            .map_err(|e| ApiError::InvalidConfig(format!("invalid API token: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("insightdl/0.1 (document-export)")
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            endpoint,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.config.page_size
    }

    /// Sends one request and returns the parsed outcome.
    ///
    /// No HTTP errors are handled here; a 429 surfaces as
    /// [`ApiError::RateLimited`]. Use [`Self::execute_with_retries`] to wait
    /// out rate limiting.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Http`] on network failure or timeout.
    /// - [`ApiError::RateLimited`] on HTTP 429.
    /// - [`ApiError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`ApiError::Deserialize`] if the body or its `data` does not match `T`.
    pub async fn execute<V, T>(
        &self,
        request: &GraphqlRequest<'_, V>,
    ) -> Result<QueryOutcome<T>, ApiError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        tracing::debug!(endpoint = %self.endpoint, "sending GraphQL request");
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;
        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok());
            return Err(ApiError::RateLimited { retry_after_secs });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        parse_outcome(&body, &format!("response from {}", self.endpoint))
    }

    /// Same as [`Self::execute`], but waits and retries on HTTP 429.
    ///
    /// The wait is the response's `Retry-After` seconds clamped to
    /// `max_retry_wait_secs`. After `max_retries` retries the error becomes
    /// [`ApiError::MaxRetriesExceeded`]. Other errors are not retried.
    ///
    /// # Errors
    ///
    /// As [`Self::execute`], with [`ApiError::MaxRetriesExceeded`] in place of
    /// [`ApiError::RateLimited`].
    pub async fn execute_with_retries<V, T>(
        &self,
        request: &GraphqlRequest<'_, V>,
    ) -> Result<QueryOutcome<T>, ApiError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        retry_on_rate_limit(
            self.config.max_retries,
            self.config.max_retry_wait_secs,
            || self.execute(request),
        )
        .await
    }
}
