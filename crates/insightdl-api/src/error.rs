use thiserror::Error;

/// Errors returned by the insight API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network, TLS or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP 429 from a single, non-retried request.
    #[error("rate limit exceeded (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// The request was still rate limited after every permitted retry.
    #[error(
        "Maximum number of retries exceeded: HTTP {status} after {attempts} attempts \
         (retry after {retry_after_secs:?}s)"
    )]
    MaxRetriesExceeded {
        attempts: u32,
        status: u16,
        retry_after_secs: Option<u64>,
    },

    /// Any non-2xx status other than 429.
    #[error("unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The response payload carried a GraphQL `errors` list.
    #[error(
        "GraphQL query returned the following error:\n  {}\nFull error: {raw}",
        .messages.join("\n  ")
    )]
    Graphql { messages: Vec<String>, raw: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Endpoint or credentials could not be turned into a valid request.
    #[error("invalid client configuration: {0}")]
    InvalidConfig(String),
}

impl ApiError {
    /// Returns `true` for errors raised by the transport rather than by the
    /// API reporting a problem with the query itself.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ApiError::Http(_)
                | ApiError::RateLimited { .. }
                | ApiError::MaxRetriesExceeded { .. }
                | ApiError::UnexpectedStatus { .. }
        )
    }
}
