//! Rate-limit retry for the insight API client.
//!
//! Only [`ApiError::RateLimited`] is retried. The wait before each retry is the
//! server-supplied `Retry-After` value clamped to a configured maximum; no
//! exponential schedule is computed locally. Every other error, including
//! GraphQL errors and non-429 statuses, is returned on first occurrence.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;

use crate::error::ApiError;

/// Wait before retrying a rate-limited request.
///
/// Uses `retry_after_secs` when the server sent one, otherwise
/// `max_wait_secs`; never longer than `max_wait_secs`.
pub(crate) fn rate_limit_wait(retry_after_secs: Option<u64>, max_wait_secs: u64) -> Duration {
    let secs = retry_after_secs.unwrap_or(max_wait_secs).min(max_wait_secs);
    Duration::from_secs(secs)
}

/// Runs `operation`, retrying up to `max_retries` times while it reports
/// [`ApiError::RateLimited`].
///
/// With `max_retries = 3` the operation is attempted at most 4 times and
/// sleeps at most 3 times. If the last attempt is still rate limited the
/// result is [`ApiError::MaxRetriesExceeded`] carrying the final
/// `Retry-After` value.
pub(crate) async fn retry_on_rate_limit<T, F, Fut>(
    max_retries: u32,
    max_wait_secs: u64,
    mut operation: F,
) -> Result<T, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Err(ApiError::RateLimited { retry_after_secs }) => {
                if attempt >= max_retries {
                    return Err(ApiError::MaxRetriesExceeded {
                        attempts: attempt + 1,
                        status: StatusCode::TOO_MANY_REQUESTS.as_u16(),
                        retry_after_secs,
                    });
                }
                attempt += 1;
                let wait = rate_limit_wait(retry_after_secs, max_wait_secs);
                tracing::warn!(
                    attempt,
                    max_retries,
                    wait_secs = wait.as_secs(),
                    retry_after_secs,
                    "rate limit exceeded, retrying after server-requested wait"
                );
                tokio::time::sleep(wait).await;
            }
            other => return other,
        }
    }
}
