use std::time::Duration;

use log::debug;
use reqwest::{RequestBuilder, Response, StatusCode};
use tokio::time::sleep;

/// Retry policy for a single HTTP call. Only responses matching
/// `should_retry` are retried; everything else is handed back as-is.
///
/// The fields are plain function pointers so tests can substitute a zero
/// backoff or a different predicate without any async machinery.
#[derive(Clone, Copy)]
pub struct RetryPolicy {
    /// Sends that honor the retry predicate before the final, unconditional one.
    pub max_attempts: u32,
    /// Fallback wait when the server sends no Retry-After header.
    pub backoff: fn(u32) -> Duration,
    pub should_retry: fn(StatusCode) -> bool,
}

impl RetryPolicy {
    pub fn from_max_attempts(max_attempts: u32) -> Self {
        RetryPolicy {
            max_attempts,
            ..RetryPolicy::default()
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            backoff: exponential_backoff,
            should_retry: |status| status == StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

/// 2^attempt seconds: 1s, 2s, 4s, ...
pub fn exponential_backoff(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(16))
}

/// Zero-delay backoff for deterministic tests.
pub fn no_backoff(_attempt: u32) -> Duration {
    Duration::ZERO
}

/// Send a request, transparently retrying rate-limited responses.
///
/// Waits for the server-provided Retry-After (whole seconds) when present,
/// otherwise for `policy.backoff(attempt)`. After `max_attempts` retried
/// sends one last attempt is issued and its response returned unchecked, so
/// callers must still inspect the status. Transport failures are the only
/// error path; HTTP error statuses are ordinary return values here.
pub async fn send_with_retry<F>(policy: &RetryPolicy, build: F) -> Result<Response, reqwest::Error>
where
    F: Fn() -> RequestBuilder,
{
    for attempt in 0..policy.max_attempts {
        let resp = build().send().await?;
        if !(policy.should_retry)(resp.status()) {
            return Ok(resp);
        }
        let wait = retry_after(&resp).unwrap_or_else(|| (policy.backoff)(attempt));
        debug!(
            "got {}; waiting {:?} before retry {}/{}",
            resp.status(),
            wait,
            attempt + 1,
            policy.max_attempts
        );
        sleep(wait).await;
    }
    build().send().await
}

fn retry_after(resp: &Response) -> Option<Duration> {
    resp.headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
}
