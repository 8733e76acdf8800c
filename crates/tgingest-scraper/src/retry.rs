//! Retry policy for page and media fetches.
//!
//! Every failed attempt is retriable: transport errors and non-success HTTP
//! statuses alike. The delay is applied between attempts only, never after the
//! last one.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// The same delay before every retry.
    Fixed(Duration),
    /// `base * 2^(n-1)` before the n-th retry, capped at `max`.
    Exponential { base: Duration, max: Duration },
}

impl Backoff {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match *self {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential { base, max } => {
                let factor = 1u32 << attempt.saturating_sub(1).min(16);
                base.saturating_mul(factor).min(max)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 are treated as 1.
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Fixed(Duration::from_secs(3)),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Fixed(delay),
        }
    }
}

/// Why a single attempt failed.
#[derive(Debug)]
pub(crate) enum AttemptError {
    Transport(reqwest::Error),
    Status(u16),
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptError::Transport(e) => write!(f, "connection error: {e}"),
            AttemptError::Status(code) => write!(f, "received status code {code}"),
        }
    }
}

/// Runs `operation` until it succeeds or `policy.max_attempts` attempts have failed.
///
/// Each failure is logged with its 1-based attempt index and cause. After the last
/// failure a [`ScraperError::FetchFailed`] carrying the final cause is returned.
pub(crate) async fn retry_with_policy<T, F, Fut>(
    policy: &RetryPolicy,
    url: &str,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AttemptError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        tracing::warn!(attempt, max_attempts, url, error = %err, "fetch attempt failed");

        if attempt >= max_attempts {
            tracing::warn!(url, attempts = attempt, "giving up after exhausting retries");
            return Err(ScraperError::FetchFailed {
                url: url.to_string(),
                attempts: attempt,
                cause: err.to_string(),
            });
        }

        tokio::time::sleep(policy.backoff.delay_after(attempt)).await;
        attempt += 1;
    }
}
