//! HTTP GET with bounded retries.

use std::time::Duration;

use reqwest::Client;

use crate::error::ScraperError;
use crate::retry::{retry_with_policy, AttemptError, RetryPolicy};

/// A successful response with its body fully read.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Fetched {
    /// Body decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// HTTP fetcher shared by discovery, extraction and media download.
///
/// The retry policy is injected so tests can run with no delay.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
}

impl Fetcher {
    /// Builds a fetcher with the given request timeout, `User-Agent` and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        policy: RetryPolicy,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, policy })
    }

    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// GETs `url`, retrying on connection errors and non-success statuses.
    ///
    /// The body is read inside the attempt, so a truncated body is retried too.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::FetchFailed`] once every attempt has failed.
    pub async fn fetch(&self, url: &str) -> Result<Fetched, ScraperError> {
        let client = &self.client;
        retry_with_policy(&self.policy, url, || async move {
            let response = client
                .get(url)
                .send()
                .await
                .map_err(AttemptError::Transport)?;
            let status = response.status();
            if !status.is_success() {
                return Err(AttemptError::Status(status.as_u16()));
            }
            let body = response.bytes().await.map_err(AttemptError::Transport)?;
            Ok(Fetched {
                status: status.as_u16(),
                body: body.to_vec(),
            })
        })
        .await
    }
}
