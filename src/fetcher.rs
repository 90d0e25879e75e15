//! HTTP page fetching with politeness delays and bounded retries.

use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::signal::ShutdownToken;

#[cfg(test)]
use mockall::automock;

/// Default per-request timeout
pub const TIMEOUT_SECS: u64 = 15;

/// Browser-like user agent; the lookup service serves bots a different page
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Maximum size of a single page (5 MB)
const MAX_PAGE_SIZE: usize = 5 * 1024 * 1024;

/// Source of raw page bodies.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a page. Transport errors, timeouts and non-2xx statuses are errors.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// reqwest-backed fetcher
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the given per-request timeout and user agent
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP {} from {}", status, url);
        }

        if let Some(content_length) = response.content_length() {
            if content_length as usize > MAX_PAGE_SIZE {
                anyhow::bail!(
                    "Response too large: {} bytes (max: {} bytes)",
                    content_length,
                    MAX_PAGE_SIZE
                );
            }
        }

        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if body.len() > MAX_PAGE_SIZE {
            anyhow::bail!(
                "Downloaded content too large: {} bytes (max: {} bytes)",
                body.len(),
                MAX_PAGE_SIZE
            );
        }

        Ok(body)
    }
}

/// Timing of attempts against the lookup service.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Attempts per request, including the first
    pub max_attempts: u32,
    /// Lower bound of the random pause before every attempt
    pub delay_min: Duration,
    /// Upper bound of the random pause before every attempt
    pub delay_max: Duration,
    /// Backoff after failed attempt `n` is `2^n * backoff_base` plus jitter
    pub backoff_base: Duration,
    /// Upper bound (exclusive) of the random jitter added to each backoff
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_min: Duration::from_secs(1),
            delay_max: Duration::from_secs(3),
            backoff_base: Duration::from_secs(1),
            jitter: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// No pauses at all; used for tests and local mirrors.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            delay_min: Duration::ZERO,
            delay_max: Duration::ZERO,
            backoff_base: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }

    /// Random pause taken before each attempt, within `[delay_min, delay_max]`.
    pub fn politeness_delay(&self) -> Duration {
        if self.delay_max <= self.delay_min {
            return self.delay_min;
        }
        let secs = rand::rng()
            .random_range(self.delay_min.as_secs_f64()..=self.delay_max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    /// Pause after failed attempt `attempt` (1-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponential = self
            .backoff_base
            .saturating_mul(2u32.saturating_pow(attempt));
        if self.jitter.is_zero() {
            return exponential;
        }
        let jitter = rand::rng().random_range(0.0..self.jitter.as_secs_f64());
        exponential.saturating_add(Duration::from_secs_f64(jitter))
    }
}

/// Fetch a page, retrying per `policy`.
///
/// Returns the last error once the attempts are exhausted, or an error as soon
/// as `token` is cancelled.
pub async fn fetch_with_retry(
    fetcher: &dyn PageFetcher,
    url: &str,
    policy: &RetryPolicy,
    token: &ShutdownToken,
) -> Result<String> {
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        if token.is_cancelled() {
            anyhow::bail!("Cancelled before fetching {}", url);
        }

        tokio::time::sleep(policy.politeness_delay()).await;

        match fetcher.fetch(url).await {
            Ok(body) => return Ok(body),
            Err(e) => {
                warn!(
                    "Request to {} failed (attempt {}/{}): {:#}",
                    url, attempt, max_attempts, e
                );
                last_error = Some(e);
            }
        }

        if attempt < max_attempts {
            let delay = policy.backoff_delay(attempt);
            debug!("Retry {} after {:?} for {}", attempt, delay, url);
            tokio::time::sleep(delay).await;
        }
    }

    Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Unknown error")))
}
