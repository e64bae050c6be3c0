//! Resilient HTTP fetching with bounded retry and exponential backoff.
//!
//! All outbound requests go through [`fetch_with_retry`], which classifies
//! failures into two kinds:
//! - **Transient** — HTTP 503 (the archive's "server busy" signal) or a
//!   transport-level error. Retried up to [`RetryPolicy::max_attempts`],
//!   sleeping the current backoff delay before each retry.
//! - **Permanent** — any other non-2xx status. Fails immediately, no retry.
//!
//! The per-attempt request is abstracted behind the [`Transport`] trait so
//! the retry loop (and everything above it) can be tested against scripted
//! fakes instead of a live archive.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Retry/backoff configuration for a single fetch.
///
/// The delay before attempt *n* (n ≥ 2) is
/// `initial_delay * backoff_multiplier^(n-2)` — i.e. the first retry waits
/// `initial_delay`, and each subsequent retry multiplies the wait.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts issued, including the first. Must be ≥ 1.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Growth factor applied after each retry. Must be > 1.
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(2000),
            backoff_multiplier: 2.0,
        }
    }
}

/// Terminal fetch failure.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Non-retryable response status. Surfaced after exactly one attempt.
    #[error("HTTP error {status} fetching {url}")]
    Permanent { status: u16, url: String },

    /// All attempts used up; carries whatever made the final attempt fail.
    #[error("giving up on {url} after {attempts} attempts: {reason}")]
    Exhausted {
        attempts: u32,
        url: String,
        reason: String,
    },
}

/// A raw HTTP response: status plus body text.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One HTTP GET, no retry semantics. `Err` means a transport-level failure
/// (connection reset, timeout); status-level failures come back as an `Ok`
/// response carrying the status.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> anyhow::Result<TransportResponse>;
}

/// Production [`Transport`] backed by a shared reqwest client.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> anyhow::Result<TransportResponse> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}

/// Fetch `url`, retrying transient failures per `policy`.
///
/// Guarantees:
/// - at most `policy.max_attempts` requests are issued;
/// - no retry begins before its scheduled delay elapses;
/// - delay growth is strictly geometric.
pub async fn fetch_with_retry(
    transport: &dyn Transport,
    url: &str,
    policy: &RetryPolicy,
) -> Result<String, FetchError> {
    let mut delay = policy.initial_delay;
    let mut last_reason = String::new();

    for attempt in 1..=policy.max_attempts {
        match transport.get(url).await {
            Ok(response) if response.is_success() => return Ok(response.body),
            // 503 is the archive's back-off signal — retry.
            Ok(response) if response.status == 503 => {
                tracing::debug!(url, attempt, "server busy (503), will retry");
                last_reason = "HTTP 503 Service Unavailable".to_string();
            }
            Ok(response) => {
                return Err(FetchError::Permanent {
                    status: response.status,
                    url: url.to_string(),
                });
            }
            Err(e) => {
                tracing::debug!(url, attempt, error = %e, "transport error, will retry");
                last_reason = e.to_string();
            }
        }

        if attempt < policy.max_attempts {
            tokio::time::sleep(delay).await;
            delay = delay.mul_f64(policy.backoff_multiplier);
        }
    }

    Err(FetchError::Exhausted {
        attempts: policy.max_attempts,
        url: url.to_string(),
        reason: last_reason,
    })
}
