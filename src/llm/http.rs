//! HTTP plumbing shared by the network providers.

use reqwest::{Client, Response, StatusCode};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{PeekError, Result};

/// Builds a reqwest client bounded by `timeout_secs` per request.
pub(crate) fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| PeekError::config(format!("Failed to create HTTP client: {}", e)))
}

/// A failed attempt, tagged with whether another attempt may succeed.
#[derive(Debug)]
pub(crate) struct Attempt {
    pub error: PeekError,
    pub retryable: bool,
}

impl Attempt {
    pub fn fatal(error: PeekError) -> Self {
        Self {
            error,
            retryable: false,
        }
    }

    pub fn transient(error: PeekError) -> Self {
        Self {
            error,
            retryable: true,
        }
    }

    /// Classifies a transport failure. `unreachable` is shown when the host refuses.
    pub fn from_transport(e: reqwest::Error, unreachable: &str) -> Self {
        let retryable = e.is_timeout() || e.is_connect();
        let error = if e.is_timeout() {
            PeekError::translation("Request timed out. Try again.")
        } else if e.is_connect() {
            PeekError::translation(unreachable)
        } else {
            PeekError::translation(format!("Request failed: {}", e))
        };
        Self { error, retryable }
    }
}

/// Exponential backoff between attempts.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RetryPolicy {
    pub attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// One attempt, no waiting.
    pub const fn once() -> Self {
        Self {
            attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    /// Runs `op` until it succeeds, fails fatally, or attempts run out.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, Attempt>>,
    {
        let mut delay = self.base_delay;
        let mut attempt = 1;
        loop {
            debug!(provider = label, attempt, "Sending completion request");
            match op().await {
                Ok(value) => return Ok(value),
                Err(failed) if !failed.retryable || attempt >= self.attempts => {
                    return Err(failed.error)
                }
                Err(failed) => {
                    warn!(
                        provider = label,
                        attempt,
                        ?delay,
                        error = %failed.error,
                        "Completion request failed, retrying"
                    );
                }
            }
            tokio::time::sleep(delay).await;
            delay *= 2;
            attempt += 1;
        }
    }
}

/// Reads the body, returning it with the status.
pub(crate) async fn read_body(
    response: Response,
) -> std::result::Result<(StatusCode, String), Attempt> {
    let status = response.status();
    let body = response.text().await.map_err(|e| {
        Attempt::fatal(PeekError::translation(format!(
            "Failed to read response: {}",
            e
        )))
    })?;
    Ok((status, body))
}

/// Decodes a successful JSON body.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    body: &str,
) -> std::result::Result<T, Attempt> {
    serde_json::from_str(body).map_err(|e| {
        Attempt::fatal(PeekError::translation(format!(
            "Failed to parse response: {}",
            e
        )))
    })
}
