use super::{MetricsGateway, QueryRange};
use crate::config::BackendConf;
use crate::error::{Result, TrendsError};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Bounded retry with exponential backoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub call_timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(backend: &BackendConf) -> Self {
        Self {
            max_attempts: backend.retry.max_attempts.max(1),
            initial_backoff: backend.retry.initial_backoff(),
            max_backoff: backend.retry.max_backoff(),
            call_timeout: backend.request_timeout(),
        }
    }

    /// Delay before retrying after the `attempt`-th failure (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }
}

/// Wraps a gateway with per-call timeouts and retries on `BackendQueryFailed`
pub struct RetryingGateway<G> {
    inner: G,
    policy: RetryPolicy,
}

impl<G: MetricsGateway> RetryingGateway<G> {
    pub fn new(inner: G, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }

    async fn with_retry<'a, F, Fut>(&'a self, query: &'a str, call: F) -> Result<String>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<String>> + 'a,
    {
        let mut attempt = 1;
        loop {
            let outcome = match tokio::time::timeout(self.policy.call_timeout, call()).await {
                Ok(result) => result,
                Err(_) => Err(TrendsError::backend(
                    query,
                    format!("timed out after {:?}", self.policy.call_timeout),
                )),
            };

            match outcome {
                Err(e) if e.is_retryable() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.backoff_for(attempt);
                    warn!(
                        "backend attempt {}/{} failed: {} - retrying in {:?}",
                        attempt, self.policy.max_attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

#[async_trait]
impl<G: MetricsGateway> MetricsGateway for RetryingGateway<G> {
    async fn instant_query(&self, query: &str) -> Result<String> {
        self.with_retry(query, || self.inner.instant_query(query)).await
    }

    async fn range_query(&self, query: &str, range: &QueryRange) -> Result<String> {
        self.with_retry(query, || self.inner.range_query(query, range)).await
    }
}
