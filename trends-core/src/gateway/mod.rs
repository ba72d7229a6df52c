/*!
Metrics gateway - access to the time-series backend

The pipeline only ever sees raw text, the same shape the Prometheus client
prints for query results:

- instant vector: one `name{label="v", ...} => value @[ts]` line per series
- range matrix: a `name{...} =>` header line, a `# points=N step=Ss` metadata
  line, then one `value @[ts]` line per point

[`PrometheusGateway`] talks to the real HTTP API, [`RetryingGateway`] adds
per-call timeouts and bounded retries on top of any gateway.
*/

mod prometheus;
mod retry;

pub use prometheus::PrometheusGateway;
pub use retry::{RetryPolicy, RetryingGateway};

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Time window of a range query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub step: Duration,
}

impl QueryRange {
    /// `[end - days, end]` stepped at `step`.
    pub fn lookback_from(end: DateTime<Utc>, days: u32, step: Duration) -> Self {
        Self {
            start: end - chrono::Duration::days(i64::from(days)),
            end,
            step,
        }
    }

    pub fn lookback(days: u32, step: Duration) -> Self {
        Self::lookback_from(Utc::now(), days, step)
    }
}

/// Query service over the metrics backend. Implementations are shared
/// between cluster tasks and must be safe for concurrent use.
#[async_trait]
pub trait MetricsGateway: Send + Sync {
    async fn instant_query(&self, query: &str) -> Result<String>;

    async fn range_query(&self, query: &str, range: &QueryRange) -> Result<String>;
}

#[async_trait]
impl<G: MetricsGateway + ?Sized> MetricsGateway for Arc<G> {
    async fn instant_query(&self, query: &str) -> Result<String> {
        (**self).instant_query(query).await
    }

    async fn range_query(&self, query: &str, range: &QueryRange) -> Result<String> {
        (**self).range_query(query, range).await
    }
}
