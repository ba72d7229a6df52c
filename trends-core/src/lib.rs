//! Trends core - CPU health scoring for vSphere clusters
//!
//! Pipeline per cluster:
//! - [`discovery`]: list the cluster's ESX hosts from an instant query
//! - [`collector`]: fetch each host's CPU series over the lookback window
//! - [`scoring`]: turn the series into a bounded score and a tier
//! - [`render`]: build the human message and the JSON documents
//!
//! [`orchestrator::Orchestrator`] fans the pipeline out over the configured
//! clusters and aggregates per-cluster outcomes into a [`RunReport`].

pub mod collector;
pub mod config;
pub mod discovery;
pub mod error;
pub mod gateway;
pub mod models;
pub mod orchestrator;
pub mod render;
pub mod scoring;

pub use config::EngineConfig;
pub use error::{Result, TrendsError};
pub use gateway::{MetricsGateway, PrometheusGateway, QueryRange, RetryPolicy, RetryingGateway};
pub use models::{Cluster, ClusterFailure, Host, HostFailure, ScoreCard, Tier};
pub use orchestrator::{Orchestrator, RunReport};
pub use render::{SummaryDocument, TrendsDocument};

use std::sync::Arc;

/// Production gateway: Prometheus HTTP API behind timeouts and retries.
pub fn build_gateway(config: &EngineConfig) -> Result<Arc<dyn MetricsGateway>> {
    let prometheus = PrometheusGateway::new(&config.backend.url, config.backend.request_timeout())?;
    let policy = RetryPolicy::from_config(&config.backend);
    Ok(Arc::new(RetryingGateway::new(prometheus, policy)))
}
