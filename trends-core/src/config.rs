//! Engine configuration
//!
//! Everything the scoring pipeline needs is injected through [`EngineConfig`]:
//! the ordered cluster list, the backend settings and the PromQL templates.
//! All fields have defaults so an empty YAML section is a valid config.

use crate::error::{Result, TrendsError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

pub const DEFAULT_CLUSTERS: &[&str] = &[
    "nl", "nl-mt", "nl-dta", "nl-utre", "ld", "ld7", "ld7-dta", "sg3", "sg3-dta", "jb", "mi", "hk",
    "vsan-01",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub backend: BackendConf,
    pub clusters: Vec<String>,
    pub queries: QueryTemplates,
    pub collection: CollectionConf,
    pub run_deadline_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConf {
    pub url: String,
    pub request_timeout_secs: u64,
    pub retry: RetryConf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConf {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

/// PromQL templates, `{cluster}` and `{host}` are substituted at query time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryTemplates {
    /// Clusters whose name contains this marker use the `*_alternate` family
    pub alternate_marker: String,
    pub discovery: String,
    pub discovery_alternate: String,
    pub cpu: String,
    pub cpu_alternate: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionConf {
    pub lookback_days: u32,
    pub step_secs: u64,
    pub host_concurrency: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: BackendConf::default(),
            clusters: DEFAULT_CLUSTERS.iter().map(|c| c.to_string()).collect(),
            queries: QueryTemplates::default(),
            collection: CollectionConf::default(),
            run_deadline_secs: 300,
        }
    }
}

impl Default for BackendConf {
    fn default() -> Self {
        Self {
            url: "https://thanos.prod.env".into(),
            request_timeout_secs: 30,
            retry: RetryConf::default(),
        }
    }
}

impl Default for RetryConf {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 5_000,
        }
    }
}

impl Default for QueryTemplates {
    fn default() -> Self {
        Self {
            alternate_marker: "utre".into(),
            discovery: r#"vsphere_host_cpu_usage_average{cpu="instance-total",owner="platform-rke-prod-env",clustername="{cluster}"}"#.into(),
            discovery_alternate: r#"vsphere_host_cpu_usage_average{cpu="instance-total", owner="gtc-ops-prod-rke-utre-env", clustername="{cluster}"}"#.into(),
            cpu: r#"max(vsphere_host_cpu_usage_average{cpu="instance-total",owner="platform-rke-prod-env",esxhostname=~"{host}"})"#.into(),
            cpu_alternate: r#"max(vsphere_host_cpu_usage_average{cpu="instance-total", clustername="{cluster}", esxhostname=~"{host}"})"#.into(),
        }
    }
}

impl Default for CollectionConf {
    fn default() -> Self {
        Self {
            lookback_days: 7,
            step_secs: 60,
            host_concurrency: 4,
        }
    }
}

impl QueryTemplates {
    fn uses_alternate(&self, cluster: &str) -> bool {
        !self.alternate_marker.is_empty() && cluster.contains(&self.alternate_marker)
    }

    /// Instant query listing the hosts of a cluster
    pub fn discovery_query(&self, cluster: &str) -> String {
        let template = if self.uses_alternate(cluster) {
            &self.discovery_alternate
        } else {
            &self.discovery
        };
        fill(template, cluster, "")
    }

    /// Range query returning the CPU series of one host
    pub fn cpu_query(&self, cluster: &str, host: &str) -> String {
        let template = if self.uses_alternate(cluster) {
            &self.cpu_alternate
        } else {
            &self.cpu
        };
        fill(template, cluster, host)
    }
}

fn fill(template: &str, cluster: &str, host: &str) -> String {
    template.replace("{cluster}", cluster).replace("{host}", host)
}

impl RetryConf {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

impl BackendConf {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl EngineConfig {
    pub fn run_deadline(&self) -> Duration {
        Duration::from_secs(self.run_deadline_secs)
    }

    /// Rejects configs the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.backend.url.trim().is_empty() {
            return Err(TrendsError::InvalidConfig("backend.url is empty".into()));
        }
        if self.backend.request_timeout_secs == 0 {
            return Err(TrendsError::InvalidConfig(
                "backend.request_timeout_secs must be > 0".into(),
            ));
        }
        if self.backend.retry.max_attempts == 0 {
            return Err(TrendsError::InvalidConfig(
                "backend.retry.max_attempts must be > 0".into(),
            ));
        }
        if self.clusters.is_empty() {
            return Err(TrendsError::InvalidConfig("clusters list is empty".into()));
        }

        let mut seen = HashSet::new();
        for cluster in &self.clusters {
            if cluster.trim().is_empty() {
                return Err(TrendsError::InvalidConfig("empty cluster name".into()));
            }
            if !seen.insert(cluster.as_str()) {
                return Err(TrendsError::InvalidConfig(format!(
                    "duplicate cluster {cluster}"
                )));
            }
        }

        if self.collection.lookback_days == 0 || self.collection.step_secs == 0 {
            return Err(TrendsError::InvalidConfig(
                "collection window and step must be > 0".into(),
            ));
        }
        if self.collection.host_concurrency == 0 {
            return Err(TrendsError::InvalidConfig(
                "collection.host_concurrency must be > 0".into(),
            ));
        }
        if self.run_deadline_secs == 0 {
            return Err(TrendsError::InvalidConfig("run_deadline_secs must be > 0".into()));
        }
        Ok(())
    }
}
