//! CPU sample collection
//!
//! One range query per host over the lookback window. Hosts are fetched with
//! bounded concurrency; a host whose query or parsing fails is dropped from
//! the cluster and recorded in `host_failures` instead of failing its
//! siblings.

use crate::config::{CollectionConf, QueryTemplates};
use crate::error::{Result, TrendsError};
use crate::gateway::{MetricsGateway, QueryRange};
use crate::models::{Cluster, Host, HostFailure};
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

/// Lines before the first sample in a rendered matrix (`name{...} =>` and
/// the `# points=` metadata).
const MATRIX_HEADER_LINES: usize = 2;

/// Parses `value @[ts]` lines into percentages, skipping the matrix header.
pub fn parse_samples(raw: &str, host: &str) -> Result<Vec<f64>> {
    raw.lines()
        .skip(MATRIX_HEADER_LINES)
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let value = line.split_once(" @").map_or(line, |(value, _)| value).trim();
            value.parse::<f64>().map_err(|e| TrendsError::SampleParseFailed {
                host: host.to_string(),
                value: value.to_string(),
                reason: e.to_string(),
            })
        })
        .collect()
}

pub async fn collect_host(
    gateway: &dyn MetricsGateway,
    queries: &QueryTemplates,
    cluster: &str,
    host: &str,
    range: &QueryRange,
) -> Result<Vec<f64>> {
    let query = queries.cpu_query(cluster, host);
    let raw = gateway.range_query(&query, range).await?;
    let samples = parse_samples(&raw, host)?;
    debug!("{}/{}: {} samples", cluster, host, samples.len());
    Ok(samples)
}

/// Fills the samples of every host of `cluster`, keeping discovery order.
///
/// Fails only when no host at all could be collected; the first host error
/// is then returned as the cluster's failure.
pub async fn collect_cluster(
    gateway: &dyn MetricsGateway,
    queries: &QueryTemplates,
    collection: &CollectionConf,
    cluster: &mut Cluster,
    range: &QueryRange,
) -> Result<()> {
    let cluster_name = cluster.name.clone();
    let hosts = std::mem::take(&mut cluster.hosts);

    let results: Vec<(Host, Result<Vec<f64>>)> = stream::iter(hosts)
        .map(|host| {
            let cluster_name = cluster_name.as_str();
            async move {
                let samples = collect_host(gateway, queries, cluster_name, &host.name, range).await;
                (host, samples)
            }
        })
        .buffered(collection.host_concurrency.max(1))
        .collect()
        .await;

    for (mut host, outcome) in results {
        match outcome {
            Ok(samples) => {
                host.samples = samples;
                cluster.hosts.push(host);
            }
            Err(error) => {
                warn!("{}: dropping host {}: {}", cluster_name, host.name, error);
                cluster.host_failures.push(HostFailure {
                    host: host.name,
                    error,
                });
            }
        }
    }

    if cluster.hosts.is_empty() {
        if let Some(first) = cluster.host_failures.first() {
            return Err(first.error.clone());
        }
        return Err(TrendsError::NoHostsFound { cluster: cluster_name });
    }
    Ok(())
}
