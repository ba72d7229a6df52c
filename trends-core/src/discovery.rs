//! Host discovery
//!
//! Lists the ESX hosts of a cluster from an instant query and pulls the
//! hostname out of the `esxhostname` label of each result line.

use crate::config::QueryTemplates;
use crate::error::{Result, TrendsError};
use crate::gateway::MetricsGateway;
use crate::models::Host;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

static HOSTNAME_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"esxhostname="([^"]+)""#).unwrap_or_else(|_| unreachable!()));

/// Hostname carried by one result line, if any.
pub fn extract_hostname(line: &str) -> Option<&str> {
    HOSTNAME_LABEL
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Hostnames in discovery order, first occurrence wins.
pub fn parse_hosts(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.lines()
        .filter_map(extract_hostname)
        .filter(|host| seen.insert(*host))
        .map(str::to_string)
        .collect()
}

pub async fn discover_hosts(
    gateway: &dyn MetricsGateway,
    queries: &QueryTemplates,
    cluster: &str,
) -> Result<Vec<Host>> {
    let query = queries.discovery_query(cluster);
    let raw = gateway.instant_query(&query).await?;

    let hosts: Vec<Host> = parse_hosts(&raw).into_iter().map(Host::new).collect();
    if hosts.is_empty() {
        return Err(TrendsError::NoHostsFound {
            cluster: cluster.to_string(),
        });
    }

    debug!("{} hosts discovered for {}", hosts.len(), cluster);
    Ok(hosts)
}
