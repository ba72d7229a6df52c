//! Cluster orchestration
//!
//! One tokio task per configured cluster runs discovery → collection →
//! scoring. All tasks are joined before anything is rendered. A failing
//! cluster (no hosts, backend down, deadline, panic) becomes a
//! [`ClusterFailure`] in the report; its siblings are unaffected.

use crate::collector::collect_cluster;
use crate::config::EngineConfig;
use crate::discovery::discover_hosts;
use crate::error::{Result, TrendsError};
use crate::gateway::{MetricsGateway, QueryRange};
use crate::models::{Cluster, ClusterFailure};
use crate::render::{self, SummaryDocument, TrendsDocument};
use crate::scoring::{cluster_average, score_cluster};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// Outcome of one scoring pass, clusters kept in configuration order
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub scored: Vec<Cluster>,
    pub failures: Vec<ClusterFailure>,
}

impl RunReport {
    pub fn trends(&self) -> TrendsDocument {
        render::trends_document(&self.scored, &self.failures)
    }

    pub fn summary(&self) -> SummaryDocument {
        render::summary_document(&self.scored, &self.failures)
    }

    pub fn text(&self) -> String {
        render::text_report(&self.scored, &self.failures)
    }

    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    /// True when clusters were attempted and none could be scored
    pub fn all_failed(&self) -> bool {
        self.scored.is_empty() && !self.failures.is_empty()
    }
}

#[derive(Clone)]
pub struct Orchestrator {
    gateway: Arc<dyn MetricsGateway>,
    config: Arc<EngineConfig>,
}

impl Orchestrator {
    pub fn new(gateway: Arc<dyn MetricsGateway>, config: EngineConfig) -> Self {
        Self {
            gateway,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn lookback(&self) -> QueryRange {
        QueryRange::lookback(
            self.config.collection.lookback_days,
            Duration::from_secs(self.config.collection.step_secs),
        )
    }

    /// Runs the whole pipeline for a single cluster, no deadline applied.
    pub async fn score_cluster(&self, name: &str) -> Result<Cluster> {
        let range = self.lookback();
        run_pipeline(self.gateway.as_ref(), &self.config, name, &range).await
    }

    /// Scores every configured cluster concurrently.
    pub async fn run(&self) -> RunReport {
        let run_id = Uuid::new_v4();
        self.run_inner(run_id)
            .instrument(info_span!("scoring_run", %run_id))
            .await
    }

    async fn run_inner(&self, run_id: Uuid) -> RunReport {
        let started_at = Utc::now();
        let clock = std::time::Instant::now();
        let range = self.lookback();
        let deadline_secs = self.config.run_deadline_secs;
        let deadline = tokio::time::Instant::now() + self.config.run_deadline();

        info!(
            "scoring {} clusters over {} days",
            self.config.clusters.len(),
            self.config.collection.lookback_days
        );

        let handles: Vec<_> = self
            .config
            .clusters
            .iter()
            .map(|name| {
                let gateway = Arc::clone(&self.gateway);
                let config = Arc::clone(&self.config);
                let task_name = name.clone();
                let span = info_span!("cluster", name = %name);
                tokio::spawn(
                    async move {
                        let pipeline = run_pipeline(gateway.as_ref(), &config, &task_name, &range);
                        match tokio::time::timeout_at(deadline, pipeline).await {
                            Ok(outcome) => outcome,
                            Err(_) => Err(TrendsError::DeadlineExceeded {
                                seconds: deadline_secs,
                            }),
                        }
                    }
                    .instrument(span),
                )
            })
            .collect();

        let outcomes = join_all(handles).await;

        let mut scored = Vec::new();
        let mut failures = Vec::new();
        for (name, joined) in self.config.clusters.iter().zip(outcomes) {
            let outcome = joined.unwrap_or_else(|e| {
                Err(TrendsError::TaskFailed {
                    cluster: name.clone(),
                    reason: e.to_string(),
                })
            });
            match outcome {
                Ok(cluster) => scored.push(cluster),
                Err(error) => {
                    warn!("cluster {} not scored: {}", name, error);
                    failures.push(ClusterFailure {
                        cluster: name.clone(),
                        error,
                    });
                }
            }
        }

        let elapsed = clock.elapsed();
        info!(
            "run {} done in {:?}: {} scored, {} failed",
            run_id,
            elapsed,
            scored.len(),
            failures.len()
        );

        RunReport {
            run_id,
            started_at,
            elapsed,
            scored,
            failures,
        }
    }

    pub async fn trends(&self) -> TrendsDocument {
        self.run().await.trends()
    }

    pub async fn summary(&self) -> SummaryDocument {
        self.run().await.summary()
    }
}

async fn run_pipeline(
    gateway: &dyn MetricsGateway,
    config: &EngineConfig,
    name: &str,
    range: &QueryRange,
) -> Result<Cluster> {
    let mut cluster = Cluster::new(name);
    cluster.hosts = discover_hosts(gateway, &config.queries, name).await?;
    collect_cluster(gateway, &config.queries, &config.collection, &mut cluster, range).await?;

    let card = score_cluster(&cluster.hosts);
    cluster.average_cpu = cluster_average(&cluster.hosts);
    info!(
        "{}: score {} ({:?}) over {} hosts, {} dropped",
        name,
        card.score,
        card.tier,
        cluster.hosts.len(),
        cluster.host_failures.len()
    );
    cluster.scorecard = Some(card);
    Ok(cluster)
}
