/*!
Fixture de flotte pour les tests du pipeline

Facilite l'écriture de tests avec:
- Setup automatique du MockGateway avec les requêtes réelles des templates
- Config moteur minimale (petits clusters, backoff court)
- Construction de l'Orchestrator avec ou sans retry
*/

use crate::fixtures::{corrupted_matrix_text, discovery_text, empty_discovery_text, matrix_text};
use crate::mock_gateway::MockGateway;
use std::sync::Arc;
use trends_core::{EngineConfig, MetricsGateway, Orchestrator, RetryPolicy, RetryingGateway};

/// Init du logging pour les tests (idempotent)
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Flotte de clusters simulée sur un MockGateway
pub struct FleetFixture {
    pub gateway: MockGateway,
    config: EngineConfig,
}

impl FleetFixture {
    pub fn new(clusters: &[&str]) -> Self {
        init_tracing();

        let mut config = EngineConfig {
            clusters: clusters.iter().map(|c| c.to_string()).collect(),
            ..EngineConfig::default()
        };
        config.backend.retry.initial_backoff_ms = 1;
        config.backend.retry.max_backoff_ms = 5;
        config.backend.request_timeout_secs = 5;
        config.collection.host_concurrency = 2;
        config.run_deadline_secs = 10;

        Self {
            gateway: MockGateway::new(),
            config,
        }
    }

    /// Enregistre la discovery et la série CPU de chaque host
    pub fn with_cluster(self, cluster: &str, hosts: &[(&str, Vec<f64>)]) -> Self {
        let names: Vec<&str> = hosts.iter().map(|(name, _)| *name).collect();
        self.gateway.respond(
            self.config.queries.discovery_query(cluster),
            discovery_text(cluster, &names),
        );
        for (host, samples) in hosts {
            self.gateway
                .respond(self.config.queries.cpu_query(cluster, host), matrix_text(samples));
        }
        self
    }

    /// Discovery qui ne renvoie aucun host
    pub fn without_hosts(self, cluster: &str) -> Self {
        self.gateway.respond(
            self.config.queries.discovery_query(cluster),
            empty_discovery_text(cluster),
        );
        self
    }

    /// Remplace la série d'un host par une série corrompue
    pub fn with_corrupted_host(self, cluster: &str, host: &str, bad: &str) -> Self {
        self.gateway.respond(
            self.config.queries.cpu_query(cluster, host),
            corrupted_matrix_text(&[10.0, 20.0], bad),
        );
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EngineConfig {
        &mut self.config
    }

    pub fn discovery_query(&self, cluster: &str) -> String {
        self.config.queries.discovery_query(cluster)
    }

    pub fn cpu_query(&self, cluster: &str, host: &str) -> String {
        self.config.queries.cpu_query(cluster, host)
    }

    /// Orchestrator branché directement sur le mock
    pub fn orchestrator(&self) -> Orchestrator {
        let gateway: Arc<dyn MetricsGateway> = Arc::new(self.gateway.clone());
        Orchestrator::new(gateway, self.config.clone())
    }

    /// Orchestrator avec la politique de retry de la config
    pub fn orchestrator_with_retry(&self) -> Orchestrator {
        let policy = RetryPolicy::from_config(&self.config.backend);
        let gateway: Arc<dyn MetricsGateway> =
            Arc::new(RetryingGateway::new(self.gateway.clone(), policy));
        Orchestrator::new(gateway, self.config.clone())
    }
}
