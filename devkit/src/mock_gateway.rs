/*!
Mock MetricsGateway pour développement sans Prometheus

Permet de tester le pipeline de scoring sans backend réel.
Enregistre toutes les requêtes reçues et renvoie des réponses préparées,
avec échecs et latences injectables par requête.
*/

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use trends_core::{MetricsGateway, QueryRange, Result, TrendsError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Instant,
    Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub kind: CallKind,
    pub query: String,
    pub range: Option<QueryRange>,
}

#[derive(Debug, Clone, Default)]
struct Script {
    response: Option<Result<String>>,
    /// Nombre d'échecs backend à renvoyer avant la réponse
    transient_failures: u32,
    delay: Option<Duration>,
}

/// Mock gateway qui simule un backend Prometheus
#[derive(Clone, Default)]
pub struct MockGateway {
    scripts: Arc<Mutex<HashMap<String, Script>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Réponse texte brute pour une requête exacte
    pub fn respond(&self, query: impl Into<String>, raw: impl Into<String>) -> &Self {
        self.scripts.lock().entry(query.into()).or_default().response = Some(Ok(raw.into()));
        self
    }

    /// Erreur permanente pour une requête
    pub fn fail(&self, query: impl Into<String>, error: TrendsError) -> &Self {
        self.scripts.lock().entry(query.into()).or_default().response = Some(Err(error));
        self
    }

    /// Les `times` premiers appels échouent en BackendQueryFailed
    pub fn fail_times(&self, query: impl Into<String>, times: u32) -> &Self {
        self.scripts.lock().entry(query.into()).or_default().transient_failures = times;
        self
    }

    /// Latence simulée avant la réponse
    pub fn delay(&self, query: impl Into<String>, delay: Duration) -> &Self {
        self.scripts.lock().entry(query.into()).or_default().delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, query: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.query == query).count()
    }

    pub fn range_calls(&self) -> Vec<MockCall> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.kind == CallKind::Range)
            .cloned()
            .collect()
    }

    /// Reset des scripts et de l'historique
    pub fn clear(&self) {
        self.scripts.lock().clear();
        self.calls.lock().clear();
    }

    async fn answer(&self, kind: CallKind, query: &str, range: Option<QueryRange>) -> Result<String> {
        self.calls.lock().push(MockCall {
            kind,
            query: query.to_string(),
            range,
        });

        let (delay, outcome) = {
            let mut scripts = self.scripts.lock();
            match scripts.get_mut(query) {
                Some(script) if script.transient_failures > 0 => {
                    script.transient_failures -= 1;
                    (
                        script.delay,
                        Err(TrendsError::backend(query, "simulated backend outage")),
                    )
                }
                Some(script) => (
                    script.delay,
                    script
                        .response
                        .clone()
                        .unwrap_or_else(|| Err(TrendsError::backend(query, "no scripted response"))),
                ),
                None => (None, Err(TrendsError::backend(query, "unknown query"))),
            }
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        tracing::debug!("🧪 [MOCK] {:?} {}", kind, query);
        outcome
    }
}

#[async_trait]
impl MetricsGateway for MockGateway {
    async fn instant_query(&self, query: &str) -> Result<String> {
        self.answer(CallKind::Instant, query, None).await
    }

    async fn range_query(&self, query: &str, range: &QueryRange) -> Result<String> {
        self.answer(CallKind::Range, query, Some(*range)).await
    }
}
