/*!
# Trends DevKit - Stubs et Utilitaires pour les tests du moteur de scoring

Bibliothèque facilitant les tests du pipeline avec:
- Mock du MetricsGateway (réponses préparées, pannes, latences)
- Fixtures texte au format Prometheus rendu
- Fixture de flotte prête à brancher sur l'Orchestrator
*/

pub mod fixtures;
pub mod mock_gateway;
pub mod test_utils;

pub use mock_gateway::{CallKind, MockCall, MockGateway};
pub use test_utils::{init_tracing, FleetFixture};
