/**
 * API REST TRENDS - Serveur HTTP du kernel
 *
 * RÔLE :
 * Expose les rendus du scoring CPU des clusters vSphere.
 * Chaque appel à /summary ou /trends déclenche un passage complet du moteur.
 *
 * FONCTIONNEMENT :
 * - Serveur Axum, routes : /health, /system/health, /summary, /trends
 * - Sérialisation JSON compacte des documents
 * - Résultat partiel (certains clusters en échec) => 200 + liste failures
 * - Tous les clusters en échec => 502 avec le même corps
 *
 * UTILITÉ :
 * 🎯 Bot chat ops : /summary pour l'état groupé Red/Yellow/Green
 * 🎯 Rapport détaillé : /trends avec le message par cluster
 * 🎯 Monitoring : /system/health (uptime, derniers passages)
 */

use crate::health::{HealthTracker, KernelHealth};
use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use tracing::{info, warn};
use trends_core::{Orchestrator, RunReport, SummaryDocument, TrendsDocument};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub health_tracker: HealthTracker,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self {
            orchestrator,
            health_tracker: HealthTracker::new(),
        }
    }
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/system/health", get(get_system_health))
        .route("/summary", get(get_summary))
        .route("/trends", get(get_trends))
        .with_state(app_state)
}

async fn get_system_health(State(app): State<AppState>) -> Json<KernelHealth> {
    Json(app.health_tracker.get_health())
}

async fn get_summary(State(app): State<AppState>) -> (StatusCode, Json<SummaryDocument>) {
    let report = run_and_record(&app).await;
    (status_for(&report), Json(report.summary()))
}

async fn get_trends(State(app): State<AppState>) -> (StatusCode, Json<TrendsDocument>) {
    let report = run_and_record(&app).await;
    (status_for(&report), Json(report.trends()))
}

async fn run_and_record(app: &AppState) -> RunReport {
    let report = app.orchestrator.run().await;
    app.health_tracker.record_run(&report);

    if report.all_failed() {
        warn!(run_id = %report.run_id, "aucun cluster scoré");
    } else {
        info!(
            run_id = %report.run_id,
            scored = report.scored.len(),
            failed = report.failures.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "passage terminé"
        );
    }
    report
}

fn status_for(report: &RunReport) -> StatusCode {
    if report.all_failed() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    }
}
