/**
 * TRENDS KERNEL - Point d'entrée du serveur de tendances CPU
 *
 * RÔLE : Bootstrap config, gateway Prometheus, orchestrateur et API HTTP.
 * UTILITÉ : Sert /summary et /trends aux bots et tableaux de bord.
 */

use anyhow::Context;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use trends_core::{build_gateway, Orchestrator};
use trends_kernel::config::load_config;
use trends_kernel::http::{build_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env optionnel
    dotenvy::dotenv().ok();
    trends_kernel::init_tracing(false);

    let cfg = load_config().await?;
    cfg.engine.validate().context("config moteur invalide")?;

    let gateway = build_gateway(&cfg.engine)?;
    info!(
        backend = %cfg.engine.backend.url,
        clusters = cfg.engine.clusters.len(),
        "moteur prêt"
    );
    let orchestrator = Orchestrator::new(gateway, cfg.engine);

    let app = build_router(AppState::new(orchestrator));

    let addr: SocketAddr = cfg
        .server
        .listen
        .parse()
        .with_context(|| format!("adresse d'écoute invalide: {}", cfg.server.listen))?;
    let listener = TcpListener::bind(addr).await.with_context(|| format!("bind {addr}"))?;
    info!("listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
