//! Passage unique du scoring, rapport texte sur stdout.
//!
//! Code de sortie 1 si aucun cluster n'a pu être scoré.

use anyhow::Context;
use std::process::ExitCode;
use trends_core::{build_gateway, Orchestrator};
use trends_kernel::config::load_config;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    // logs sur stderr, stdout réservé au rapport
    trends_kernel::init_tracing(true);

    let cfg = load_config().await?;
    cfg.engine.validate().context("config moteur invalide")?;

    let gateway = build_gateway(&cfg.engine)?;
    let report = Orchestrator::new(gateway, cfg.engine).run().await;

    print!("{}", report.text());

    if report.all_failed() {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
