use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use tracing::info;
use trends_core::EngineConfig;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct KernelConfig {
    pub server: ServerConf,
    pub engine: EngineConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConf {
    pub listen: String, // ex: "0.0.0.0:8080"
}

impl Default for ServerConf {
    fn default() -> Self {
        Self { listen: "0.0.0.0:8080".into() }
    }
}

pub fn parse_config(txt: &str) -> Result<KernelConfig, serde_yaml::Error> {
    if txt.trim().is_empty() {
        return Ok(KernelConfig::default());
    }
    serde_yaml::from_str(txt)
}

/// Surcharges via variables d'environnement (TRENDS_BACKEND_URL, TRENDS_LISTEN)
pub fn apply_overrides<F>(cfg: &mut KernelConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("TRENDS_BACKEND_URL").filter(|v| !v.trim().is_empty()) {
        cfg.engine.backend.url = url;
    }
    if let Some(listen) = lookup("TRENDS_LISTEN").filter(|v| !v.trim().is_empty()) {
        cfg.server.listen = listen;
    }
}

/// Charge `$TRENDS_CONFIG` (défaut trends.yaml) puis applique les surcharges env.
/// Fichier absent ou vide => défauts; YAML invalide => erreur au démarrage.
pub async fn load_config() -> anyhow::Result<KernelConfig> {
    let path = std::env::var("TRENDS_CONFIG").unwrap_or_else(|_| "trends.yaml".into());
    let mut cfg = load_config_from(&path).await?;
    apply_overrides(&mut cfg, |key| std::env::var(key).ok());
    Ok(cfg)
}

pub async fn load_config_from(path: &str) -> anyhow::Result<KernelConfig> {
    if !Path::new(path).exists() {
        info!("pas de {}, usage config par défaut", path);
        return Ok(KernelConfig::default());
    }
    let txt = fs::read_to_string(path)
        .await
        .with_context(|| format!("lecture {}", path))?;
    parse_config(&txt).with_context(|| format!("config invalide {}", path))
}
