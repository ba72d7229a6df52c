//! Kernel HTTP et CLI du service de tendances CPU.

pub mod config;
pub mod health;
pub mod http;

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "trends_core=info,trends_kernel=info";

/// Init du logging (RUST_LOG prioritaire)
pub fn init_tracing(to_stderr: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    if to_stderr {
        builder.with_writer(std::io::stderr).init();
    } else {
        builder.init();
    }
}
