//! Structured logging setup.
//!
//! Builds a single `tracing_subscriber::EnvFilter` directive string
//! from a global default plus per-component overrides.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::domain::models::Config;

/// Initialize the global `tracing` subscriber from `config`.
///
/// Components with no entry in `config.log_config` default to `info`.
pub fn init(config: &Config) {
    let mut directives = vec!["info".to_string()];
    for (component, level) in &config.log_config {
        directives.push(format!("{component}={level}"));
    }
    let filter_str = directives.join(",");

    let filter = EnvFilter::try_new(&filter_str).unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
