//! Deadline scheduler daemon entry point.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use deadline::infrastructure::config::ConfigLoader;
use deadline::infrastructure::store::{connection, SqliteBlueprintStore};
use deadline::services::{LoggingDispatcher, ManagerConfig, ScheduleManager};

#[derive(Debug, Parser)]
#[command(name = "deadline", version, about = "Deadline scheduler daemon", long_about = None)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, env = "DEADLINE_CONFIG", default_value = "config.yaml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::load(&cli.config).context("failed to load configuration")?;
    deadline::infrastructure::logging::init(&config);

    tracing::info!(component = "main", port = config.server.port, "starting deadline scheduler");

    let pool = connection::open(&config.storage.path)
        .await
        .context("failed to open blueprint store")?;
    let store = Arc::new(SqliteBlueprintStore::new(pool));

    let eval_interval = deadline::services::timing::parse_timing(&config.eval_time)
        .context("invalid evalTime in configuration")?;

    let manager = ScheduleManager::new(
        store,
        Arc::new(LoggingDispatcher),
        ManagerConfig { eval_interval },
    );
    manager.start().await;

    let port = config.server.port;
    let serve_result = tokio::select! {
        result = deadline::http::serve(manager.clone(), port) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!(component = "main", "shutdown signal received");
            Ok(())
        }
    };

    manager.stop().await;
    serve_result
}
