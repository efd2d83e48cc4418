//! HTTP control plane: event ingestion, blueprint registration/lookup,
//! and schedule snapshot retrieval, served over a plain REST router.

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::services::ScheduleManager;

/// Build the axum router. `GET /api/v1/schedule` falls back to axum's
/// default 405 for any other method on that path.
pub fn router(manager: Arc<ScheduleManager>) -> Router {
    Router::new()
        .route("/api/v1/event", axum::routing::post(handlers::event::ingest_event))
        .route(
            "/api/v1/blueprint",
            get(handlers::blueprint::get_blueprint).put(handlers::blueprint::register_blueprint),
        )
        .route("/api/v1/schedule", get(handlers::schedule::get_schedule))
        .layer(TraceLayer::new_for_http())
        .with_state(manager)
}

/// Bind and serve the router until the process is signalled to stop.
pub async fn serve(manager: Arc<ScheduleManager>, port: u16) -> anyhow::Result<()> {
    let app = router(manager);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(component = "http", %addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
