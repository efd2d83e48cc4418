//! `POST /api/v1/event`

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::domain::models::Event;
use crate::services::ScheduleManager;

#[derive(Debug, Deserialize)]
pub struct EventBody {
    name: String,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

/// Accepts an event, stamps `received_at`, and routes it to every live
/// schedule subscribed to its name. Always 200 once the body parses —
/// an event with no matching schedule is accepted and silently dropped.
pub async fn ingest_event(
    State(manager): State<Arc<ScheduleManager>>,
    Json(body): Json<EventBody>,
) -> Result<StatusCode, StatusCode> {
    let event = Event::new(body.name, body.payload);
    if !event.is_valid() {
        return Err(StatusCode::BAD_REQUEST);
    }
    manager.ingest(event).await;
    Ok(StatusCode::OK)
}
