//! `GET /api/v1/schedule`

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::domain::models::ScheduleSnapshot;
use crate::services::ScheduleManager;

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    name: String,
}

pub async fn get_schedule(
    State(manager): State<Arc<ScheduleManager>>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<ScheduleSnapshot>, StatusCode> {
    manager
        .get_schedule(&query.name)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
