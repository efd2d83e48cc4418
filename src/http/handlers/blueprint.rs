//! `GET /api/v1/blueprint` and `PUT /api/v1/blueprint`

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::http::error::ApiError;
use crate::infrastructure::xml_codec;
use crate::services::ScheduleManager;

#[derive(Debug, Deserialize)]
pub struct BlueprintQuery {
    name: String,
}

pub async fn get_blueprint(
    State(manager): State<Arc<ScheduleManager>>,
    Query(query): Query<BlueprintQuery>,
) -> Result<Response, ApiError> {
    let blueprint = manager.get_blueprint(&query.name).await?;
    let Some(blueprint) = blueprint else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };
    let xml = xml_codec::to_xml(&blueprint)?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/xml")],
        xml,
    )
        .into_response())
}

pub async fn register_blueprint(
    State(manager): State<Arc<ScheduleManager>>,
    body: String,
) -> Result<StatusCode, ApiError> {
    let blueprint = xml_codec::from_xml(&body)?;
    manager.register_blueprint(blueprint).await?;
    Ok(StatusCode::CREATED)
}
