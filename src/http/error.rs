//! Maps `DomainError` onto HTTP status codes at the boundary, via a
//! thin `IntoResponse` wrapper rather than threading status codes
//! through the service layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::domain::errors::DomainError;

pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DomainError::InvalidTiming(_)
            | DomainError::InvalidStartTime(_)
            | DomainError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            DomainError::StoreUnavailable(_) | DomainError::InternalInconsistency(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.0.to_string()).into_response()
    }
}
