use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::dto::ErrorResponse;
use crate::store::StoreError;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Store(StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not Found", Some(msg)),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad Request", Some(msg)),
            ApiError::Store(err) => match &err {
                StoreError::NotFound(what) => {
                    (StatusCode::NOT_FOUND, "Not Found", Some(what.clone()))
                }
                StoreError::InvalidName(_) | StoreError::InvalidTimestamp(_) => {
                    (StatusCode::BAD_REQUEST, "Bad Request", Some(err.to_string()))
                }
                // The mutation may or may not have landed; callers
                // should re-read rather than assume failure.
                StoreError::ConfirmationTimeout { .. } => (
                    StatusCode::GATEWAY_TIMEOUT,
                    "Confirmation Timeout",
                    Some(err.to_string()),
                ),
                StoreError::BackendRead(_) | StoreError::BackendWrite(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Backend Error",
                    Some(err.to_string()),
                ),
                StoreError::Validator(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Validator Error",
                    Some(err.to_string()),
                ),
            },
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            details,
        });

        (status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Store(err)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
