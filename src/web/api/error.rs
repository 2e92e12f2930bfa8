use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::mapper::MapError;
use crate::mask::MaskError;

#[derive(Debug)]
pub enum ApiError {
    UnknownStation(String),
    Validation(String),
    Internal(String),
}

impl From<MapError> for ApiError {
    fn from(e: MapError) -> Self {
        match e {
            MapError::UnknownStation(station) => ApiError::UnknownStation(station),
            MapError::MalformedTrack(_) => ApiError::Validation(e.to_string()),
        }
    }
}

impl From<MaskError> for ApiError {
    fn from(e: MaskError) -> Self {
        match e {
            MaskError::Map(e) => e.into(),
            MaskError::InvalidBox { .. } => ApiError::Validation(e.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::UnknownStation(station) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::with_message(
                    "station_not_found",
                    &format!("no calibration loaded for station {}", station),
                )),
            )
                .into_response(),
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::with_message("validation_failed", &msg)),
            )
                .into_response(),
            ApiError::Internal(msg) => {
                log::error!("Request failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::with_message("internal_error", &msg)),
                )
                    .into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn with_message(error: &str, message: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }
}
