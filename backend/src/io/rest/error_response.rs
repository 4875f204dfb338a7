use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shared::ErrorResponse;
use tracing::error;

use crate::domain::CardError;

impl CardError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CardError::Validation(_) | CardError::InvalidCardId(_) | CardError::InvalidChoice(_) => {
                StatusCode::BAD_REQUEST
            }
            CardError::NotFound | CardError::FileNotFound => StatusCode::NOT_FOUND,
            CardError::ChoiceAlreadyMade(_) | CardError::DuplicateCard(_) => StatusCode::CONFLICT,
            CardError::Forbidden => StatusCode::FORBIDDEN,
            CardError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            CardError::UnsupportedMedia(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            CardError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CardError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            CardError::Storage(e) => {
                error!("Storage failure: {:#}", e);
                ErrorResponse { error: "Internal server error".to_string(), details: Some(e.to_string()) }
            }
            other => ErrorResponse { error: other.to_string(), details: None },
        };
        (status, Json(body)).into_response()
    }
}

/// 400 for request bodies axum could not parse
pub fn bad_request(details: impl ToString) -> Response {
    let body = ErrorResponse {
        error: "Missing required fields".to_string(),
        details: Some(details.to_string()),
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}
