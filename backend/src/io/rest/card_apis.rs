//! # REST API for Cards
//!
//! Create a card, fetch it for display, and record the receiver's gift choice.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{error, info};

use super::error_response::bad_request;
use crate::AppState;
use shared::{CreateCardRequest, SuccessResponse, UpdateChoiceRequest};

/// Create a new card
pub async fn create_card(
    State(state): State<AppState>,
    request: Result<Json<CreateCardRequest>, JsonRejection>,
) -> impl IntoResponse {
    info!("POST /api/cards");

    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return bad_request(rejection.body_text()),
    };

    match state.card_service.create_card(request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => {
            error!("Failed to create card: {}", e);
            e.into_response()
        }
    }
}

/// Get a card by ID
pub async fn get_card(State(state): State<AppState>, Path(card_id): Path<String>) -> impl IntoResponse {
    info!("GET /api/cards/{}", card_id);

    match state.card_service.get_card(&card_id).await {
        Ok(card) => (StatusCode::OK, Json(card)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Record the receiver's gift
pub async fn set_choice(
    State(state): State<AppState>,
    Path(card_id): Path<String>,
    request: Result<Json<UpdateChoiceRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    info!("PUT /api/cards/{}/choice - {}", card_id, request.receiver_choice);

    match state.card_service.set_choice(&card_id, &request.receiver_choice).await {
        Ok(_) => (StatusCode::OK, Json(SuccessResponse { success: true })).into_response(),
        Err(e) => {
            error!("Failed to update choice for {}: {}", card_id, e);
            e.into_response()
        }
    }
}
