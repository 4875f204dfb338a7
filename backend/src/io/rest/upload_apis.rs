use axum::{
    extract::{
        multipart::{Multipart, MultipartError, MultipartRejection},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{error, info};

use crate::domain::{CardError, UploadedFile};
use crate::AppState;
use shared::UploadResponse;

/// Accept one image in the multipart field `file`
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> impl IntoResponse {
    info!("POST /api/upload");

    let limit = state.upload_service.max_bytes();
    let file = match multipart {
        Ok(mut multipart) => read_file_field(&mut multipart, limit).await,
        Err(rejection) => Err(CardError::Validation(rejection.body_text())),
    };

    let result = match file {
        Ok(file) => state.upload_service.store_upload(file).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(path) => (StatusCode::OK, Json(UploadResponse { success: true, path })).into_response(),
        Err(e) => {
            error!("Upload failed: {}", e);
            e.into_response()
        }
    }
}

async fn read_file_field(multipart: &mut Multipart, limit: usize) -> Result<UploadedFile, CardError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| multipart_error(e, limit))? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        return Ok(UploadedFile { file_name, content_type, bytes: bytes.to_vec() });
    }
    Err(CardError::Validation("No file provided".to_string()))
}

fn multipart_error(e: MultipartError, limit: usize) -> CardError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        CardError::PayloadTooLarge { limit }
    } else {
        CardError::Validation(e.body_text())
    }
}
