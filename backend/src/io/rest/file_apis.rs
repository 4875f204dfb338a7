use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::info;

use crate::domain::CardError;
use crate::AppState;

/// Uploaded files are shown as images only, never run as documents
const FILE_CSP: &str = "default-src 'none'; sandbox";

#[derive(Debug, Deserialize)]
pub struct FileQuery {
    pub expires: i64,
    pub signature: String,
}

/// Serve an uploaded file behind a signed link
pub async fn get_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
    query: Option<Query<FileQuery>>,
) -> impl IntoResponse {
    info!("GET /api/files/{}", path);

    let Some(Query(query)) = query else {
        return CardError::Forbidden.into_response();
    };

    match state.upload_service.open_signed(&path, query.expires, &query.signature).await {
        Ok((bytes, content_type)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, content_type),
                (header::CACHE_CONTROL, "private, max-age=3600"),
                (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
                (header::CONTENT_SECURITY_POLICY, FILE_CSP),
            ],
            bytes,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
