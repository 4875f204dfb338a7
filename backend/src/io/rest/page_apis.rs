use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse},
};
use shared::ErrorResponse;
use tracing::{debug, error};

use crate::AppState;

/// Client-side routes all load `index.html`; card links get preview tags
pub async fn serve_index(State(state): State<AppState>, uri: Uri) -> impl IntoResponse {
    let request_uri = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    debug!("Serving app shell for {}", request_uri);

    let index_path = state.frontend_dist.join("index.html");
    match tokio::fs::read_to_string(&index_path).await {
        Ok(html) => Html(state.meta_rewriter.render(&html, request_uri)).into_response(),
        Err(e) => {
            error!("Could not read {}: {}", index_path.display(), e);
            let body = ErrorResponse { error: "index.html not found".to_string(), details: None };
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
        }
    }
}

/// Unknown `/api` routes answer in JSON instead of falling through to the app shell
pub async fn api_not_found(uri: Uri) -> impl IntoResponse {
    let body = ErrorResponse { error: "Not found".to_string(), details: Some(uri.path().to_string()) };
    (StatusCode::NOT_FOUND, axum::Json(body))
}
