//! # Valentine Card Server
//!
//! Stores cards and uploaded photos for the card maker and serves the client
//! app.
//!
//! ```text
//! Client app (Yew)
//!     ↓
//! IO layer      (axum handlers under /api, app shell fallback)
//!     ↓
//! Domain layer  (CardService, UploadService, MetaRewriter)
//!     ↓
//! Storage layer (SQLite key-value cards, filesystem blobs)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post, put, MethodRouter},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::domain::{CardService, MetaRewriter, UploadService, UrlSigner};
use crate::storage::{BlobStore, DbConnection};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub card_service: CardService,
    pub upload_service: UploadService,
    pub meta_rewriter: MetaRewriter,
    pub frontend_dist: PathBuf,
    pub cors_origin: Option<String>,
}

impl AppState {
    pub fn new(db: DbConnection, blobs: BlobStore, config: &ServerConfig) -> Self {
        let signer = UrlSigner::new(config.signing_secret.as_bytes(), &config.public_url, config.signed_url_ttl);
        Self {
            card_service: CardService::new(Arc::new(db), signer.clone()),
            upload_service: UploadService::new(blobs, signer, config.max_upload_bytes),
            meta_rewriter: MetaRewriter::new(&config.public_url),
            frontend_dist: config.frontend_dist.clone(),
            cors_origin: config.cors_origin.clone(),
        }
    }
}

/// Open storage and build the services
pub async fn initialize_backend(config: &ServerConfig) -> Result<AppState> {
    info!("Setting up database at {}", config.database_url);
    let db = DbConnection::new(&config.database_url).await?;

    info!("Setting up upload directory at {}", config.upload_dir.display());
    let blobs = BlobStore::new(&config.upload_dir).await?;

    Ok(AppState::new(db, blobs, config))
}

/// Create the router: `/api` endpoints, then static files, then the app shell
pub fn create_router(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(Duration::from_secs(600));
    let cors = match app_state.cors_origin.as_deref().map(str::parse::<HeaderValue>) {
        Some(Ok(origin)) => cors.allow_origin(origin),
        Some(Err(e)) => {
            warn!("Ignoring invalid CORS origin: {}", e);
            cors.allow_origin(Any)
        }
        None => cors.allow_origin(Any),
    };

    // Leave room for the multipart framing around a maximum-size file
    let upload_body_limit = app_state.upload_service.max_bytes() + 64 * 1024;

    let api_routes = Router::new()
        .route("/health", get(io::health))
        .route("/cards", post(io::create_card))
        .route("/cards/:card_id", get(io::get_card))
        .route("/cards/:card_id/choice", put(io::set_choice))
        .route("/upload", post(io::upload_image).layer(DefaultBodyLimit::max(upload_body_limit)))
        .route("/files/*path", get(io::get_file))
        .route("/logs", post(io::log_message))
        .fallback(io::api_not_found);

    let app_shell: MethodRouter = get(io::serve_index).with_state(app_state.clone());
    let static_files = ServeDir::new(&app_state.frontend_dist).fallback(app_shell);

    Router::new()
        .nest("/api", api_routes)
        .fallback_service(static_files)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        _dirs: TempDir,
    }

    async fn setup_test() -> TestApp {
        let dirs = tempfile::tempdir().unwrap();
        let dist = dirs.path().join("dist");
        std::fs::create_dir_all(&dist).unwrap();
        std::fs::write(
            dist.join("index.html"),
            r#"<html lang="en"><head><title>Card Maker</title><meta property="og:title" content="Card Maker" /></head><body></body></html>"#,
        )
        .unwrap();

        let config = ServerConfig {
            upload_dir: dirs.path().join("uploads"),
            frontend_dist: dist,
            signing_secret: "test-secret".to_string(),
            public_url: "http://cards.test".to_string(),
            max_upload_bytes: 1024,
            ..ServerConfig::default()
        };
        let db = DbConnection::init_test().await.expect("Failed to create test database");
        let blobs = BlobStore::new(&config.upload_dir).await.unwrap();

        TestApp { router: create_router(AppState::new(db, blobs, &config)), _dirs: dirs }
    }

    async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn send_json(app: &TestApp, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let (status, bytes) = send(app, request).await;
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn card_body(card_id: &str, sender_image: &str) -> Value {
        json!({
            "cardId": card_id,
            "senderImage": sender_image,
            "message": "Will you be my valentine?",
            "gifts": [
                { "id": "g1", "name": "Roses", "image": "https://example.com/roses.png" },
                { "id": "g2", "name": "Teddy", "image": "https://example.com/teddy.png" }
            ]
        })
    }

    fn multipart_request(file_name: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
        let boundary = "valentine-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n", file_name).as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary))
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = setup_test().await;
        let (status, body) = send_json(&app, "GET", "/api/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_card_lifecycle() {
        let app = setup_test().await;

        let (status, body) = send_json(&app, "POST", "/api/cards", Some(card_body("abc123", "https://example.com/me.jpg"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true, "cardId": "abc123" }));

        let (status, card) = send_json(&app, "GET", "/api/cards/abc123", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(card["message"], "Will you be my valentine?");
        assert_eq!(card["gifts"].as_array().unwrap().len(), 2);
        assert!(card.get("receiverChoice").is_none());
        assert!(card["createdAt"].as_i64().unwrap() > 0);

        let choice = Some(json!({ "receiverChoice": "g2" }));
        let (status, body) = send_json(&app, "PUT", "/api/cards/abc123/choice", choice.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "success": true }));

        let (status, _) = send_json(&app, "PUT", "/api/cards/abc123/choice", choice).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) =
            send_json(&app, "PUT", "/api/cards/abc123/choice", Some(json!({ "receiverChoice": "g1" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("g2"));

        let (_, card) = send_json(&app, "GET", "/api/cards/abc123", None).await;
        assert_eq!(card["receiverChoice"], "g2");
    }

    #[tokio::test]
    async fn test_card_error_statuses() {
        let app = setup_test().await;
        send_json(&app, "POST", "/api/cards", Some(card_body("dup", "https://example.com/me.jpg"))).await;

        let (status, _) = send_json(&app, "POST", "/api/cards", Some(card_body("dup", "https://example.com/me.jpg"))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send_json(&app, "POST", "/api/cards", Some(json!({ "message": "hi" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing required fields");

        let (status, body) = send_json(&app, "GET", "/api/cards/missing", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Card not found");

        let (status, _) =
            send_json(&app, "PUT", "/api/cards/missing/choice", Some(json!({ "receiverChoice": "g1" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send_json(&app, "PUT", "/api/cards/dup/choice", Some(json!({ "receiverChoice": "g9" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send_json(&app, "GET", "/api/nothing-here", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_then_fetch_signed_image() {
        let app = setup_test().await;

        let (status, bytes) = send(&app, multipart_request("me.png", "image/png", b"fake-png")).await;
        assert_eq!(status, StatusCode::OK);
        let upload: Value = serde_json::from_slice(&bytes).unwrap();
        let path = upload["path"].as_str().unwrap().to_string();
        assert!(path.starts_with("storage/") && path.ends_with(".png"));

        send_json(&app, "POST", "/api/cards", Some(card_body("photo", &path))).await;
        let (_, card) = send_json(&app, "GET", "/api/cards/photo", None).await;
        let signed = card["senderImage"].as_str().unwrap();
        let local = signed.strip_prefix("http://cards.test").expect("absolute signed URL");

        let (status, bytes) = send(&app, Request::get(local).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(bytes, b"fake-png");

        let tampered = local.replace("signature=", "signature=0");
        let (status, _) = send(&app, Request::get(tampered).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let unsigned = local.split('?').next().unwrap().to_string();
        let (status, _) = send(&app, Request::get(unsigned).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_upload_rejections() {
        let app = setup_test().await;

        let (status, _) = send(&app, multipart_request("big.png", "image/png", &[0u8; 2048])).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

        let (status, _) = send(&app, multipart_request("notes.txt", "text/plain", b"hello")).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_served_files_cannot_run_as_documents() {
        let app = setup_test().await;

        let (status, _) = send(&app, multipart_request("heart.svg", "image/svg+xml", b"<svg onload=alert(1)/>")).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let (_, bytes) = send(&app, multipart_request("me.png", "image/png", b"fake-png")).await;
        let upload: Value = serde_json::from_slice(&bytes).unwrap();
        send_json(&app, "POST", "/api/cards", Some(card_body("safe", upload["path"].as_str().unwrap()))).await;
        let (_, card) = send_json(&app, "GET", "/api/cards/safe", None).await;
        let local = card["senderImage"].as_str().unwrap().strip_prefix("http://cards.test").unwrap().to_string();

        let response = app.router.clone().oneshot(Request::get(local).body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "image/png");
        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        let csp = headers[header::CONTENT_SECURITY_POLICY].to_str().unwrap();
        assert!(csp.contains("default-src 'none'") && csp.contains("sandbox"));
    }

    #[tokio::test]
    async fn test_logs_endpoint() {
        let app = setup_test().await;
        let body = json!({ "level": "warn", "message": "capture slow", "component": "summary" });

        let (status, response) = send_json(&app, "POST", "/api/logs", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(response, json!({ "success": true }));
    }

    #[tokio::test]
    async fn test_card_page_gets_preview_tags() {
        let app = setup_test().await;

        let (status, bytes) = send(&app, Request::get("/card/abc123").body(Body::empty()).unwrap()).await;
        let html = String::from_utf8(bytes).unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("<html lang=\"th\">"));
        assert!(html.contains(r#"<meta property="og:url" content="http://cards.test/card/abc123" />"#));

        let (status, bytes) = send(&app, Request::get("/create").body(Body::empty()).unwrap()).await;
        let html = String::from_utf8(bytes).unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("<title>Card Maker</title>"));
    }
}
