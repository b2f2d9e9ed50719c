use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::server::handlers::{auth, chat, health, medicines, prescriptions};
use crate::state::AppState;

/// Creates the application router with all routes and middleware.
///
/// - Health check
/// - Auth (register, login)
/// - Medicine catalog
/// - Prescription upload + OCR, with uploads served under `/uploads`
/// - RAG chat
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = build_cors_layer(&state.settings.server.cors_allowed_origins);
    let uploads = ServeDir::new(&state.paths.uploads_dir);
    let body_limit = state.settings.uploads.max_bytes;

    Router::new()
        .route("/health", get(health::health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/medicines", get(medicines::list_medicines))
        .route(
            "/api/upload-prescription",
            post(prescriptions::upload_prescription),
        )
        .route("/api/chat", post(chat::chat))
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

fn build_cors_layer(configured: &[String]) -> CorsLayer {
    let allow_origin = if configured.iter().any(|origin| origin == "*") {
        AllowOrigin::any()
    } else {
        let origins = if configured.is_empty() {
            default_local_origins()
        } else {
            configured.to_vec()
        };
        let allowed_origins = origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin).ok())
            .collect::<Vec<_>>();
        AllowOrigin::list(allowed_origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
}

fn default_local_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}
