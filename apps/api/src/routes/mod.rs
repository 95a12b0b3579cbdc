pub mod health;
pub mod pdf;
pub mod resume;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(health::health_handler))
        .route("/health", get(health::health_handler))
        .route("/api/build-resume", post(resume::handle_build_resume))
        .route("/api/download-pdf", post(pdf::handle_download_pdf))
        .route("/api/preview-html", post(pdf::handle_preview_html))
        .route("/api/test-pdf", get(pdf::handle_test_pdf))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
