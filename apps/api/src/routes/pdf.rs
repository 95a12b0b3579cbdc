//! Axum route handlers for PDF download, HTML preview and the engine self-test.
//!
//! Bodies are parsed by hand rather than with the `Json` extractor so that a
//! malformed body still produces this API's `{error, ...}` shape.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use crate::render::RenderOutcome;
use crate::state::AppState;

const TEST_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body { font-family: Arial, sans-serif; margin: 40px; }
        h1 { color: #333; }
    </style>
</head>
<body>
    <h1>Test PDF</h1>
    <p>This is a test PDF generated by the primary rendering engine.</p>
    <p>If you can read this, PDF generation is working!</p>
</body>
</html>"#;

#[derive(Debug, Deserialize)]
struct HtmlRequest {
    #[serde(default)]
    html: Option<String>,
}

/// POST /api/download-pdf
pub async fn handle_download_pdf(State(state): State<AppState>, body: Bytes) -> Response {
    let request: HtmlRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            error!("Error parsing download request: {e}");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("PDF conversion failed: {e}"),
                    "html": "",
                    "traceback": error_chain(&e),
                })),
            )
                .into_response();
        }
    };

    let Some(html) = request.html.filter(|h| !h.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "No HTML content provided" })),
        )
            .into_response();
    };

    match state.renderer.render(&html).await {
        RenderOutcome::Rendered(pdf) => {
            info!("Sending PDF ({}): {} bytes", pdf.engine, pdf.bytes.len());
            pdf_attachment(pdf.bytes, "ats-resume.pdf")
        }
        RenderOutcome::Unavailable { html } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Server PDF conversion unavailable",
                "html": html,
                "message": "Please use browser print or install WeasyPrint/wkhtmltopdf on server",
                "client_side_conversion": true,
            })),
        )
            .into_response(),
        RenderOutcome::TooSmall { html, size } => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Generated PDF is too small",
                "html": html,
                "pdf_size": size,
            })),
        )
            .into_response(),
    }
}

/// POST /api/preview-html
/// Echoes the submitted HTML back as a page.
pub async fn handle_preview_html(body: Bytes) -> Response {
    match serde_json::from_slice::<HtmlRequest>(&body) {
        Ok(request) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
            request.html.unwrap_or_default(),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )
            .into_response(),
    }
}

/// GET /api/test-pdf
/// Renders a fixed sample through the primary engine only.
pub async fn handle_test_pdf(State(state): State<AppState>) -> Response {
    info!("Testing PDF generation with simple HTML...");
    match state.renderer.render_with_primary(TEST_HTML).await {
        Ok(pdf) => pdf_attachment(pdf.bytes, "test.pdf"),
        Err(e) => {
            error!("Test PDF failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": e.to_string(),
                    "traceback": error_chain(&e),
                })),
            )
                .into_response()
        }
    }
}

fn pdf_attachment(bytes: Vec<u8>, filename: &str) -> Response {
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
        (header::CONTENT_LENGTH, bytes.len().to_string()),
        (
            header::CACHE_CONTROL,
            "no-cache, no-store, must-revalidate".to_string(),
        ),
        (header::PRAGMA, "no-cache".to_string()),
        (header::EXPIRES, "0".to_string()),
    ];
    (StatusCode::OK, headers, bytes).into_response()
}

/// Renders an error and its `source()` chain, one cause per line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str("\nCaused by: ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
