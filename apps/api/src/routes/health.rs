use axum::{extract::State, Json};
use serde_json::{json, Map, Value};

use crate::render::EngineKind;
use crate::state::AppState;

/// GET / and GET /health
/// Returns service status and the startup availability of each rendering engine.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let engines: Map<String, Value> = EngineKind::ALL
        .into_iter()
        .map(|kind| {
            (
                kind.health_key().to_string(),
                Value::Bool(state.renderer.is_available(kind.id())),
            )
        })
        .collect();

    Json(json!({
        "status": "healthy",
        "service": "ATS Resume Builder API",
        "version": env!("CARGO_PKG_VERSION"),
        "pdf_engines": engines,
    }))
}
