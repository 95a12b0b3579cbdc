//! Axum route handler for resume building.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::extract_text_blocking;
use crate::state::AppState;

/// Minimum trimmed length for resume and JD text.
const MIN_INPUT_CHARS: usize = 10;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Multipart fields of `POST /api/build-resume`. Missing text fields are empty.
#[derive(Debug, Default)]
struct BuildResumeForm {
    resume_text: String,
    jd_text: String,
    api_key: String,
    resume_pdf: Option<Bytes>,
    jd_pdf: Option<Bytes>,
}

#[derive(Debug, Serialize)]
pub struct BuildResumeResponse {
    pub html: String,
    pub success: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Handler
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/build-resume
///
/// Pipeline: read form → require api_key → fold PDF text into the text fields →
/// length checks → generate HTML.
pub async fn handle_build_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<BuildResumeResponse>, AppError> {
    let span = info_span!("build_resume", request_id = %Uuid::new_v4());
    build_resume(state, multipart).instrument(span).await
}

async fn build_resume(
    state: AppState,
    multipart: Multipart,
) -> Result<Json<BuildResumeResponse>, AppError> {
    let form = read_form(multipart).await?;

    if form.api_key.is_empty() {
        return Err(AppError::Unauthorized(
            "Perplexity API Key is required".to_string(),
        ));
    }

    let resume_text = append_pdf_text(form.resume_text, form.resume_pdf, "resume").await?;
    require_min_length(&resume_text, "No valid resume content provided")?;

    let jd_text = append_pdf_text(form.jd_text, form.jd_pdf, "JD").await?;
    require_min_length(&jd_text, "No valid job description provided")?;

    info!("Generating resume with AI...");
    let html = state
        .generator
        .generate(&resume_text, &jd_text, &form.api_key)
        .await?;
    info!("Resume generated successfully ({} chars)", html.len());

    Ok(Json(BuildResumeResponse {
        html,
        success: true,
    }))
}

async fn read_form(mut multipart: Multipart) -> Result<BuildResumeForm, AppError> {
    let mut form = BuildResumeForm::default();

    while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume_text" => form.resume_text = field.text().await.map_err(invalid_form)?,
            "jd_text" => form.jd_text = field.text().await.map_err(invalid_form)?,
            "api_key" => form.api_key = field.text().await.map_err(invalid_form)?,
            "resume_pdf" => form.resume_pdf = non_empty(field.bytes().await.map_err(invalid_form)?),
            "jd_pdf" => form.jd_pdf = non_empty(field.bytes().await.map_err(invalid_form)?),
            _ => {}
        }
    }

    Ok(form)
}

fn invalid_form(e: MultipartError) -> AppError {
    AppError::Validation(format!("Invalid multipart form: {e}"))
}

/// Browsers submit an empty part for an untouched file input.
fn non_empty(data: Bytes) -> Option<Bytes> {
    (!data.is_empty()).then_some(data)
}

/// Appends extracted PDF text (space-separated) when the upload yields any.
async fn append_pdf_text(
    mut text: String,
    pdf: Option<Bytes>,
    label: &str,
) -> Result<String, AppError> {
    if let Some(data) = pdf {
        info!("Extracting text from {label} PDF ({} bytes)...", data.len());
        let pdf_text = extract_text_blocking(data).await?;
        if !pdf_text.is_empty() {
            text.push(' ');
            text.push_str(&pdf_text);
        }
    }
    Ok(text)
}

fn require_min_length(text: &str, message: &str) -> Result<(), AppError> {
    if text.trim().chars().count() < MIN_INPUT_CHARS {
        return Err(AppError::Validation(message.to_string()));
    }
    Ok(())
}
