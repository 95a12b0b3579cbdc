use std::sync::Arc;

use crate::config::Config;
use crate::generation::ResumeGenerator;
use crate::render::PdfRenderer;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is immutable after startup; requests never share mutable state.
#[derive(Clone)]
pub struct AppState {
    pub generator: ResumeGenerator,
    /// Engine chain with availability resolved once at startup.
    pub renderer: Arc<PdfRenderer>,
    pub config: Config,
}
