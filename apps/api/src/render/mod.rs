//! PDF Rendering — ordered, pluggable engine chain.
//!
//! Engines are tried in configured order until one produces output. Which
//! engines are usable is decided once at startup and handed to
//! [`PdfRenderer::new`]; nothing is re-probed per request.
//!
//! Total failure is not an error: the caller gets the (normalized) HTML back
//! so the client can fall back to printing from the browser.

pub mod engines;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::generation::normalize_doctype;

pub use engines::{probe_available, ProcessEngine};

// ────────────────────────────────────────────────────────────────────────────
// Engine identity and errors
// ────────────────────────────────────────────────────────────────────────────

/// The rendering engines this service knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// CSS-capable renderer; tried first by default.
    WeasyPrint,
    Wkhtmltopdf,
}

impl EngineKind {
    pub const ALL: [EngineKind; 2] = [EngineKind::WeasyPrint, EngineKind::Wkhtmltopdf];

    pub fn id(self) -> &'static str {
        match self {
            EngineKind::WeasyPrint => "weasyprint",
            EngineKind::Wkhtmltopdf => "wkhtmltopdf",
        }
    }

    /// Key reported under `pdf_engines` by the health endpoint. wkhtmltopdf
    /// keeps its historical `pdfkit` key so existing clients see the same shape.
    pub fn health_key(self) -> &'static str {
        match self {
            EngineKind::WeasyPrint => "weasyprint",
            EngineKind::Wkhtmltopdf => "pdfkit",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.id().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{engine} binary '{bin}' not found")]
    NotFound { engine: &'static str, bin: String },

    #[error("{engine} I/O error: {source}")]
    Io {
        engine: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{engine} exited with code {code:?}: {stderr}")]
    Failed {
        engine: &'static str,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{engine} timed out after {secs}s")]
    Timeout { engine: &'static str, secs: u64 },

    #[error("no rendering engine configured")]
    NotConfigured,
}

// ────────────────────────────────────────────────────────────────────────────
// Strategy interface
// ────────────────────────────────────────────────────────────────────────────

/// One HTML-to-PDF conversion method. Implement this to add an engine
/// without touching the renderer or the handlers.
#[async_trait]
pub trait PdfEngine: Send + Sync {
    fn id(&self) -> &'static str;

    async fn render(&self, html: &str) -> Result<Vec<u8>, EngineError>;
}

/// An engine plus its startup availability flag.
#[derive(Clone)]
pub struct RegisteredEngine {
    pub engine: Arc<dyn PdfEngine>,
    pub available: bool,
}

impl RegisteredEngine {
    pub fn new(engine: Arc<dyn PdfEngine>, available: bool) -> Self {
        Self { engine, available }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Outcomes
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub engine: &'static str,
}

#[derive(Debug, Clone)]
pub enum RenderOutcome {
    Rendered(RenderedPdf),
    /// No engine produced output. Carries the normalized HTML.
    Unavailable { html: String },
    /// An engine produced output below the plausibility threshold.
    TooSmall { html: String, size: usize },
}

// ────────────────────────────────────────────────────────────────────────────
// Renderer
// ────────────────────────────────────────────────────────────────────────────

pub struct PdfRenderer {
    engines: Vec<RegisteredEngine>,
    min_pdf_bytes: usize,
}

impl PdfRenderer {
    pub fn new(engines: Vec<RegisteredEngine>, min_pdf_bytes: usize) -> Self {
        Self {
            engines,
            min_pdf_bytes,
        }
    }

    /// Whether the engine with this id is configured and was available at startup.
    pub fn is_available(&self, engine_id: &str) -> bool {
        self.engines
            .iter()
            .any(|e| e.available && e.engine.id() == engine_id)
    }

    /// Converts `html` to PDF with the first available engine that succeeds.
    pub async fn render(&self, html: &str) -> RenderOutcome {
        let html = normalize_doctype(html);
        info!("PDF conversion - HTML length: {}", html.len());

        let mut produced: Option<RenderedPdf> = None;
        for registered in self.engines.iter().filter(|e| e.available) {
            let engine = registered.engine.as_ref();
            info!("Trying {}...", engine.id());
            debug!("HTML preview (first 500 chars):\n{}", head(&html, 500));
            debug!("HTML preview (last 300 chars):\n{}", tail(&html, 300));

            match engine.render(&html).await {
                Ok(bytes) => {
                    info!("{} succeeded: {} bytes", engine.id(), bytes.len());
                    produced = Some(RenderedPdf {
                        bytes,
                        engine: engine.id(),
                    });
                    break;
                }
                Err(e) => {
                    error!("{} failed: {e}", engine.id());
                    debug!("HTML that failed (first 1000 chars):\n{}", head(&html, 1000));
                }
            }
        }

        let Some(pdf) = produced else {
            error!("All PDF conversion methods failed; returning HTML for client-side conversion");
            return RenderOutcome::Unavailable { html };
        };

        if pdf.bytes.len() < self.min_pdf_bytes {
            warn!(
                "PDF too small: {} bytes from {} (minimum {})",
                pdf.bytes.len(),
                pdf.engine,
                self.min_pdf_bytes
            );
            return RenderOutcome::TooSmall {
                size: pdf.bytes.len(),
                html,
            };
        }

        info!("Rendered PDF ({}): {} bytes", pdf.engine, pdf.bytes.len());
        RenderOutcome::Rendered(pdf)
    }

    /// Renders through the first configured engine only, ignoring its
    /// availability flag and the size threshold. Used for self-tests.
    pub async fn render_with_primary(&self, html: &str) -> Result<RenderedPdf, EngineError> {
        let primary = self
            .engines
            .first()
            .ok_or(EngineError::NotConfigured)?
            .engine
            .as_ref();
        let bytes = primary.render(&normalize_doctype(html)).await?;
        info!("Test PDF generated by {}: {} bytes", primary.id(), bytes.len());
        Ok(RenderedPdf {
            bytes,
            engine: primary.id(),
        })
    }
}

fn head(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

fn tail(s: &str, n: usize) -> String {
    let len = s.chars().count();
    s.chars().skip(len.saturating_sub(n)).collect()
}
