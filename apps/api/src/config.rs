use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::render::EngineKind;

const DEFAULT_LLM_API_URL: &str = "https://api.perplexity.ai";

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Base URL of the chat-completions API (without `/chat/completions`).
    pub llm_api_url: String,
    pub llm_timeout: Duration,
    /// Rendering engines in trial order.
    pub pdf_engines: Vec<EngineKind>,
    pub weasyprint_bin: String,
    pub wkhtmltopdf_bin: String,
    pub render_timeout: Duration,
    /// Rendered PDFs smaller than this are treated as broken output.
    pub pdf_min_bytes: usize,
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 5000,
            rust_log: "info".to_string(),
            llm_api_url: DEFAULT_LLM_API_URL.to_string(),
            llm_timeout: Duration::from_secs(120),
            pdf_engines: vec![EngineKind::WeasyPrint, EngineKind::Wkhtmltopdf],
            weasyprint_bin: "weasyprint".to_string(),
            wkhtmltopdf_bin: "wkhtmltopdf".to_string(),
            render_timeout: Duration::from_secs(60),
            pdf_min_bytes: 1000,
            max_upload_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();

        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or(defaults.rust_log),
            llm_api_url: std::env::var("LLM_API_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.llm_api_url),
            llm_timeout: Duration::from_secs(parse_env(
                "LLM_TIMEOUT_SECS",
                defaults.llm_timeout.as_secs(),
            )?),
            pdf_engines: match std::env::var("PDF_ENGINES") {
                Ok(raw) => parse_engine_list(&raw)?,
                Err(_) => defaults.pdf_engines,
            },
            weasyprint_bin: std::env::var("WEASYPRINT_BIN").unwrap_or(defaults.weasyprint_bin),
            wkhtmltopdf_bin: std::env::var("WKHTMLTOPDF_BIN")
                .unwrap_or(defaults.wkhtmltopdf_bin),
            render_timeout: Duration::from_secs(parse_env(
                "RENDER_TIMEOUT_SECS",
                defaults.render_timeout.as_secs(),
            )?),
            pdf_min_bytes: parse_env("PDF_MIN_BYTES", defaults.pdf_min_bytes)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

/// Parses a comma-separated engine list such as `weasyprint,wkhtmltopdf`.
/// Order is preserved; duplicates are dropped. An empty list disables
/// server-side rendering entirely.
fn parse_engine_list(raw: &str) -> Result<Vec<EngineKind>> {
    let mut engines = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let Some(kind) = EngineKind::from_name(name) else {
            bail!("PDF_ENGINES contains unknown engine '{name}'");
        };
        if !engines.contains(&kind) {
            engines.push(kind);
        }
    }
    Ok(engines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_list_preserves_order() {
        let engines = parse_engine_list("wkhtmltopdf, weasyprint").unwrap();
        assert_eq!(engines, vec![EngineKind::Wkhtmltopdf, EngineKind::WeasyPrint]);
    }

    #[test]
    fn test_engine_list_drops_duplicates_and_blanks() {
        let engines = parse_engine_list("weasyprint,,weasyprint").unwrap();
        assert_eq!(engines, vec![EngineKind::WeasyPrint]);
    }

    #[test]
    fn test_engine_list_empty_disables_rendering() {
        assert!(parse_engine_list("").unwrap().is_empty());
    }

    #[test]
    fn test_engine_list_rejects_unknown_engine() {
        let err = parse_engine_list("weasyprint,prince").unwrap_err();
        assert!(err.to_string().contains("prince"));
    }

    #[test]
    fn test_defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.pdf_min_bytes, 1000);
        assert_eq!(config.llm_api_url, "https://api.perplexity.ai");
        assert_eq!(config.pdf_engines.len(), 2);
    }
}
