//! Resume Generation — turns resume text + JD text into a finished HTML document.
//!
//! Flow: compose prompts → one completions call → pattern-based extraction →
//!       doctype normalization, or the plain-shell fallback when nothing matched.

use thiserror::Error;
use tracing::{info, warn};

use crate::generation::html_extract::{
    default_patterns, find_document, normalize_doctype, HtmlPattern,
};
use crate::generation::prompts::{
    FALLBACK_DOCUMENT_TEMPLATE, LAYOUT_CSS, RESUME_SYSTEM_TEMPLATE, RESUME_USER_TEMPLATE,
};
use crate::llm_client::{LlmClient, LlmError};

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("AI Generation Failed: API key is required")]
    MissingApiKey,

    #[error("AI Generation Failed: {0}")]
    Llm(#[from] LlmError),
}

/// Stateless generator; holds only the shared HTTP client.
#[derive(Clone)]
pub struct ResumeGenerator {
    llm: LlmClient,
}

impl ResumeGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    /// Generates a tailored resume document. The returned HTML always starts
    /// with `<!DOCTYPE html>`; unparseable model output is wrapped, not rejected.
    pub async fn generate(
        &self,
        resume_text: &str,
        jd_text: &str,
        api_key: &str,
    ) -> Result<String, GenerationError> {
        if api_key.is_empty() {
            return Err(GenerationError::MissingApiKey);
        }

        let (system, prompt) = build_prompts(resume_text, jd_text);
        let raw = self.llm.complete(api_key, &system, &prompt).await?;
        info!("Received {} chars of model output", raw.len());

        Ok(html_from_model_output(&raw, default_patterns()))
    }
}

/// Builds the (system, user) prompt pair.
///
/// Candidate text is never rescanned for placeholders: the labelled block is
/// formatted directly and substituted last.
pub fn build_prompts(resume_text: &str, jd_text: &str) -> (String, String) {
    let merged = format!("RESUME CONTENT:\n{resume_text}\n\nJOB DESCRIPTION:\n{jd_text}");

    let system = RESUME_SYSTEM_TEMPLATE.replace("{layout_css}", LAYOUT_CSS);
    let user = RESUME_USER_TEMPLATE
        .replace("{layout_css}", LAYOUT_CSS)
        .replace("{merged_content}", &merged);

    (system, user)
}

/// Extracts and normalizes a document, falling back to wrapping the raw
/// output verbatim when no pattern matches.
pub fn html_from_model_output<P: HtmlPattern>(raw: &str, patterns: &[P]) -> String {
    match find_document(raw, patterns) {
        Some(found) => {
            let html = normalize_doctype(&found.html);
            info!(
                "Extracted HTML via pattern '{}': {} chars",
                found.pattern,
                html.len()
            );
            html
        }
        None => {
            warn!("No HTML found in model output, wrapping content");
            fallback_document(raw)
        }
    }
}

fn fallback_document(content: &str) -> String {
    FALLBACK_DOCUMENT_TEMPLATE.replace("{content}", content)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use httpmock::MockServer;
    use serde_json::json;

    use super::*;

    fn generator(server: &MockServer) -> ResumeGenerator {
        ResumeGenerator::new(LlmClient::new(server.base_url(), Duration::from_secs(5)).unwrap())
    }

    fn completion_body(content: &str) -> String {
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
            .to_string()
    }

    #[test]
    fn test_prompts_carry_both_inputs_under_labels() {
        let (system, user) = build_prompts("Jane Doe resume", "Python role");
        assert!(user.contains("RESUME CONTENT:\nJane Doe resume\n\nJOB DESCRIPTION:\nPython role"));
        assert!(!system.contains("Jane Doe"));
        assert!(system.contains("do not invent facts"));
    }

    #[test]
    fn test_prompts_embed_layout_css_verbatim() {
        let (system, user) = build_prompts("r", "j");
        assert!(system.contains(LAYOUT_CSS));
        assert!(user.contains(LAYOUT_CSS));
        assert!(!system.contains("{layout_css}"));
        assert!(!user.contains("{merged_content}"));
    }

    #[test]
    fn test_candidate_text_is_not_treated_as_placeholder() {
        let (_, user) = build_prompts("literal {layout_css} in resume", "jd");
        assert!(user.contains("literal {layout_css} in resume"));
    }

    #[test]
    fn test_resume_mentioning_jd_placeholder_is_kept_verbatim() {
        let (_, user) = build_prompts("Skills: templating {jd_text} syntax", "Python role");
        assert!(user.contains("RESUME CONTENT:\nSkills: templating {jd_text} syntax\n\n"));
        assert!(user.contains("JOB DESCRIPTION:\nPython role"));
    }

    #[test]
    fn test_jd_mentioning_resume_placeholder_is_kept_verbatim() {
        let (_, user) = build_prompts("Jane Doe", "Fill {resume_text} and {merged_content}");
        assert!(user.contains("JOB DESCRIPTION:\nFill {resume_text} and {merged_content}"));
        assert_eq!(user.matches("Jane Doe").count(), 1);
    }

    #[test]
    fn test_fallback_wraps_raw_text_verbatim() {
        let raw = "I'm sorry, here are some notes: <b>Python</b> & APIs";
        let html = html_from_model_output(raw, default_patterns());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(raw));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_fenced_document_without_doctype_gets_normalized() {
        let raw = "```html\n<html><body><h1>Jane</h1></body></html>\n```";
        let html = html_from_model_output(raw, default_patterns());
        assert_eq!(
            html,
            "<!DOCTYPE html>\n<html><body><h1>Jane</h1></body></html>"
        );
    }

    #[tokio::test]
    async fn test_empty_api_key_rejected_before_network_call() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("POST");
                then.status(200).body(completion_body("unused"));
            })
            .await;

        let err = generator(&server)
            .generate("resume text", "jd text", "")
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::MissingApiKey));
        mock.assert_calls_async(0).await;
    }

    #[tokio::test]
    async fn test_generates_structured_resume() {
        let document = "<!DOCTYPE html>\n<html><head><style>body{}</style></head><body>\
            <h1>Jane Doe</h1><div class=\"contact\">jane@example.com</div>\
            <h2>Skills</h2><p><b>Languages:</b> Python</p>\
            <h2>Experience</h2><div class=\"job-title\">Backend Engineer</div>\
            <ul><li>Designed REST APIs</li></ul></body></html>";
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("POST")
                    .path("/chat/completions")
                    .header("authorization", "Bearer pplx-test")
                    .body_includes("Jane Doe, 5 years Python backend experience")
                    .body_includes("Seeking Python engineer with API design skills");
                then.status(200)
                    .header("content-type", "application/json")
                    .body(completion_body(&format!("Here you go:\n{document}\nGood luck!")));
            })
            .await;

        let html = generator(&server)
            .generate(
                "Jane Doe, 5 years Python backend experience",
                "Seeking Python engineer with API design skills",
                "pplx-test",
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(html, document);
        assert_eq!(html.matches("<h1").count(), 1);
        assert!(html.contains("<h2"));
    }

    #[tokio::test]
    async fn test_upstream_error_body_is_surfaced() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("POST").path("/chat/completions");
                then.status(429).body("rate limit exceeded");
            })
            .await;

        let err = generator(&server)
            .generate("resume", "jd", "key")
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "AI Generation Failed: Perplexity API Error: rate limit exceeded"
        );
    }
}
