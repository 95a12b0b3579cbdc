/// LLM Client — the single point of entry for all chat-completion calls.
///
/// No other module may call the completions API directly.
/// The API key is supplied by the caller on every request; nothing is cached.
///
/// Model: sonar (hardcoded — do not make configurable to prevent drift)
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};

/// The model used for all completion calls.
pub const MODEL: &str = "sonar";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status; `body` is the upstream response text, verbatim.
    #[error("Perplexity API Error: {body}")]
    Api { status: u16, body: String },

    #[error("parsing failed: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("parsing failed: response contained no choices")]
    EmptyContent,
}

impl LlmError {
    /// Upstream HTTP status, when the API answered with one.
    pub fn status(&self) -> Option<u16> {
        match self {
            LlmError::Api { status, .. } => Some(*status),
            LlmError::Http(e) => e.status().map(|s| s.as_u16()),
            LlmError::Parse(_) | LlmError::EmptyContent => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: String,
}

impl ChatResponse {
    /// Content of the first choice, if the API returned any.
    pub fn text(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

/// Thin wrapper over the chat-completions endpoint.
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    base_url: String,
}

impl LlmClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into(),
        })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Sends one system + one user message and returns the first choice's
    /// content. A single attempt is made; failures are returned as-is.
    pub async fn complete(
        &self,
        api_key: &str,
        system: &str,
        prompt: &str,
    ) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };

        info!("Sending request to completions API (model: {MODEL})");
        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .header("content-type", "application/json")
            .header("accept", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = LlmError::Api {
                status: status.as_u16(),
                body,
            };
            error!(status = err.status(), "Completions API error: {err}");
            return Err(err);
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body)?;
        let content = parsed.text().ok_or(LlmError::EmptyContent)?.to_string();

        debug!("Received {} chars from completions API", content.len());
        Ok(content)
    }
}
