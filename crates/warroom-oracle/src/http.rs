//! HTTP oracle provider (OpenAI-compatible chat completions)
//!
//! Maps transport and status failures onto the oracle error taxonomy so the
//! retry layer can classify them. Accepts responses wrapped in markdown
//! code fences, which several providers emit around JSON output.

use crate::error::OracleError;
use crate::{OracleRequest, ReasoningOracle};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP provider configuration
#[derive(Debug, Clone)]
pub struct HttpOracleConfig {
    /// Chat-completions endpoint URL
    pub api_url: String,
    /// Bearer token
    pub api_key: String,
    /// Model identifier
    pub model: String,
    /// Transport-level timeout (the retry layer applies its own per-call cap)
    pub request_timeout: Duration,
}

impl HttpOracleConfig {
    /// Read configuration from `LLM_API_URL`, `LLM_API_KEY`, `LLM_MODEL`
    ///
    /// # Errors
    /// `OracleError::InvalidRequest` if the API key is missing.
    pub fn from_env() -> Result<Self, OracleError> {
        let api_key = std::env::var("LLM_API_KEY")
            .map_err(|_| OracleError::InvalidRequest("LLM_API_KEY not set".to_string()))?;
        Ok(Self {
            api_url: std::env::var("LLM_API_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
            api_key,
            model: std::env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            request_timeout: Duration::from_secs(90),
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// OpenAI-compatible reasoning-oracle provider
#[derive(Debug)]
pub struct HttpOracle {
    client: reqwest::Client,
    config: HttpOracleConfig,
}

impl HttpOracle {
    /// Create provider from configuration
    ///
    /// # Errors
    /// `OracleError::InvalidRequest` if the HTTP client cannot be built.
    pub fn new(config: HttpOracleConfig) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| OracleError::InvalidRequest(format!("http client: {e}")))?;
        Ok(Self { client, config })
    }

    fn build_prompt(request: &OracleRequest) -> String {
        format!(
            "{evidence}\n\nRespond with JSON matching this structure, and nothing else:\n{schema}",
            evidence = request.evidence,
            schema = request.response_schema,
        )
    }

    fn classify_status(status: reqwest::StatusCode, body: String) -> OracleError {
        if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            OracleError::Unreachable(format!("{status}: {body}"))
        } else {
            OracleError::InvalidRequest(format!("{status}: {body}"))
        }
    }
}

/// Strip markdown code fences some providers wrap around JSON output
fn strip_fences(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

#[async_trait::async_trait]
impl ReasoningOracle for HttpOracle {
    async fn invoke(&self, request: &OracleRequest) -> Result<serde_json::Value, OracleError> {
        let prompt = Self::build_prompt(request);
        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.role,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: 0.2,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout {
                        duration_secs: self.config.request_timeout.as_secs(),
                    }
                } else {
                    OracleError::Unreachable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify_status(status, body));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| OracleError::SchemaViolation(format!("completion envelope: {e}")))?;

        let content = completion
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .ok_or_else(|| OracleError::SchemaViolation("empty choices".to_string()))?;

        let stripped = strip_fences(content);
        if stripped.is_empty() {
            return Err(OracleError::SchemaViolation("empty response".to_string()));
        }

        serde_json::from_str(stripped)
            .map_err(|e| OracleError::SchemaViolation(format!("response is not JSON: {e}")))
    }
}
