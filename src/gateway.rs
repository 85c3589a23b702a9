//! Model gateway — the single chokepoint for outbound model calls.
//!
//! Speaks the OpenAI-compatible chat completions wire format, so it works
//! against Groq, OpenRouter, or any self-hosted server exposing
//! `/chat/completions`. One outbound request per invocation, no internal
//! retries; retry policy belongs to the advisory layer.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::GatewayConfig;
use crate::error::AdvisoryError;

/// Per-call sampling parameters.
///
/// Scoring calls use a near-zero temperature and a tiny token budget since
/// they expect a bare number; generative calls run warmer with room to write.
#[derive(Debug, Clone, Copy)]
pub struct CompletionParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionParams {
    pub const fn new(temperature: f32, max_tokens: u32) -> Self {
        CompletionParams {
            temperature,
            max_tokens,
        }
    }
}

impl Default for CompletionParams {
    fn default() -> Self {
        CompletionParams::new(0.7, 1024)
    }
}

/// A chat-completion backend.
///
/// The production implementation is [`GroqGateway`]; tests substitute stubs
/// with canned or failing responses. Implementations must be stateless per
/// call so concurrent advisory invocations can share one instance.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Run one completion: a system message establishing the persona and a
    /// single user message carrying the task prompt.
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: CompletionParams,
    ) -> Result<String, AdvisoryError>;
}

/// HTTP gateway to a hosted model provider.
pub struct GroqGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

impl GroqGateway {
    pub fn new(config: GatewayConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        GroqGateway { client, config }
    }

    /// Gateway configured from the process environment.
    pub fn from_env() -> Self {
        GroqGateway::new(GatewayConfig::from_env())
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

#[async_trait]
impl ChatModel for GroqGateway {
    async fn complete(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        params: CompletionParams,
    ) -> Result<String, AdvisoryError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(AdvisoryError::Configuration)?;

        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user", "content": user_prompt },
            ],
            "temperature": params.temperature,
            "max_tokens": params.max_tokens,
        });

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AdvisoryError::Timeout(self.config.timeout_secs)
                } else {
                    AdvisoryError::upstream(format!("request failed: {e}"))
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(AdvisoryError::Upstream {
                status: Some(status.as_u16()),
                message: truncate(&text, 500),
            });
        }

        let parsed: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| AdvisoryError::upstream(format!("malformed completion envelope: {e}")))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        Ok(content)
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}
