//! Gateway configuration.
//!
//! The API key is read from the process environment at startup. A missing
//! key is a recoverable condition — the gateway reports it as a
//! configuration error and every advisory function degrades to its
//! deterministic fallback.

use std::time::Duration;

use serde::Serialize;

/// Environment variable holding the model provider API key.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Default OpenAI-compatible endpoint base (includes the version segment).
const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default model identifier sent with every completion request.
const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

/// Upper bound on a single completion round trip.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Long-lived gateway configuration.
///
/// The key is intentionally excluded from serialization so the config can be
/// logged or exposed for diagnostics without leaking the credential.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    #[serde(skip)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GatewayConfig {
    /// Read configuration from the process environment.
    ///
    /// `GROQ_API_KEY` supplies the credential; `ACUMEN_BASE_URL` and
    /// `ACUMEN_MODEL` override the endpoint and model for self-hosted
    /// OpenAI-compatible servers.
    pub fn from_env() -> Self {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty());
        let base_url =
            std::env::var("ACUMEN_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("ACUMEN_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        GatewayConfig {
            api_key,
            base_url,
            model,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Config with an explicit key, for tests and embedding callers.
    pub fn with_key(api_key: &str) -> Self {
        GatewayConfig {
            api_key: Some(api_key.to_string()),
            ..Default::default()
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
