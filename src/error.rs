//! Error types for the advisory layer.
//!
//! Errors are classified by recoverability:
//! - Retryable: network issues, timeouts, rate limits
//! - NonRetryable: missing credential, malformed model output
//!
//! None of these surface to callers of the advisory functions — every
//! variant is caught at the advisory boundary and converted into that
//! function's documented fallback result. The taxonomy exists so the
//! fallback path can log a precise root cause and decide whether a
//! bounded retry is worth attempting.

use thiserror::Error;

/// Errors produced by the model gateway and response handling.
#[derive(Debug, Error)]
pub enum AdvisoryError {
    /// No API key is configured. Permanent until reconfigured.
    #[error("Model API key is not configured")]
    Configuration,

    /// The provider returned a non-2xx status or the transport failed.
    #[error("Model API error: {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    /// The request exceeded the gateway's time budget.
    #[error("Model call timed out after {0} seconds")]
    Timeout(u64),

    /// The response was not valid JSON after code-fence stripping.
    #[error("Failed to parse model response: {0}")]
    Parse(String),

    /// The JSON decoded but no expected field survived validation.
    #[error("Model response failed validation: {0}")]
    Validation(String),
}

impl AdvisoryError {
    /// Returns true if a bounded retry may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AdvisoryError::Upstream { .. } | AdvisoryError::Timeout(_)
        )
    }

    /// Shorthand for an upstream error with no HTTP status (transport failure).
    pub fn upstream(message: impl Into<String>) -> Self {
        AdvisoryError::Upstream {
            status: None,
            message: message.into(),
        }
    }
}
