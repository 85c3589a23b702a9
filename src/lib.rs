//! Acumen — AI-assisted CRM intelligence.
//!
//! The crate has three layers: the entity [`store`](crate::store) holding
//! customer and task records, the model [`gateway`](crate::gateway) wrapping
//! one chat-completion call to a hosted LLM, and the
//! [`advisory`](crate::advisory) functions that turn entity data into typed,
//! bounded recommendations — lead scores, churn risk, email drafts, revenue
//! forecasts, task priorities, dashboard insights, and meeting-notes
//! extraction. Every advisory function degrades to a deterministic fallback
//! when the model is unavailable or returns something it shouldn't.

pub mod advisory;
pub mod config;
pub mod error;
pub mod gateway;
pub mod store;
pub mod types;

pub use advisory::{Advised, AdvisoryService, Origin};
pub use config::GatewayConfig;
pub use error::AdvisoryError;
pub use gateway::{ChatModel, CompletionParams, GroqGateway};
pub use store::CrmStore;
