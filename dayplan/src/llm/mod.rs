//! Completion backend boundary
//!
//! Thin, replaceable wrapper around a generative text-completion service.
//! The rest of the crate only sees the [`CompletionClient`] trait; tests
//! substitute a scripted mock.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod openai;

pub use client::{CompletionClient, CompletionRequest};
pub use error::CompletionError;
pub use openai::OpenAiClient;

use crate::config::LlmConfig;

/// Create a completion client for the provider named in config
///
/// Currently only the "openai" provider is supported.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn CompletionClient>, CompletionError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiClient::from_config(config)?)),
        other => Err(CompletionError::Configuration(format!(
            "unknown completion provider: '{}' (supported: openai)",
            other
        ))),
    }
}
