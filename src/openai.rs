//! OpenAI-compatible client construction for the supported chat providers.

use crate::config::ModelProvider;
use crate::error::{MentorError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for model API requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Groq serves an OpenAI-compatible API under this base URL.
const GROQ_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Create a client for the given provider with a custom timeout.
///
/// OpenAI reads `OPENAI_API_KEY` from the environment; Groq needs `GROQ_API_KEY`.
pub fn create_client_with_timeout(
    provider: &ModelProvider,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| MentorError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let config = match provider {
        ModelProvider::OpenAi => OpenAIConfig::default(),
        ModelProvider::Groq => OpenAIConfig::new()
            .with_api_base(GROQ_API_BASE)
            .with_api_key(std::env::var(provider.api_key_env()).unwrap_or_default()),
    };

    Ok(Client::with_config(config).with_http_client(http_client))
}
