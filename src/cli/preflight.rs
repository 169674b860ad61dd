//! Pre-flight checks before expensive operations.
//!
//! Validates that API keys are available before starting operations that
//! would otherwise fail on the first provider call.

use crate::config::{EmbeddingProvider, Settings};
use crate::error::{MentorError, Result};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Tutoring and feedback need the chat provider and the embedder.
    Answer,
    /// Knowledge base search and MCP tools need only the embedder.
    Search,
    /// Seeding embeds every row.
    Seed,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Answer => {
            check_api_key(settings.model.provider.api_key_env())?;
            check_embedding_key(settings)?;
        }
        Operation::Search | Operation::Seed => {
            check_embedding_key(settings)?;
        }
    }
    Ok(())
}

fn check_embedding_key(settings: &Settings) -> Result<()> {
    match settings.embedding.provider {
        EmbeddingProvider::OpenAi => check_api_key("OPENAI_API_KEY"),
        EmbeddingProvider::Local => Ok(()),
    }
}

/// Check that an API key environment variable is set and non-empty.
fn check_api_key(var: &str) -> Result<()> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(()),
        Ok(_) => Err(MentorError::Config(format!(
            "{} is empty. Set it with: export {}='...'",
            var, var
        ))),
        Err(_) => Err(MentorError::Config(format!(
            "{} not set. Set it with: export {}='...'",
            var, var
        ))),
    }
}
