//! Embedding generation for semantic search and retrieval.

#[cfg(test)]
mod hashing;
mod local;
mod openai;

#[cfg(test)]
pub use hashing::HashingEmbedder;
pub use local::{LocalEmbedder, DEFAULT_LOCAL_MODEL};
pub use openai::OpenAIEmbedder;

use crate::config::{EmbeddingProvider, Settings};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;

    /// Identifier recorded alongside a persisted index.
    fn model_name(&self) -> &str;
}

/// Build the embedder selected in the settings.
///
/// The local provider loads its model here, downloading it on first use.
pub fn create_embedder(settings: &Settings) -> Result<Arc<dyn Embedder>> {
    let embedding = &settings.embedding;
    Ok(match embedding.provider {
        EmbeddingProvider::Local => Arc::new(LocalEmbedder::new(
            &embedding.model,
            settings.model_cache_dir(),
        )?),
        EmbeddingProvider::OpenAi => Arc::new(OpenAIEmbedder::with_config(
            &embedding.model,
            embedding.dimensions as usize,
            Duration::from_secs(settings.model.timeout_seconds),
        )?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_openai_embedder_from_settings() {
        let mut settings = Settings::default();
        settings.embedding.provider = EmbeddingProvider::OpenAi;
        settings.embedding.model = "text-embedding-3-large".to_string();
        settings.embedding.dimensions = 1024;
        settings.model.timeout_seconds = 5;

        let embedder = create_embedder(&settings).unwrap();
        assert_eq!(embedder.model_name(), "text-embedding-3-large");
        assert_eq!(embedder.dimensions(), 1024);
    }

    #[test]
    fn test_unknown_local_model_is_config_error() {
        let mut settings = Settings::default();
        settings.embedding.model = "not-a-model".to_string();

        assert!(matches!(
            create_embedder(&settings),
            Err(crate::error::MentorError::Config(_))
        ));
    }
}
