//! Local sentence embeddings with fastembed.
//!
//! Models are downloaded into the cache directory on first use and run on the
//! CPU through ONNX Runtime, so no embedding API is needed.

use super::Embedder;
use crate::error::{MentorError, Result};
use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Default local model, a sentence-transformer with 384-dimensional output.
pub const DEFAULT_LOCAL_MODEL: &str = "all-MiniLM-L6-v2";

/// Map a configured model name to a fastembed model and its output size.
///
/// Accepts bare names and hub-style names (`sentence-transformers/...`,
/// `BAAI/...`), case-insensitively.
fn resolve_model(name: &str) -> Result<(EmbeddingModel, usize)> {
    let lower = name.trim().to_ascii_lowercase();
    let key = lower.rsplit('/').next().unwrap_or(&lower);

    match key {
        "all-minilm-l6-v2" => Ok((EmbeddingModel::AllMiniLML6V2, 384)),
        "all-minilm-l12-v2" => Ok((EmbeddingModel::AllMiniLML12V2, 384)),
        "bge-small-en-v1.5" => Ok((EmbeddingModel::BGESmallENV15, 384)),
        "bge-base-en-v1.5" => Ok((EmbeddingModel::BGEBaseENV15, 768)),
        _ => Err(MentorError::Config(format!(
            "Unknown local embedding model '{}'. Supported: all-MiniLM-L6-v2, \
             all-MiniLM-L12-v2, bge-small-en-v1.5, bge-base-en-v1.5",
            name
        ))),
    }
}

/// Embedder backed by a local fastembed model.
pub struct LocalEmbedder {
    model: Arc<TextEmbedding>,
    name: String,
    dimensions: usize,
}

impl LocalEmbedder {
    /// Load a model, downloading it into `cache_dir` if it is not cached yet.
    pub fn new(model_name: &str, cache_dir: PathBuf) -> Result<Self> {
        let (model, dimensions) = resolve_model(model_name)?;

        info!("Loading embedding model {} from {}", model_name, cache_dir.display());
        let options = InitOptions::new(model)
            .with_cache_dir(cache_dir)
            .with_show_download_progress(false);

        let model = TextEmbedding::try_new(options).map_err(|e| {
            MentorError::Embedding(format!("Failed to load model {}: {}", model_name, e))
        })?;

        Ok(Self {
            model: Arc::new(model),
            name: model_name.to_string(),
            dimensions,
        })
    }
}

#[async_trait]
impl Embedder for LocalEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| MentorError::Embedding("No embedding returned".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Embedding {} texts locally", texts.len());

        // Inference is CPU-bound
        let model = self.model.clone();
        let texts = texts.to_vec();
        tokio::task::spawn_blocking(move || model.embed(texts, None))
            .await
            .map_err(|e| MentorError::Embedding(format!("Embedding task failed: {}", e)))?
            .map_err(|e| MentorError::Embedding(format!("Failed to generate embeddings: {}", e)))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}
