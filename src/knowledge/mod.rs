//! The shared knowledge base: a persisted vector index of question/answer pairs.
//!
//! [`KnowledgeBase`] owns the index for the life of the process. Writers take
//! the write half of a readers-writer lock for the whole append + persist
//! sequence, so two updates never interleave and a reader never observes a
//! half-applied update. Searches take the read half.

mod seed;

pub use seed::seed_texts;

use crate::embedding::Embedder;
use crate::error::{MentorError, Result};
use crate::vector_store::{knowledge_unit, write_snapshot, Document, SearchResult, VectorIndex};
use futures::stream::{self, StreamExt, TryStreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Texts embedded per request while building a new index.
const SEED_BATCH_SIZE: usize = 64;
/// Embedding requests in flight while building a new index.
const SEED_CONCURRENCY: usize = 4;

struct IndexState {
    index: VectorIndex,
    /// In-memory index holds appends that the last persist failed to write.
    dirty: bool,
    closed: bool,
}

/// Knowledge base service. Construct once at startup and share via `Arc`.
pub struct KnowledgeBase {
    dir: PathBuf,
    embedder: Arc<dyn Embedder>,
    state: RwLock<IndexState>,
}

impl KnowledgeBase {
    /// Open an existing index. A missing directory is an error the caller
    /// should treat as fatal.
    pub fn open(dir: impl Into<PathBuf>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(MentorError::IndexNotFound(dir));
        }

        let index = VectorIndex::load(&dir)?;
        if let Some(dims) = index.dimensions() {
            if dims != embedder.dimensions() {
                return Err(MentorError::Config(format!(
                    "Index at {} was built with {}-dimensional embeddings ({}), \
                     but the configured embedder produces {}",
                    dir.display(),
                    dims,
                    index.embedding_model(),
                    embedder.dimensions()
                )));
            }
        }

        info!("Opened knowledge base at {} ({} documents)", dir.display(), index.len());
        Ok(Self::from_index(dir, embedder, index))
    }

    /// Build a new index from seed texts and persist it.
    #[instrument(skip(dir, embedder, texts), fields(dir = %dir.display(), count = texts.len()))]
    pub async fn create(
        dir: PathBuf,
        embedder: Arc<dyn Embedder>,
        texts: Vec<String>,
        force: bool,
    ) -> Result<Self> {
        if dir.exists() && !force {
            return Err(MentorError::IndexExists(dir));
        }

        let batches: Vec<Vec<String>> = texts
            .chunks(SEED_BATCH_SIZE)
            .map(|chunk| chunk.to_vec())
            .collect();

        let embedded: Vec<(Vec<String>, Vec<Vec<f32>>)> = stream::iter(batches)
            .map(|batch| {
                let embedder = embedder.clone();
                async move {
                    let embeddings = embedder.embed_batch(&batch).await?;
                    Ok::<_, MentorError>((batch, embeddings))
                }
            })
            .buffered(SEED_CONCURRENCY)
            .try_collect()
            .await?;

        let mut index = VectorIndex::new(embedder.model_name());
        for (batch, embeddings) in embedded {
            if batch.len() != embeddings.len() {
                return Err(MentorError::Embedding(format!(
                    "Expected {} embeddings, got {}",
                    batch.len(),
                    embeddings.len()
                )));
            }
            for (text, embedding) in batch.into_iter().zip(embeddings) {
                index.add(Document::new(text, embedding))?;
            }
        }

        persist(&dir, &index).await?;
        info!("Created knowledge base at {} ({} documents)", dir.display(), index.len());
        Ok(Self::from_index(dir, embedder, index))
    }

    fn from_index(dir: PathBuf, embedder: Arc<dyn Embedder>, index: VectorIndex) -> Self {
        Self {
            dir,
            embedder,
            state: RwLock::new(IndexState {
                index,
                dirty: false,
                closed: false,
            }),
        }
    }

    /// Append a question/answer pair and persist the whole index.
    ///
    /// Returns `false` for blank input or any failure; failures are logged.
    /// If the append succeeds but persisting fails, the pair stays in memory
    /// and is written by the next successful persist.
    pub async fn add_pair(&self, question: &str, answer: &str) -> bool {
        if question.trim().is_empty() || answer.trim().is_empty() {
            debug!("Refusing to store a pair with an empty question or answer");
            return false;
        }

        match self.append(knowledge_unit(question, answer)).await {
            Ok(total) => {
                debug!("Stored pair, knowledge base now has {} documents", total);
                true
            }
            Err(e) => {
                warn!("Failed to add pair to knowledge base: {}", e);
                false
            }
        }
    }

    async fn append(&self, text: String) -> Result<usize> {
        let embedding = self.embedder.embed(&text).await?;

        let mut state = self.state.write().await;
        if state.closed {
            return Err(MentorError::VectorStore("Knowledge base is shut down".to_string()));
        }

        state.index.add(Document::new(text, embedding))?;
        if let Err(e) = persist(&self.dir, &state.index).await {
            state.dirty = true;
            return Err(e);
        }
        state.dirty = false;
        Ok(state.index.len())
    }

    /// Find the `limit` most similar knowledge units for a query.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let embedding = self.embedder.embed(query).await?;
        let state = self.state.read().await;
        Ok(state.index.search(&embedding, limit))
    }

    /// Number of documents currently held in memory.
    pub async fn len(&self) -> usize {
        self.state.read().await.index.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Directory the index is persisted to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stop accepting writes, persisting any appends a failed save left behind.
    pub async fn shutdown(&self) -> Result<()> {
        let mut state = self.state.write().await;
        if state.closed {
            return Ok(());
        }
        state.closed = true;

        if state.dirty {
            persist(&self.dir, &state.index).await?;
            state.dirty = false;
        }
        info!("Knowledge base closed ({} documents)", state.index.len());
        Ok(())
    }
}

/// Snapshot the index and write it from the blocking pool. Callers holding
/// the write lock keep it until the file is in place.
async fn persist(dir: &Path, index: &VectorIndex) -> Result<()> {
    let bytes = index.encode()?;
    let dir = dir.to_path_buf();
    tokio::task::spawn_blocking(move || write_snapshot(&dir, &bytes))
        .await
        .map_err(|e| MentorError::VectorStore(format!("Persist task failed: {}", e)))??;
    debug!("Persisted {} documents", index.len());
    Ok(())
}
