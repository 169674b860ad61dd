//! Vector index for knowledge units.
//!
//! A flat in-memory index searched by cosine similarity, persisted as a
//! single-file snapshot that is loaded and rewritten wholesale.

mod disk;

pub use disk::{write_snapshot, INDEX_FILE};

use crate::error::{MentorError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A knowledge unit stored in the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID.
    pub id: Uuid,
    /// Text content, usually `"Q: ...\nA: ..."`.
    pub content: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this document was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document.
    pub fn new(content: String, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            embedding,
            indexed_at: Utc::now(),
        }
    }
}

/// Format a question/answer pair as a knowledge unit.
pub fn knowledge_unit(question: &str, answer: &str) -> String {
    format!("Q: {}\nA: {}", question, answer)
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched document.
    pub document: Document,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Flat vector index.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    /// Name of the embedding model that produced the vectors.
    embedding_model: String,
    /// Fixed once the first document is added.
    dimensions: Option<usize>,
    documents: Vec<Document>,
}

impl VectorIndex {
    /// Create an empty index for vectors from the given embedding model.
    pub fn new(embedding_model: &str) -> Self {
        Self {
            embedding_model: embedding_model.to_string(),
            dimensions: None,
            documents: Vec::new(),
        }
    }

    /// Append a document. Rejects embeddings whose size differs from the index.
    pub fn add(&mut self, doc: Document) -> Result<()> {
        if doc.embedding.is_empty() {
            return Err(MentorError::VectorStore("Empty embedding".to_string()));
        }
        match self.dimensions {
            Some(dims) if dims != doc.embedding.len() => {
                return Err(MentorError::VectorStore(format!(
                    "Embedding has {} dimensions, index expects {}",
                    doc.embedding.len(),
                    dims
                )));
            }
            Some(_) => {}
            None => self.dimensions = Some(doc.embedding.len()),
        }
        self.documents.push(doc);
        Ok(())
    }

    /// Top-k documents by cosine similarity, best first.
    pub fn search(&self, query_embedding: &[f32], limit: usize) -> Vec<SearchResult> {
        let mut scored: Vec<(usize, f32)> = self
            .documents
            .iter()
            .enumerate()
            .map(|(i, doc)| (i, cosine_similarity(query_embedding, &doc.embedding)))
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        scored
            .into_iter()
            .map(|(i, score)| SearchResult {
                document: self.documents[i].clone(),
                score,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);

        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_knowledge_unit_format() {
        assert_eq!(knowledge_unit("1+1?", "2"), "Q: 1+1?\nA: 2");
    }

    #[test]
    fn test_search_ranks_by_similarity() {
        let mut index = VectorIndex::new("test");
        index
            .add(Document::new("east".to_string(), vec![1.0, 0.0, 0.0]))
            .unwrap();
        index
            .add(Document::new("north".to_string(), vec![0.0, 1.0, 0.0]))
            .unwrap();
        index
            .add(Document::new("north-east".to_string(), vec![0.7, 0.7, 0.0]))
            .unwrap();

        let results = index.search(&[1.0, 0.1, 0.0], 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.content, "east");
        assert_eq!(results[1].document.content, "north-east");
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn test_search_limit_and_ties() {
        let mut index = VectorIndex::new("test");
        for name in ["first", "second", "third"] {
            index
                .add(Document::new(name.to_string(), vec![1.0, 0.0]))
                .unwrap();
        }

        assert!(index.search(&[1.0, 0.0], 0).is_empty());

        let results = index.search(&[1.0, 0.0], 10);
        let names: Vec<_> = results.iter().map(|r| r.document.content.as_str()).collect();
        // Equal scores keep insertion order
        assert_eq!(names, vec!["first", "second", "third"]);
        assert_eq!(results[2].document.id, index.documents()[2].id);
    }

    #[test]
    fn test_add_rejects_dimension_mismatch() {
        let mut index = VectorIndex::new("test");
        index.add(Document::new("a".to_string(), vec![1.0, 0.0])).unwrap();

        let err = index.add(Document::new("b".to_string(), vec![1.0, 0.0, 0.0]));
        assert!(err.is_err());
        assert!(index.add(Document::new("c".to_string(), vec![])).is_err());
        assert_eq!(index.len(), 1);
        assert_eq!(index.dimensions(), Some(2));
    }
}
