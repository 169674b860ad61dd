//! On-disk layout of a persisted index.
//!
//! The index directory holds a single snapshot, `index.json`, with the
//! embedding model, dimensions, and every document (id, text, embedding,
//! timestamp) in insertion order. A save writes the whole snapshot to a
//! temporary file in the same directory and renames it into place, so a
//! reader sees either the previous snapshot or the new one.

use super::{Document, VectorIndex};
use crate::error::{MentorError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::{BufReader, Write};
use std::path::Path;
use tracing::debug;

pub const INDEX_FILE: &str = "index.json";

const FORMAT_VERSION: u32 = 2;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    embedding_model: &'a str,
    dimensions: Option<usize>,
    documents: &'a [Document],
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    embedding_model: String,
    dimensions: Option<usize>,
    documents: Vec<Document>,
}

impl VectorIndex {
    /// Serialize the full index into a snapshot.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&SnapshotRef {
            version: FORMAT_VERSION,
            embedding_model: &self.embedding_model,
            dimensions: self.dimensions,
            documents: &self.documents,
        })?)
    }

    /// Write the full index into `dir`, creating it if needed.
    pub fn save(&self, dir: &Path) -> Result<()> {
        write_snapshot(dir, &self.encode()?)?;
        debug!("Persisted {} documents to {}", self.documents.len(), dir.display());
        Ok(())
    }

    /// Load a full index from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(INDEX_FILE);
        let file = std::fs::File::open(&path).map_err(|e| {
            MentorError::VectorStore(format!("Cannot open {}: {}", path.display(), e))
        })?;
        let snapshot: Snapshot = serde_json::from_reader(BufReader::new(file))?;

        if snapshot.version != FORMAT_VERSION {
            return Err(MentorError::VectorStore(format!(
                "Unsupported index format version {}",
                snapshot.version
            )));
        }

        let mut seen = HashSet::with_capacity(snapshot.documents.len());
        let mut loaded = VectorIndex::new(&snapshot.embedding_model);
        for doc in snapshot.documents {
            if !seen.insert(doc.id) {
                return Err(MentorError::VectorStore(format!(
                    "Duplicate document id {}",
                    doc.id
                )));
            }
            loaded.add(doc)?;
        }

        if snapshot.dimensions.is_some() && loaded.dimensions != snapshot.dimensions {
            return Err(MentorError::VectorStore(
                "Stored dimensions do not match the embeddings".to_string(),
            ));
        }

        debug!("Loaded {} documents from {}", loaded.len(), dir.display());
        Ok(loaded)
    }
}

/// Atomically replace the snapshot in `dir` with `bytes`.
///
/// Blocks on file I/O and fsync; async callers run it on the blocking pool.
pub fn write_snapshot(dir: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dir.join(INDEX_FILE))
        .map_err(|e| MentorError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> VectorIndex {
        let mut index = VectorIndex::new("test-model");
        index
            .add(Document::new("Q: 1+1?\nA: 2".to_string(), vec![1.0, 0.0]))
            .unwrap();
        index
            .add(Document::new("Q: 2*3?\nA: 6".to_string(), vec![0.0, 1.0]))
            .unwrap();
        index
    }

    #[test]
    fn test_save_then_load_preserves_order_and_text() {
        let dir = tempfile::tempdir().unwrap();
        let index = sample_index();
        index.save(dir.path()).unwrap();

        let loaded = VectorIndex::load(dir.path()).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.embedding_model(), "test-model");
        assert_eq!(loaded.dimensions(), Some(2));
        assert_eq!(loaded.documents()[0].id, index.documents()[0].id);
        assert_eq!(loaded.documents()[1].content, "Q: 2*3?\nA: 6");
        assert_eq!(loaded.documents()[1].indexed_at, index.documents()[1].indexed_at);
    }

    #[test]
    fn test_save_writes_a_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = sample_index();
        index.save(dir.path()).unwrap();

        index
            .add(Document::new("Q: 3-1?\nA: 2".to_string(), vec![0.5, 0.5]))
            .unwrap();
        index.save(dir.path()).unwrap();

        assert_eq!(VectorIndex::load(dir.path()).unwrap().len(), 3);
        // No temp files left behind
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from(INDEX_FILE)]);
    }

    #[test]
    fn test_failed_write_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = sample_index();
        index.save(dir.path()).unwrap();

        // A save interrupted before the rename leaves only a stray temp file
        std::fs::write(dir.path().join(".tmpXYZ123"), b"{\"version\": 2, \"docu").unwrap();
        index
            .add(Document::new("Q: 9/3?\nA: 3".to_string(), vec![0.3, 0.7]))
            .unwrap();

        let loaded = VectorIndex::load(dir.path()).unwrap();
        assert_eq!(loaded.len(), 2);

        index.save(dir.path()).unwrap();
        assert_eq!(VectorIndex::load(dir.path()).unwrap().len(), 3);
    }

    #[test]
    fn test_load_rejects_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        let mut index = sample_index();
        let copy = index.documents()[0].clone();
        index.documents.push(copy);
        index.save(dir.path()).unwrap();

        assert!(VectorIndex::load(dir.path()).is_err());
    }

    #[test]
    fn test_load_missing_or_old_format_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(VectorIndex::load(dir.path()).is_err());

        std::fs::write(
            dir.path().join(INDEX_FILE),
            r#"{"version": 1, "embedding_model": "m", "dimensions": null, "documents": []}"#,
        )
        .unwrap();
        assert!(VectorIndex::load(dir.path()).is_err());
    }
}
