use crate::error::StoreError;
use crate::models::{ChunkRecord, ScoredChunk};

/// Persistent vector index seam. Upsert and query are treated as atomic
/// black-box operations; one process at a time is assumed.
pub trait VectorStore {
    /// Insert-or-overwrite records keyed by `chunk_id`.
    fn upsert(&mut self, records: Vec<ChunkRecord>) -> Result<(), StoreError>;

    /// Up to `k` nearest chunks by cosine similarity, ordered score descending
    /// with ascending `chunk_id` breaking ties. An empty store yields an empty
    /// vec, not an error.
    fn query(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredChunk>, StoreError>;

    /// Total stored chunks.
    fn count(&self) -> usize;

    /// Stored chunks belonging to one document.
    fn document_chunk_count(&self, document_id: &str) -> usize;

    /// Removes every chunk of one document, returning how many were dropped.
    /// This is the only reconciliation offered for documents that shrink
    /// between ingestion runs; without it, stale ids stay orphaned.
    fn clear_document(&mut self, document_id: &str) -> Result<usize, StoreError>;

    /// The embedding model the index was created with, if recorded.
    fn model_id(&self) -> Option<&str>;
}
