use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A contiguous window of a page's text, the unit of embedding and retrieval.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Deterministic hex digest of `(document_id, page_number, char_start)`.
    /// Stable across re-ingestion of an unchanged document, so upserts overwrite
    /// rather than append.
    pub chunk_id: String,
    pub document_id: String,
    /// 1-based page number within the source document.
    pub page_number: u32,
    /// Character offsets of the window within the page text.
    pub char_start: usize,
    pub char_end: usize,
    pub text: String,
}

/// A chunk paired with its embedding, ready for the vector store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// A store match before ranking: chunk plus its similarity to the query vector.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// A ranked query hit. `score` is cosine similarity (higher = more relevant),
/// `rank` is 1-based.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub chunk: Chunk,
    pub score: f32,
    pub rank: usize,
}

/// One document that failed during ingestion, with the cause.
#[derive(Debug)]
pub struct DocumentError {
    pub document: PathBuf,
    pub cause: String,
}

/// Outcome of an ingestion run. Per-document failures are collected here rather
/// than aborting the batch.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub documents_processed: usize,
    pub chunks_written: usize,
    pub errors: Vec<DocumentError>,
}
