use crate::config::Config;
use crate::models::Chunk;
use sha2::{Digest, Sha256};

/// Window parameters for the chunker. Assumed valid; `Config::validate` rejects
/// `overlap >= chunk_size` and `chunk_size == 0` before any chunking runs.
#[derive(Debug, Clone, Copy)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl From<&Config> for ChunkingConfig {
    fn from(value: &Config) -> Self {
        Self {
            chunk_size: value.chunk_size,
            overlap: value.chunk_overlap,
        }
    }
}

/// Splits a page's text into overlapping fixed-length character windows.
///
/// Starting at offset 0, each window covers `[offset, offset + chunk_size)`
/// clipped to the text length; the offset then advances by
/// `chunk_size - overlap`. The final window may be shorter than `chunk_size`,
/// and once a window reaches the end of the text no further windows are
/// produced. Empty text yields no chunks. Offsets are character counts, not
/// bytes, so multi-byte text never splits inside a code point.
///
/// Identical inputs always produce identical boundaries and chunk ids, which is
/// what makes re-ingestion an overwrite instead of an append.
pub fn chunk_page(
    text: &str,
    page_number: u32,
    document_id: &str,
    config: &ChunkingConfig,
) -> Vec<Chunk> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    let step = config.chunk_size - config.overlap;
    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + config.chunk_size).min(chars.len());
        let window: String = chars[start..end].iter().collect();

        chunks.push(Chunk {
            chunk_id: make_chunk_id(document_id, page_number, start),
            document_id: document_id.to_string(),
            page_number,
            char_start: start,
            char_end: end,
            text: window,
        });

        if end == chars.len() {
            break;
        }
        start += step;
    }

    chunks
}

/// Stable chunk identifier over the document, page, and window start offset.
/// The text itself is excluded so a changed page overwrites the same ids at the
/// same offsets.
pub fn make_chunk_id(document_id: &str, page_number: u32, char_start: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document_id.as_bytes());
    hasher.update(page_number.to_le_bytes());
    hasher.update((char_start as u64).to_le_bytes());
    format!("{:x}", hasher.finalize())
}
