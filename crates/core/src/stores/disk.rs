use crate::error::StoreError;
use crate::models::{ChunkRecord, ScoredChunk};
use crate::store::VectorStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Describes the embedding space an index was created with. Written once when
/// the collection is first created and checked by the query path afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Manifest {
    model_id: String,
    dimensions: usize,
    created_at: DateTime<Utc>,
}

/// File-backed vector index: a full in-memory map of records, serialized to
/// `<store_dir>/<collection>.json` on every write, with the embedding-space
/// manifest beside it in `<collection>.manifest.json`. Reopening the same
/// directory observes previously ingested chunks.
///
/// Queries are a linear cosine-similarity scan. Similarity is
/// `dot(a, b) / (|a| * |b|)` with zero-magnitude vectors scoring 0; higher is
/// more relevant. Results are ordered score descending, then ascending
/// `chunk_id` so equal scores render deterministically.
pub struct DiskVectorStore {
    dir: PathBuf,
    collection: String,
    manifest: Manifest,
    records: BTreeMap<String, ChunkRecord>,
}

impl DiskVectorStore {
    /// Opens (or creates) the collection under `dir`. An existing manifest
    /// wins over the supplied model: the mismatch is surfaced at query time
    /// rather than silently re-keying the index.
    pub fn open(
        dir: &Path,
        collection: &str,
        model_id: &str,
        dimensions: usize,
    ) -> Result<Self, StoreError> {
        fs::create_dir_all(dir)?;

        let manifest_path = manifest_path(dir, collection);
        let manifest = if manifest_path.exists() {
            serde_json::from_str(&fs::read_to_string(&manifest_path)?)?
        } else {
            let manifest = Manifest {
                model_id: model_id.to_string(),
                dimensions,
                created_at: Utc::now(),
            };
            fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)?;
            manifest
        };

        let records_path = records_path(dir, collection);
        let records = if records_path.exists() {
            serde_json::from_str(&fs::read_to_string(&records_path)?)?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            dir: dir.to_path_buf(),
            collection: collection.to_string(),
            manifest,
            records,
        })
    }

    /// Drops every record but keeps the manifest, so a rebuild stays in the
    /// same embedding space.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.records.clear();
        self.flush()
    }

    fn flush(&self) -> Result<(), StoreError> {
        let path = records_path(&self.dir, &self.collection);
        fs::write(path, serde_json::to_string(&self.records)?)?;
        Ok(())
    }

    fn check_dimensions(&self, actual: usize) -> Result<(), StoreError> {
        if actual != self.manifest.dimensions {
            return Err(StoreError::DimensionMismatch {
                expected: self.manifest.dimensions,
                actual,
            });
        }
        Ok(())
    }
}

fn manifest_path(dir: &Path, collection: &str) -> PathBuf {
    dir.join(format!("{collection}.manifest.json"))
}

fn records_path(dir: &Path, collection: &str) -> PathBuf {
    dir.join(format!("{collection}.json"))
}

fn cosine_similarity(left: &[f32], right: &[f32]) -> f32 {
    let dot: f32 = left.iter().zip(right).map(|(a, b)| a * b).sum();
    let left_mag: f32 = left.iter().map(|value| value * value).sum::<f32>().sqrt();
    let right_mag: f32 = right.iter().map(|value| value * value).sum::<f32>().sqrt();

    if left_mag == 0.0 || right_mag == 0.0 {
        return 0.0;
    }
    dot / (left_mag * right_mag)
}

impl VectorStore for DiskVectorStore {
    fn upsert(&mut self, records: Vec<ChunkRecord>) -> Result<(), StoreError> {
        for record in &records {
            self.check_dimensions(record.embedding.len())?;
        }

        for record in records {
            self.records.insert(record.chunk.chunk_id.clone(), record);
        }
        self.flush()
    }

    fn query(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredChunk>, StoreError> {
        if self.records.is_empty() {
            return Ok(Vec::new());
        }
        self.check_dimensions(vector.len())?;

        let mut scored: Vec<ScoredChunk> = self
            .records
            .values()
            .map(|record| ScoredChunk {
                chunk: record.chunk.clone(),
                score: cosine_similarity(vector, &record.embedding),
            })
            .collect();

        scored.sort_by(|left, right| {
            right
                .score
                .total_cmp(&left.score)
                .then_with(|| left.chunk.chunk_id.cmp(&right.chunk.chunk_id))
        });
        scored.truncate(k);

        Ok(scored)
    }

    fn count(&self) -> usize {
        self.records.len()
    }

    fn document_chunk_count(&self, document_id: &str) -> usize {
        self.records
            .values()
            .filter(|record| record.chunk.document_id == document_id)
            .count()
    }

    fn clear_document(&mut self, document_id: &str) -> Result<usize, StoreError> {
        let before = self.records.len();
        self.records
            .retain(|_, record| record.chunk.document_id != document_id);
        let dropped = before - self.records.len();

        if dropped > 0 {
            self.flush()?;
        }
        Ok(dropped)
    }

    fn model_id(&self) -> Option<&str> {
        Some(&self.manifest.model_id)
    }
}
