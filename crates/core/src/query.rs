use crate::embeddings::Embedder;
use crate::error::QueryError;
use crate::models::SearchResult;
use crate::store::VectorStore;

/// Embeds a question, retrieves the nearest chunks, and ranks them
/// deterministically for citation rendering.
pub struct QueryEngine<'a, S, E>
where
    S: VectorStore,
    E: Embedder,
{
    store: &'a S,
    embedder: &'a E,
}

impl<'a, S, E> QueryEngine<'a, S, E>
where
    S: VectorStore,
    E: Embedder,
{
    pub fn new(store: &'a S, embedder: &'a E) -> Self {
        Self { store, embedder }
    }

    /// Top-`k` chunks for `question`, ordered score descending with ascending
    /// `chunk_id` breaking ties, ranks 1-based. Validation happens before the
    /// embedder is touched; a store ingested under a different embedding model
    /// is rejected rather than silently returning corrupted relevance.
    pub fn search(&self, question: &str, k: usize) -> Result<Vec<SearchResult>, QueryError> {
        if question.trim().is_empty() {
            return Err(QueryError::EmptyQuestion);
        }
        if k == 0 {
            return Err(QueryError::InvalidTopK(k));
        }

        if let Some(stored) = self.store.model_id() {
            let active = self.embedder.model_id();
            if stored != active {
                return Err(QueryError::ModelMismatch {
                    stored: stored.to_string(),
                    active,
                });
            }
        }

        let vector = self.embedder.embed(question)?;
        let mut hits = self.store.query(&vector, k)?;

        hits.sort_by(|left, right| {
            right
                .score
                .total_cmp(&left.score)
                .then_with(|| left.chunk.chunk_id.cmp(&right.chunk.chunk_id))
        });

        Ok(hits
            .into_iter()
            .enumerate()
            .map(|(index, hit)| SearchResult {
                chunk: hit.chunk,
                score: hit.score,
                rank: index + 1,
            })
            .collect())
    }
}
