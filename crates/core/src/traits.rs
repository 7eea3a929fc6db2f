use crate::error::StoreError;
use async_trait::async_trait;

/// One chunk as stored in the vector index. Upserting the same `id` again
/// overwrites the previous point.
#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub id: String,
    pub doc_id: String,
    pub page_number: u32,
    pub chunk_index: u64,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// A query hit. `distance` is a cosine distance: 0 for identical vectors,
/// increasing with dissimilarity.
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub text: String,
    pub page_number: u32,
    pub chunk_index: u64,
    pub distance: f64,
}

/// Persistent nearest-neighbor store partitioned by `doc_id`.
#[async_trait]
pub trait VectorIndex {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<(), StoreError>;

    /// Nearest neighbors of `embedding` restricted to one document,
    /// ordered most-similar first.
    async fn query(
        &self,
        embedding: &[f32],
        limit: usize,
        doc_id: &str,
    ) -> Result<Vec<ScoredRecord>, StoreError>;

    /// Remove every record for `doc_id`. Idempotent.
    async fn delete_document(&self, doc_id: &str) -> Result<(), StoreError>;
}
