use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A page-scoped slice of document text, the atomic unit of embedding and
/// retrieval. `chunk_index` is global to the document and strictly
/// increasing in extraction order; chunks never span pages so answers can
/// cite exact page numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    pub doc_id: String,
    pub chunk_index: u64,
    pub page_number: u32,
    pub text: String,
}

impl Chunk {
    /// Identity under which the chunk is stored in the vector index.
    pub fn storage_id(&self) -> String {
        format!("{}:{}", self.doc_id, self.chunk_index)
    }
}

/// A chunk returned from a similarity query. Ephemeral, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
    pub page_number: u32,
    pub chunk_index: u64,
    pub similarity: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evidence {
    pub page_number: u32,
    pub excerpt: String,
}

/// Final answer for one question against one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResult {
    pub doc_id: String,
    pub question: String,
    pub answer: String,
    /// Distinct page numbers across all retrieved chunks, ascending.
    pub sources: Vec<u32>,
    /// Excerpts of the top retrieved chunks, at most two.
    pub evidence: Vec<Evidence>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IndexSummary {
    pub pages: usize,
    pub chunks: usize,
}

/// Receipt for a successful upload and index run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub doc_id: String,
    pub original_filename: String,
    pub checksum: String,
    pub uploaded_at: DateTime<Utc>,
    pub pages: usize,
    pub chunks: usize,
}

/// Receipt for a delete. The vector purge is always attempted first, so a
/// returned receipt implies it succeeded; `blob_removed` is false when the
/// stored PDF was already gone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteReceipt {
    pub doc_id: String,
    pub blob_removed: bool,
}

/// Coordinator-level knobs. Validated once at startup.
#[derive(Debug, Clone)]
pub struct QaOptions {
    pub chunking: crate::chunking::ChunkingConfig,
    /// Chunks handed to the prompt builder when the caller does not say.
    pub default_top_k: usize,
    pub max_upload_bytes: usize,
}

impl Default for QaOptions {
    fn default() -> Self {
        Self {
            chunking: crate::chunking::ChunkingConfig::default(),
            default_top_k: 5,
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}
