use crate::answer::{clean_answer, collect_evidence, source_pages};
use crate::embeddings::Embedder;
use crate::error::{AskError, IndexError};
use crate::extractor::PdfExtractor;
use crate::indexer::index_pages;
use crate::llm::LanguageModel;
use crate::models::{AskResult, DeleteReceipt, DocumentRecord, IndexSummary, QaOptions};
use crate::prompt::{build_prompt, FALLBACK_ANSWER};
use crate::retriever::retrieve_top_k;
use crate::storage::{digest_bytes, UploadStore};
use crate::traits::VectorIndex;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Wires the write path (upload → extract → chunk → embed → upsert) and the
/// read path (retrieve → prompt → complete → post-process) over injected
/// backends.
///
/// The vector index is shared mutable state: purge-then-insert for one
/// `doc_id` is not transactionally isolated, so the coordinator serializes
/// the write path per document with an async lock. Reads need no
/// coordination.
pub struct QaCoordinator<P, E, V, L>
where
    P: PdfExtractor,
    E: Embedder,
    V: VectorIndex,
    L: LanguageModel,
{
    extractor: P,
    embedder: E,
    index: V,
    model: L,
    uploads: UploadStore,
    options: QaOptions,
    doc_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl<P, E, V, L> QaCoordinator<P, E, V, L>
where
    P: PdfExtractor + Send + Sync,
    E: Embedder + Send + Sync,
    V: VectorIndex + Send + Sync,
    L: LanguageModel + Send + Sync,
{
    pub fn new(
        extractor: P,
        embedder: E,
        index: V,
        model: L,
        uploads: UploadStore,
        options: QaOptions,
    ) -> Result<Self, IndexError> {
        options.chunking.validate()?;

        Ok(Self {
            extractor,
            embedder,
            index,
            model,
            uploads,
            options,
            doc_locks: Mutex::new(HashMap::new()),
        })
    }

    fn lock_for(&self, doc_id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.doc_locks.lock().unwrap_or_else(|e| e.into_inner());
        locks
            .entry(doc_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Validate, persist, and index an uploaded PDF under a fresh `doc_id`.
    /// Content failures (`NoExtractableText`, `NoValidChunks`) keep the
    /// blob on disk so the document can be re-indexed later.
    pub async fn upload_and_index(
        &self,
        filename: &str,
        bytes: &[u8],
    ) -> Result<DocumentRecord, IndexError> {
        if !filename.to_lowercase().ends_with(".pdf") {
            return Err(IndexError::InvalidInput(format!(
                "only PDF files are supported (expected a .pdf file, got {filename})"
            )));
        }
        if bytes.len() > self.options.max_upload_bytes {
            return Err(IndexError::InvalidInput(format!(
                "file is too large: {} bytes exceeds the {} byte limit",
                bytes.len(),
                self.options.max_upload_bytes
            )));
        }

        let doc_id = Uuid::new_v4().to_string();
        let lock = self.lock_for(&doc_id);
        let _guard = lock.lock().await;

        let path = self.uploads.save(&doc_id, bytes)?;
        let pages = self.extractor.extract_pages(&path)?;
        let summary = index_pages(
            &self.embedder,
            &self.index,
            self.options.chunking,
            &doc_id,
            &pages,
        )
        .await?;

        Ok(DocumentRecord {
            doc_id,
            original_filename: filename.to_string(),
            checksum: digest_bytes(bytes),
            uploaded_at: Utc::now(),
            pages: summary.pages,
            chunks: summary.chunks,
        })
    }

    /// Re-run extraction and indexing from the stored blob. Idempotent
    /// overwrite: prior vectors for the document are purged first.
    pub async fn reindex(&self, doc_id: &str) -> Result<IndexSummary, IndexError> {
        let lock = self.lock_for(doc_id);
        let _guard = lock.lock().await;

        if !self.uploads.exists(doc_id) {
            return Err(IndexError::InvalidInput(format!(
                "no stored PDF for doc_id {doc_id}"
            )));
        }

        let pages = self.extractor.extract_pages(&self.uploads.path_for(doc_id))?;
        index_pages(
            &self.embedder,
            &self.index,
            self.options.chunking,
            doc_id,
            &pages,
        )
        .await
    }

    /// Answer a question from the document's indexed chunks. When retrieval
    /// finds nothing the canned fallback is returned without calling the
    /// model.
    pub async fn ask(
        &self,
        doc_id: &str,
        question: &str,
        top_k: Option<usize>,
    ) -> Result<AskResult, AskError> {
        if question.trim().is_empty() {
            return Err(AskError::InvalidRequest("question is empty".to_string()));
        }

        let top_k = top_k.unwrap_or(self.options.default_top_k);
        let retrieved =
            retrieve_top_k(&self.embedder, &self.index, doc_id, question, top_k).await?;

        if retrieved.is_empty() {
            return Ok(AskResult {
                doc_id: doc_id.to_string(),
                question: question.to_string(),
                answer: FALLBACK_ANSWER.to_string(),
                sources: Vec::new(),
                evidence: Vec::new(),
            });
        }

        let prompt = build_prompt(question, &retrieved);
        let raw = self.model.complete(&prompt).await?;

        Ok(AskResult {
            doc_id: doc_id.to_string(),
            question: question.to_string(),
            answer: clean_answer(&raw),
            sources: source_pages(&retrieved),
            evidence: collect_evidence(&retrieved),
        })
    }

    /// Purge the document's vectors, then remove its blob. Both halves are
    /// idempotent and the purge is always attempted, blob or no blob.
    pub async fn delete_document(&self, doc_id: &str) -> Result<DeleteReceipt, IndexError> {
        let lock = self.lock_for(doc_id);
        let _guard = lock.lock().await;

        self.index.delete_document(doc_id).await?;
        let blob_removed = self.uploads.remove(doc_id)?;

        Ok(DeleteReceipt {
            doc_id: doc_id.to_string(),
            blob_removed,
        })
    }
}
