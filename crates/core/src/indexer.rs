use crate::chunking::{chunk_pages, ChunkingConfig};
use crate::embeddings::Embedder;
use crate::error::{EmbedError, IndexError};
use crate::extractor::PageText;
use crate::models::IndexSummary;
use crate::traits::{VectorIndex, VectorRecord};

/// Extract → chunk → embed → upsert for one document.
///
/// Re-index safe: existing vectors for `doc_id` are purged before the new
/// batch is written. Embeddings are computed in a single batched call. If
/// the upsert fails the purge is re-attempted so no partial chunk set stays
/// queryable.
pub async fn index_pages<E, V>(
    embedder: &E,
    index: &V,
    config: ChunkingConfig,
    doc_id: &str,
    pages: &[PageText],
) -> Result<IndexSummary, IndexError>
where
    E: Embedder + Sync,
    V: VectorIndex + Sync,
{
    let full_text = pages
        .iter()
        .map(|page| page.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    if full_text.trim().is_empty() {
        return Err(IndexError::NoExtractableText);
    }

    let chunks = chunk_pages(doc_id, pages, config);
    if chunks.is_empty() {
        return Err(IndexError::NoValidChunks);
    }

    index.delete_document(doc_id).await?;

    let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
    let embeddings = embedder.embed_batch(&texts).await?;
    if embeddings.len() != chunks.len() {
        return Err(EmbedError::BatchMismatch {
            expected: chunks.len(),
            returned: embeddings.len(),
        }
        .into());
    }

    let records: Vec<VectorRecord> = chunks
        .iter()
        .zip(embeddings)
        .map(|(chunk, embedding)| VectorRecord {
            id: chunk.storage_id(),
            doc_id: chunk.doc_id.clone(),
            page_number: chunk.page_number,
            chunk_index: chunk.chunk_index,
            text: chunk.text.clone(),
            embedding,
        })
        .collect();

    if let Err(error) = index.upsert(&records).await {
        // Partial upserts must not stay queryable.
        let _ = index.delete_document(doc_id).await;
        return Err(error.into());
    }

    Ok(IndexSummary {
        pages: pages.len(),
        chunks: records.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashEmbedder;
    use crate::error::StoreError;
    use crate::traits::ScoredRecord;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory stand-in with real upsert/delete semantics.
    #[derive(Default)]
    struct FakeIndex {
        records: Mutex<HashMap<String, VectorRecord>>,
        calls: Mutex<Vec<String>>,
        fail_upsert: bool,
    }

    impl FakeIndex {
        fn count_for(&self, doc_id: &str) -> usize {
            self.records
                .lock()
                .unwrap()
                .values()
                .filter(|record| record.doc_id == doc_id)
                .count()
        }
    }

    #[async_trait]
    impl VectorIndex for FakeIndex {
        async fn upsert(&self, records: &[VectorRecord]) -> Result<(), StoreError> {
            self.calls.lock().unwrap().push("upsert".to_string());
            if self.fail_upsert {
                return Err(StoreError::Request("injected upsert failure".to_string()));
            }
            let mut stored = self.records.lock().unwrap();
            for record in records {
                stored.insert(record.id.clone(), record.clone());
            }
            Ok(())
        }

        async fn query(
            &self,
            _embedding: &[f32],
            _limit: usize,
            _doc_id: &str,
        ) -> Result<Vec<ScoredRecord>, StoreError> {
            Ok(Vec::new())
        }

        async fn delete_document(&self, doc_id: &str) -> Result<(), StoreError> {
            self.calls.lock().unwrap().push("delete".to_string());
            self.records
                .lock()
                .unwrap()
                .retain(|_, record| record.doc_id != doc_id);
            Ok(())
        }
    }

    fn pages(texts: &[&str]) -> Vec<PageText> {
        texts
            .iter()
            .enumerate()
            .map(|(offset, text)| PageText {
                number: offset as u32 + 1,
                text: text.to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn whitespace_only_document_is_rejected_before_any_mutation() {
        let index = FakeIndex::default();
        let result = index_pages(
            &HashEmbedder::default(),
            &index,
            ChunkingConfig::default(),
            "doc-1",
            &pages(&["", "   \n  "]),
        )
        .await;

        assert!(matches!(result, Err(IndexError::NoExtractableText)));
        assert!(index.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn indexing_reports_page_and_chunk_counts() {
        let index = FakeIndex::default();
        let summary = index_pages(
            &HashEmbedder::default(),
            &index,
            ChunkingConfig::default(),
            "doc-1",
            &pages(&["first page text", "", "third page text"]),
        )
        .await
        .unwrap();

        assert_eq!(summary.pages, 3);
        assert_eq!(summary.chunks, 2);
        assert_eq!(index.count_for("doc-1"), 2);
    }

    #[tokio::test]
    async fn purge_happens_before_insert() {
        let index = FakeIndex::default();
        index_pages(
            &HashEmbedder::default(),
            &index,
            ChunkingConfig::default(),
            "doc-1",
            &pages(&["some text"]),
        )
        .await
        .unwrap();

        assert_eq!(*index.calls.lock().unwrap(), vec!["delete", "upsert"]);
    }

    #[tokio::test]
    async fn reindexing_does_not_double_the_chunk_count() {
        let index = FakeIndex::default();
        let content = pages(&["alpha beta gamma", "delta epsilon"]);

        for _ in 0..2 {
            index_pages(
                &HashEmbedder::default(),
                &index,
                ChunkingConfig::default(),
                "doc-1",
                &content,
            )
            .await
            .unwrap();
        }

        assert_eq!(index.count_for("doc-1"), 2);
    }

    #[tokio::test]
    async fn failed_upsert_purges_partial_state() {
        let index = FakeIndex {
            fail_upsert: true,
            ..FakeIndex::default()
        };
        let result = index_pages(
            &HashEmbedder::default(),
            &index,
            ChunkingConfig::default(),
            "doc-1",
            &pages(&["some text"]),
        )
        .await;

        assert!(matches!(result, Err(IndexError::Store(_))));
        assert_eq!(
            *index.calls.lock().unwrap(),
            vec!["delete", "upsert", "delete"]
        );
    }
}
