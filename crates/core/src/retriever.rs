use crate::embeddings::Embedder;
use crate::error::AskError;
use crate::models::RetrievedChunk;
use crate::traits::VectorIndex;
use std::collections::HashSet;

/// Embed the question, over-fetch from the index, dedupe, rank, truncate.
///
/// The index is queried for three times `top_k` so enough candidates
/// survive deduplication when near-duplicate chunks cluster around the same
/// answer region. An empty result is a valid terminal state ("no
/// evidence"), not an error.
pub async fn retrieve_top_k<E, V>(
    embedder: &E,
    index: &V,
    doc_id: &str,
    question: &str,
    top_k: usize,
) -> Result<Vec<RetrievedChunk>, AskError>
where
    E: Embedder + Sync,
    V: VectorIndex + Sync,
{
    let query_vector = embedder.embed_one(question).await?;
    let limit = (top_k * 3).max(top_k);

    let hits = index.query(&query_vector, limit, doc_id).await?;

    // Duplicates come from index implementation quirks, never from
    // legitimate distinct evidence; keep the first occurrence, which is the
    // index's own relevance order.
    let mut seen = HashSet::new();
    let mut retrieved = Vec::new();
    for hit in hits {
        if hit.text.is_empty() {
            continue;
        }
        if !seen.insert((hit.page_number, hit.chunk_index)) {
            continue;
        }
        retrieved.push(RetrievedChunk {
            text: hit.text,
            page_number: hit.page_number,
            chunk_index: hit.chunk_index,
            similarity: 1.0 - hit.distance,
        });
    }

    // sort_by is stable, so ties keep their original order.
    retrieved.sort_by(|left, right| right.similarity.total_cmp(&left.similarity));
    retrieved.truncate(top_k);

    Ok(retrieved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::HashEmbedder;
    use crate::error::StoreError;
    use crate::traits::ScoredRecord;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeIndex {
        hits: Vec<ScoredRecord>,
        requested_limit: Mutex<Option<usize>>,
    }

    impl FakeIndex {
        fn with_hits(hits: Vec<ScoredRecord>) -> Self {
            Self {
                hits,
                requested_limit: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl VectorIndex for FakeIndex {
        async fn upsert(&self, _records: &[crate::traits::VectorRecord]) -> Result<(), StoreError> {
            Ok(())
        }

        async fn query(
            &self,
            _embedding: &[f32],
            limit: usize,
            _doc_id: &str,
        ) -> Result<Vec<ScoredRecord>, StoreError> {
            *self.requested_limit.lock().unwrap() = Some(limit);
            Ok(self.hits.clone())
        }

        async fn delete_document(&self, _doc_id: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn hit(text: &str, page: u32, chunk: u64, distance: f64) -> ScoredRecord {
        ScoredRecord {
            text: text.to_string(),
            page_number: page,
            chunk_index: chunk,
            distance,
        }
    }

    #[tokio::test]
    async fn overfetches_three_times_top_k() {
        let index = FakeIndex::with_hits(Vec::new());
        retrieve_top_k(&HashEmbedder::default(), &index, "doc-1", "question", 5)
            .await
            .unwrap();
        assert_eq!(*index.requested_limit.lock().unwrap(), Some(15));
    }

    #[tokio::test]
    async fn duplicates_and_empty_text_are_dropped() {
        let index = FakeIndex::with_hits(vec![
            hit("first", 1, 0, 0.1),
            hit("", 2, 1, 0.05),
            hit("first again", 1, 0, 0.2),
            hit("second", 3, 4, 0.3),
        ]);

        let retrieved = retrieve_top_k(&HashEmbedder::default(), &index, "doc-1", "q", 5)
            .await
            .unwrap();

        assert_eq!(retrieved.len(), 2);
        assert_eq!(retrieved[0].text, "first");
        assert_eq!(retrieved[1].text, "second");
    }

    #[tokio::test]
    async fn results_are_ranked_by_similarity_and_truncated() {
        let index = FakeIndex::with_hits(vec![
            hit("far", 1, 0, 0.9),
            hit("near", 2, 1, 0.1),
            hit("middle", 3, 2, 0.5),
        ]);

        let retrieved = retrieve_top_k(&HashEmbedder::default(), &index, "doc-1", "q", 2)
            .await
            .unwrap();

        assert_eq!(retrieved.len(), 2);
        assert_eq!(retrieved[0].text, "near");
        assert!((retrieved[0].similarity - 0.9).abs() < 1e-9);
        assert_eq!(retrieved[1].text, "middle");
        assert!(retrieved[0].similarity >= retrieved[1].similarity);
    }

    #[tokio::test]
    async fn empty_index_is_not_an_error() {
        let index = FakeIndex::with_hits(Vec::new());
        let retrieved = retrieve_top_k(&HashEmbedder::default(), &index, "unknown", "q", 5)
            .await
            .unwrap();
        assert!(retrieved.is_empty());
    }
}
