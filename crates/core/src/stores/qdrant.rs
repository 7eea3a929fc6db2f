use crate::error::StoreError;
use crate::traits::{ScoredRecord, VectorIndex, VectorRecord};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use url::Url;
use uuid::Uuid;

/// Qdrant-backed vector index. The collection is created in cosine space,
/// so a returned score is a cosine similarity and maps to
/// `distance = 1 - score`.
pub struct QdrantStore {
    endpoint: String,
    collection: String,
    client: Client,
    vector_size: usize,
}

impl QdrantStore {
    pub fn new(
        endpoint: impl Into<String>,
        collection: impl Into<String>,
        vector_size: usize,
    ) -> Result<Self, StoreError> {
        let endpoint = endpoint.into();
        Url::parse(&endpoint)?;

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            collection: collection.into(),
            client: Client::new(),
            vector_size,
        })
    }

    /// Create the collection with cosine distance if it does not exist yet.
    pub async fn ensure_collection(&self) -> Result<(), StoreError> {
        let response = self
            .client
            .get(format!("{}/collections/{}", self.endpoint, self.collection))
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        if !response.status().is_client_error() {
            return Err(StoreError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

        let response = self
            .client
            .put(format!("{}/collections/{}", self.endpoint, self.collection))
            .json(&json!({
                "vectors": {
                    "size": self.vector_size,
                    "distance": "Cosine",
                }
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::Request(format!(
                "qdrant collection setup failed with {}",
                response.status()
            )));
        }

        Ok(())
    }

    fn doc_filter(doc_id: &str) -> Value {
        json!({
            "must": [
                { "key": "doc_id", "match": { "value": doc_id } }
            ]
        })
    }
}

/// Qdrant point ids must be integers or UUIDs. Deriving a UUIDv5 from the
/// chunk storage identity keeps upserts of the same chunk overwriting
/// instead of duplicating.
pub fn point_id(storage_id: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, storage_id.as_bytes()).to_string()
}

#[async_trait]
impl VectorIndex for QdrantStore {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<(), StoreError> {
        let points = records
            .iter()
            .map(|record| {
                if record.embedding.len() != self.vector_size {
                    return Err(StoreError::Request(format!(
                        "embedding dimension {} != {}",
                        record.embedding.len(),
                        self.vector_size
                    )));
                }

                Ok(json!({
                    "id": point_id(&record.id),
                    "vector": record.embedding,
                    "payload": {
                        "chunk_id": record.id,
                        "doc_id": record.doc_id,
                        "page": record.page_number,
                        "chunk_index": record.chunk_index,
                        "text": record.text,
                    },
                }))
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        if points.is_empty() {
            return Ok(());
        }

        let response = self
            .client
            .put(format!(
                "{}/collections/{}/points?wait=true",
                self.endpoint, self.collection
            ))
            .json(&json!({ "points": points }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

        Ok(())
    }

    async fn query(
        &self,
        embedding: &[f32],
        limit: usize,
        doc_id: &str,
    ) -> Result<Vec<ScoredRecord>, StoreError> {
        if embedding.len() != self.vector_size {
            return Err(StoreError::Request(format!(
                "query vector dim {} is not {}",
                embedding.len(),
                self.vector_size
            )));
        }

        let response = self
            .client
            .post(format!(
                "{}/collections/{}/points/search",
                self.endpoint, self.collection
            ))
            .json(&json!({
                "vector": embedding,
                "limit": limit,
                "with_payload": true,
                "filter": Self::doc_filter(doc_id),
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

        let parsed: Value = response.json().await?;
        let hits = parsed
            .pointer("/result")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut result = Vec::new();
        for hit in hits {
            let score = hit.pointer("/score").and_then(Value::as_f64).unwrap_or(0.0);
            let text = hit
                .pointer("/payload/text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let page_number = hit
                .pointer("/payload/page")
                .and_then(Value::as_u64)
                .unwrap_or(0) as u32;
            let chunk_index = hit
                .pointer("/payload/chunk_index")
                .and_then(Value::as_u64)
                .unwrap_or(0);

            result.push(ScoredRecord {
                text,
                page_number,
                chunk_index,
                distance: 1.0 - score,
            });
        }

        Ok(result)
    }

    async fn delete_document(&self, doc_id: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .post(format!(
                "{}/collections/{}/points/delete?wait=true",
                self.endpoint, self.collection
            ))
            .json(&json!({ "filter": Self::doc_filter(doc_id) }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::BackendResponse {
                backend: "qdrant".to_string(),
                details: response.status().to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{point_id, QdrantStore};

    #[test]
    fn point_id_is_deterministic_per_storage_id() {
        assert_eq!(point_id("doc-1:0"), point_id("doc-1:0"));
        assert_ne!(point_id("doc-1:0"), point_id("doc-1:1"));
        assert_ne!(point_id("doc-1:0"), point_id("doc-2:0"));
    }

    #[test]
    fn endpoint_must_be_a_url() {
        assert!(QdrantStore::new("not a url", "chunks", 128).is_err());
        assert!(QdrantStore::new("http://localhost:6333/", "chunks", 128).is_ok());
    }
}
