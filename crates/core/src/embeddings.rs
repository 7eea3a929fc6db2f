use crate::error::EmbedError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use url::Url;

const DEFAULT: usize = 128;

pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = DEFAULT;

/// Maps text to fixed-length vectors. Batched by contract: one vector per
/// input, same order, same dimensionality on every call.
#[async_trait]
pub trait Embedder {
    fn dimensions(&self) -> usize;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        if vectors.len() != 1 {
            return Err(EmbedError::BatchMismatch {
                expected: 1,
                returned: vectors.len(),
            });
        }
        Ok(vectors.remove(0))
    }
}

/// Deterministic local embedder hashing character trigrams into a
/// normalized bucket histogram. No model download, no network.
#[derive(Debug, Clone, Copy)]
pub struct HashEmbedder {
    pub dimensions: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self {
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        }
    }
}

impl HashEmbedder {
    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0f32; self.dimensions.max(1)];
        let lowered = text.to_lowercase();
        let chars: Vec<char> = lowered.chars().collect();

        if chars.is_empty() {
            return vector;
        }

        for window in chars.windows(3) {
            let token = window.iter().collect::<String>();
            let mut hash = 1469598103934665603u64;
            for byte in token.bytes() {
                hash ^= byte as u64;
                hash = hash.wrapping_mul(1099511628211);
            }
            let bucket = (hash % vector.len() as u64) as usize;
            vector[bucket] += 1.0;
        }

        let magnitude = vector.iter().map(|value| value * value).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut vector {
                *value /= magnitude;
            }
        }

        vector
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        Ok(texts.iter().map(|text| self.embed_text(text)).collect())
    }
}

/// OpenAI-compatible `/embeddings` endpoint.
pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    dimensions: usize,
}

impl HttpEmbedder {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        dimensions: usize,
    ) -> Result<Self, EmbedError> {
        let endpoint = endpoint.into();
        Url::parse(&endpoint)?;

        Ok(Self {
            client: Client::new(),
            endpoint,
            model: model.into(),
            api_key,
            dimensions,
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
        let mut request = self
            .client
            .post(format!("{}/embeddings", self.endpoint.trim_end_matches('/')))
            .json(&json!({
                "model": self.model,
                "input": texts,
            }));

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(EmbedError::BackendResponse(format!(
                "embedding endpoint returned {}",
                response.status()
            )));
        }

        let parsed: Value = response.json().await?;
        let data = parsed
            .pointer("/data")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                EmbedError::BackendResponse("response has no data array".to_string())
            })?;

        // The backend may return entries out of order; `index` is
        // authoritative for the one-vector-per-input contract.
        let mut vectors: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        for entry in data {
            let index = entry
                .pointer("/index")
                .and_then(Value::as_u64)
                .ok_or_else(|| {
                    EmbedError::BackendResponse("embedding entry has no index".to_string())
                })? as usize;

            let values = entry
                .pointer("/embedding")
                .and_then(Value::as_array)
                .ok_or_else(|| {
                    EmbedError::BackendResponse("embedding entry has no vector".to_string())
                })?
                .iter()
                .map(|value| value.as_f64().unwrap_or(0.0) as f32)
                .collect::<Vec<f32>>();

            if index >= vectors.len() {
                return Err(EmbedError::BackendResponse(format!(
                    "embedding index {index} out of range for {} inputs",
                    texts.len()
                )));
            }
            vectors[index] = Some(values);
        }

        let returned = vectors.iter().filter(|slot| slot.is_some()).count();
        if returned != texts.len() {
            return Err(EmbedError::BatchMismatch {
                expected: texts.len(),
                returned,
            });
        }

        Ok(vectors.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::{Embedder, HashEmbedder};

    #[tokio::test]
    async fn hash_embedder_is_deterministic() {
        let embedder = HashEmbedder::default();
        let first = embedder.embed_one("terms and conditions apply").await.unwrap();
        let second = embedder.embed_one("terms and conditions apply").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn hash_embedder_outputs_expected_length_per_input() {
        let embedder = HashEmbedder { dimensions: 32 };
        let vectors = embedder
            .embed_batch(&["abc".to_string(), "def".to_string()])
            .await
            .unwrap();
        assert_eq!(vectors.len(), 2);
        assert!(vectors.iter().all(|vector| vector.len() == 32));
    }
}
