use crate::error::ModelError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

pub const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 20;

/// Black-box completion service. A timeout or upstream failure is an error;
/// an empty completion is a valid (if unhelpful) success.
#[async_trait]
pub trait LanguageModel {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}

/// OpenAI-compatible chat-completions client with a bounded request
/// timeout. No retries; retry policy belongs to the caller.
pub struct OpenAiCompatModel {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout_secs: u64,
}

impl OpenAiCompatModel {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, ModelError> {
        let endpoint = endpoint.into();
        Url::parse(&endpoint)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(ModelError::Http)?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
            timeout_secs,
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAiCompatModel {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.endpoint))
            .json(&json!({
                "model": self.model,
                "messages": [
                    { "role": "user", "content": prompt }
                ],
            }));

        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|error| {
            if error.is_timeout() {
                ModelError::Timeout(self.timeout_secs)
            } else {
                ModelError::Http(error)
            }
        })?;

        if !response.status().is_success() {
            let status = response.status().to_string();
            let details = response.text().await.unwrap_or_default();
            return Err(ModelError::BackendResponse { status, details });
        }

        let parsed: Value = response.json().await.map_err(ModelError::Http)?;
        let text = parsed
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ModelError::MalformedResponse("response has no message content".to_string())
            })?;

        Ok(text.to_string())
    }
}
