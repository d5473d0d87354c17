/// Google Gemini embedding provider
///
/// Calls `POST {base_url}/models/{model}:embedContent` with the document
/// retrieval task type and an output size of [`EMBEDDING_DIMENSIONS`]. The
/// API key travels in the `x-goog-api-key` header.

use crate::ai::{AiError, AiResult, EmbeddingProvider, EMBEDDING_DIMENSIONS};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default embedding model
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-embedding-001";

/// Default API base URL
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini embedContent client
pub struct GeminiEmbeddingProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiEmbeddingProvider")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiEmbeddingProvider {
    /// Creates a provider
    ///
    /// # Errors
    ///
    /// Returns `AiError::NotConfigured` if the API key is empty.
    pub fn new(client: Client, api_key: String, model: Option<String>) -> AiResult<Self> {
        if api_key.trim().is_empty() {
            return Err(AiError::NotConfigured("GEMINI_API_KEY is not set".to_string()));
        }

        Ok(Self {
            client,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
        })
    }

    /// Overrides the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:embedContent", self.base_url, self.model)
    }

    fn request(&self, text: &str) -> GeminiEmbedRequest {
        GeminiEmbedRequest {
            model: format!("models/{}", self.model),
            content: GeminiContent {
                parts: vec![GeminiPart {
                    text: text.to_string(),
                }],
            },
            task_type: "RETRIEVAL_DOCUMENT",
            output_dimensionality: EMBEDDING_DIMENSIONS,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiEmbedRequest {
    model: String,
    content: GeminiContent,
    task_type: &'static str,
    output_dimensionality: usize,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Deserialize)]
struct GeminiEmbedResponse {
    embedding: GeminiEmbedding,
}

#[derive(Deserialize)]
struct GeminiEmbedding {
    values: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbeddingProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> AiResult<Vec<f32>> {
        debug!(model = %self.model, chars = text.len(), "Requesting Gemini embedding");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request(text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".into());
            return Err(AiError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let result: GeminiEmbedResponse = response
            .json()
            .await
            .map_err(|e| AiError::InvalidResponse(e.without_url().to_string()))?;

        Ok(result.embedding.values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> GeminiEmbeddingProvider {
        GeminiEmbeddingProvider::new(Client::new(), "key".into(), None).unwrap()
    }

    #[test]
    fn test_gemini_request_serialization() {
        let json = serde_json::to_value(provider().request("groceries: get milk")).unwrap();

        assert_eq!(json["model"], "models/gemini-embedding-001");
        assert_eq!(json["content"]["parts"][0]["text"], "groceries: get milk");
        assert_eq!(json["taskType"], "RETRIEVAL_DOCUMENT");
        assert_eq!(json["outputDimensionality"], 768);
    }

    #[test]
    fn test_gemini_response_deserialization() {
        let json = r#"{"embedding": {"values": [0.1, 0.2, 0.3]}}"#;
        let resp: GeminiEmbedResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.embedding.values, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_gemini_defaults() {
        let provider = provider();
        assert_eq!(provider.model, DEFAULT_GEMINI_MODEL);
        assert_eq!(
            provider.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-embedding-001:embedContent"
        );
    }

    #[test]
    fn test_gemini_base_url_override() {
        let provider = provider().with_base_url("http://localhost:9000/");
        assert_eq!(
            provider.endpoint(),
            "http://localhost:9000/models/gemini-embedding-001:embedContent"
        );
    }

    #[test]
    fn test_gemini_requires_key() {
        let err = GeminiEmbeddingProvider::new(Client::new(), "  ".into(), None).unwrap_err();
        assert!(matches!(err, AiError::NotConfigured(_)));
    }

    #[test]
    fn test_gemini_debug_hides_key() {
        let provider =
            GeminiEmbeddingProvider::new(Client::new(), "super-secret".into(), None).unwrap();
        assert!(!format!("{:?}", provider).contains("super-secret"));
    }
}
