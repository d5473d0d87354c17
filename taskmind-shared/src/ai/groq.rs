/// Groq summary provider (OpenAI-compatible chat completions)

use crate::ai::{AiError, AiResult, SummaryProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default chat model
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";

/// Default API base URL
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

const TEMPERATURE: f32 = 0.3;
const MAX_TOKENS: u32 = 10;

const SYSTEM_PROMPT: &str = "You are a specialized task summarization tool, not a chatbot. \
Your ONLY job is to output a summary of the user's input in 5 words or less. \
Rules:\n\
1. Do NOT answer questions or search for products.\n\
2. If the input is short (e.g. 'milk'), just return 'Buy milk'.\n\
3. If the input is vague, summarize it literally.\n\
4. NEVER say 'no description provided' or 'I cannot summarize'. \
Just return the input itself if you are unsure.";

/// Groq chat completions client
pub struct GroqSummaryProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl std::fmt::Debug for GroqSummaryProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqSummaryProvider")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GroqSummaryProvider {
    /// Creates a provider
    ///
    /// # Errors
    ///
    /// Returns `AiError::NotConfigured` if the API key is empty.
    pub fn new(client: Client, api_key: String, model: Option<String>) -> AiResult<Self> {
        if api_key.trim().is_empty() {
            return Err(AiError::NotConfigured("GROQ_API_KEY is not set".to_string()));
        }

        Ok(Self {
            client,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string()),
            base_url: DEFAULT_GROQ_BASE_URL.to_string(),
        })
    }

    /// Overrides the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn request<'a>(&'a self, text: &str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("Task description: {}", text),
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

impl ChatResponse {
    fn into_summary(self) -> AiResult<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| AiError::InvalidResponse("no completion in response".to_string()))
    }
}

#[async_trait]
impl SummaryProvider for GroqSummaryProvider {
    fn name(&self) -> &str {
        "groq"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn summarize(&self, text: &str) -> AiResult<String> {
        debug!(model = %self.model, chars = text.len(), "Requesting Groq summary");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&self.request(text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| AiError::InvalidResponse(e.without_url().to_string()))?;

        result.into_summary()
    }
}
