/// AI providers for task summaries and embeddings
///
/// Two capabilities are needed when a task is written or searched:
///
/// - a **summary** of the description in five words or less
/// - an **embedding** of the task text, a vector of [`EMBEDDING_DIMENSIONS`]
///   floats used for cosine-similarity search
///
/// Each capability is a trait with a remote implementation (Groq for
/// summaries, Gemini for embeddings) and a deterministic mock used by tests
/// and offline development.
///
/// # Failure
///
/// Provider calls are made once. Transport errors, non-2xx responses,
/// malformed bodies and vectors of the wrong length all surface as
/// [`AiError`]; nothing is persisted when a provider fails.
///
/// # Example
///
/// ```no_run
/// use taskmind_shared::ai::AiProviders;
///
/// # async fn example() -> Result<(), taskmind_shared::ai::AiError> {
/// let ai = AiProviders::mock();
///
/// let summary = ai.summarize("get milk when i get out of work").await?;
/// let embedding = ai.embed("groceries: get milk").await?;
/// assert_eq!(embedding.len(), 768);
/// # Ok(())
/// # }
/// ```

pub mod gemini;
pub mod groq;
pub mod mock;

pub use gemini::GeminiEmbeddingProvider;
pub use groq::GroqSummaryProvider;
pub use mock::{MockEmbeddingProvider, MockSummaryProvider};

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Length of every stored and query embedding
pub const EMBEDDING_DIMENSIONS: usize = 768;

/// Summary stored for tasks with an empty description
pub const NO_DESCRIPTION_SUMMARY: &str = "No description";

/// Timeout applied to every provider request
pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

/// AI provider errors
#[derive(Debug, thiserror::Error)]
pub enum AiError {
    /// Provider is missing required configuration
    #[error("AI provider not configured: {0}")]
    NotConfigured(String),

    /// Request could not be sent or timed out
    #[error("AI provider request failed: {0}")]
    Request(String),

    /// Provider answered with a non-success status
    #[error("AI provider returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Provider answered with a body we could not use
    #[error("Malformed AI provider response: {0}")]
    InvalidResponse(String),

    /// Embedding has the wrong number of dimensions
    #[error("Embedding has {actual} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        // reqwest includes the URL in its message; strip it
        AiError::Request(err.without_url().to_string())
    }
}

/// AI result type alias
pub type AiResult<T> = Result<T, AiError>;

/// Produces embeddings for text
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Provider name, for logs
    fn name(&self) -> &str;

    /// Model identifier
    fn model(&self) -> &str;

    /// Embeds `text` into a vector of [`EMBEDDING_DIMENSIONS`] floats
    async fn embed(&self, text: &str) -> AiResult<Vec<f32>>;
}

/// Produces short summaries of task descriptions
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    /// Provider name, for logs
    fn name(&self) -> &str;

    /// Model identifier
    fn model(&self) -> &str;

    /// Summarizes `text` in five words or less
    async fn summarize(&self, text: &str) -> AiResult<String>;
}

/// Builds the HTTP client shared by remote providers
pub fn http_client() -> AiResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECONDS))
        .build()
        .map_err(AiError::from)
}

/// Rejects vectors that are not exactly [`EMBEDDING_DIMENSIONS`] long
pub fn check_dimensions(embedding: Vec<f32>) -> AiResult<Vec<f32>> {
    if embedding.len() != EMBEDDING_DIMENSIONS {
        return Err(AiError::DimensionMismatch {
            expected: EMBEDDING_DIMENSIONS,
            actual: embedding.len(),
        });
    }
    Ok(embedding)
}

/// The pair of providers used by the task service
#[derive(Clone)]
pub struct AiProviders {
    embedder: Arc<dyn EmbeddingProvider>,
    summarizer: Arc<dyn SummaryProvider>,
}

impl fmt::Debug for AiProviders {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiProviders")
            .field("embedder", &self.embedder.name())
            .field("summarizer", &self.summarizer.name())
            .finish()
    }
}

impl AiProviders {
    /// Bundles an embedding provider and a summary provider
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        summarizer: Arc<dyn SummaryProvider>,
    ) -> Self {
        Self {
            embedder,
            summarizer,
        }
    }

    /// Deterministic offline providers
    pub fn mock() -> Self {
        Self::new(
            Arc::new(MockEmbeddingProvider::new()),
            Arc::new(MockSummaryProvider::new()),
        )
    }

    /// Name of the embedding provider
    pub fn embedder_name(&self) -> &str {
        self.embedder.name()
    }

    /// Name of the summary provider
    pub fn summarizer_name(&self) -> &str {
        self.summarizer.name()
    }

    /// Embeds text and checks the vector length
    pub async fn embed(&self, text: &str) -> AiResult<Vec<f32>> {
        let embedding = self.embedder.embed(text).await?;
        check_dimensions(embedding)
    }

    /// Summarizes a description
    ///
    /// A blank description yields [`NO_DESCRIPTION_SUMMARY`] without calling
    /// the provider.
    pub async fn summarize(&self, description: &str) -> AiResult<String> {
        if description.trim().is_empty() {
            return Ok(NO_DESCRIPTION_SUMMARY.to_string());
        }
        self.summarizer.summarize(description).await
    }
}
