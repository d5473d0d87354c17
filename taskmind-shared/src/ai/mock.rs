/// Mock providers for tests and offline development
///
/// Both providers are deterministic and never touch the network.
///
/// `MockEmbeddingProvider` hashes each lowercase word into one of
/// [`EMBEDDING_DIMENSIONS`] buckets and L2-normalises the counts, so texts
/// that share words have a small cosine distance and unrelated texts are
/// orthogonal. It is a bag-of-words model, not a semantic one.
///
/// `MockSummaryProvider` returns the first five words of the text.

use crate::ai::{AiResult, EmbeddingProvider, SummaryProvider, EMBEDDING_DIMENSIONS};
use async_trait::async_trait;
use sha2::{Digest, Sha256};

/// Words kept by the mock summary
const SUMMARY_WORDS: usize = 5;

/// Bag-of-words hashing embedder
#[derive(Debug, Clone, Copy, Default)]
pub struct MockEmbeddingProvider;

impl MockEmbeddingProvider {
    pub fn new() -> Self {
        Self
    }

    fn bucket(word: &str) -> usize {
        let digest = Sha256::digest(word.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        (u64::from_be_bytes(prefix) % EMBEDDING_DIMENSIONS as u64) as usize
    }

    fn hash_text(text: &str) -> Vec<f32> {
        let mut vec = vec![0.0f32; EMBEDDING_DIMENSIONS];

        for word in words(text) {
            vec[Self::bucket(&word)] += 1.0;
        }

        let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vec {
                *v /= norm;
            }
        } else {
            // No words at all; a zero vector has no cosine distance
            vec[0] = 1.0;
        }
        vec
    }
}

/// Lowercase alphanumeric words of `text`
fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    fn name(&self) -> &str {
        "mock-hash"
    }

    fn model(&self) -> &str {
        "hash-bow-768d"
    }

    async fn embed(&self, text: &str) -> AiResult<Vec<f32>> {
        Ok(Self::hash_text(text))
    }
}

/// First-five-words summarizer
#[derive(Debug, Clone, Copy, Default)]
pub struct MockSummaryProvider;

impl MockSummaryProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SummaryProvider for MockSummaryProvider {
    fn name(&self) -> &str {
        "mock-first-words"
    }

    fn model(&self) -> &str {
        "first-words"
    }

    async fn summarize(&self, text: &str) -> AiResult<String> {
        Ok(text
            .split_whitespace()
            .take(SUMMARY_WORDS)
            .collect::<Vec<_>>()
            .join(" "))
    }
}
