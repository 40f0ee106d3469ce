//! LLM port definitions

use async_trait::async_trait;
use autocontext_core::error::{AutoContextError, Result};
use autocontext_core::models::{GenerationConfig, LlmCompletion, Message};

/// Port for embedding text into vector representations
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for a batch of texts
    ///
    /// # Arguments
    /// * `texts` - Slice of text strings to embed
    /// * `model` - Name of the embedding model
    ///
    /// # Returns
    /// Vector of embedding vectors, one per input text
    async fn get_embeddings(&self, texts: &[&str], model: &str) -> Result<Vec<Vec<f32>>>;

    /// Embed a single text
    async fn get_embedding(&self, text: &str, model: &str) -> Result<Vec<f32>> {
        self.get_embeddings(&[text], model)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AutoContextError::Embedding("Provider returned no embedding".to_string()))
    }

    /// Get the dimensionality of embeddings produced by this provider
    fn dimension(&self) -> usize;

    /// Short provider identifier used in logs
    fn provider_name(&self) -> &str;
}

/// Port for text generation
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for a chat transcript
    async fn get_completion(
        &self,
        messages: &[Message],
        generation_config: &GenerationConfig,
    ) -> Result<LlmCompletion>;

    fn provider_name(&self) -> &str;
}
