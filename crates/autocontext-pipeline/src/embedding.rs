use autocontext_core::error::{AutoContextError, Result};
use autocontext_llm::ports::EmbeddingProvider;
use std::sync::Arc;

/// Pipeline for generating embeddings from text chunks in batches
pub struct EmbeddingPipeline {
    provider: Arc<dyn EmbeddingProvider>,
    model: String,
    batch_size: usize,
}

impl EmbeddingPipeline {
    /// Create a new embedding pipeline with the specified provider, model and batch size
    pub fn new(provider: Arc<dyn EmbeddingProvider>, model: impl Into<String>, batch_size: usize) -> Self {
        Self {
            provider,
            model: model.into(),
            batch_size: batch_size.max(1),
        }
    }

    /// Get the embedding model name
    pub fn model_name(&self) -> &str {
        &self.model
    }

    /// Get the embedding dimension
    pub fn dimension(&self) -> usize {
        self.provider.dimension()
    }

    /// Generate embeddings for all chunks with progress callback
    ///
    /// `progress` receives `(processed, total)` after every batch.
    pub async fn embed_chunks<F>(&self, chunks: &[String], mut progress: F) -> Result<Vec<Vec<f32>>>
    where
        F: FnMut(usize, usize) + Send,
    {
        let total = chunks.len();
        let mut all_embeddings = Vec::with_capacity(total);

        // Process chunks in batches
        for chunk_batch in chunks.chunks(self.batch_size) {
            let texts: Vec<&str> = chunk_batch.iter().map(String::as_str).collect();

            let vectors = self.provider.get_embeddings(&texts, &self.model).await?;
            if vectors.len() != texts.len() {
                return Err(AutoContextError::Embedding(format!(
                    "Provider '{}' returned {} embeddings for {} inputs",
                    self.provider.provider_name(),
                    vectors.len(),
                    texts.len()
                )));
            }

            all_embeddings.extend(vectors);

            // Report progress
            progress(all_embeddings.len(), total);
        }

        Ok(all_embeddings)
    }
}
