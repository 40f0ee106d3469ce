use async_trait::async_trait;
use autocontext_core::error::{AutoContextError, Result};
use autocontext_core::models::{GenerationConfig, LlmCompletion, Message, TokenUsage};
use serde::{Deserialize, Serialize};

use crate::ports::{EmbeddingProvider, LlmProvider};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Ollama embedding provider
pub struct OllamaEmbeddingProvider {
    /// Base URL for Ollama API (e.g., "http://localhost:11434")
    base_url: String,

    /// Embedding dimensions (model-specific)
    dimension: usize,

    /// HTTP client
    client: reqwest::Client,
}

impl OllamaEmbeddingProvider {
    /// Create a new Ollama embedding provider
    pub fn new(base_url: impl Into<String>, dimension: usize) -> Self {
        Self {
            base_url: base_url.into(),
            dimension,
            client: reqwest::Client::new(),
        }
    }

    /// Create with default localhost URL
    pub fn localhost(dimension: usize) -> Self {
        Self::new(DEFAULT_OLLAMA_URL, dimension)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn get_embeddings(&self, texts: &[&str], model: &str) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for text in texts {
            let request = OllamaEmbedRequest {
                model: model.to_string(),
                prompt: text.to_string(),
            };

            let response = self
                .client
                .post(format!("{}/api/embeddings", self.base_url))
                .json(&request)
                .send()
                .await
                .map_err(|e| AutoContextError::EmbeddingUnavailable {
                    reason: format!("Failed to connect to Ollama: {}", e),
                    remediation: format!(
                        "Ensure Ollama is running at {} and the model '{}' is available. \
                         Run 'ollama pull {}' to download the model.",
                        self.base_url, model, model
                    ),
                })?;

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response.text().await.unwrap_or_default();
                return Err(AutoContextError::EmbeddingUnavailable {
                    reason: format!("Ollama API error ({}): {}", status, error_text),
                    remediation: format!(
                        "Check that the model '{}' is available. Run 'ollama list' to see installed models.",
                        model
                    ),
                });
            }

            let embed_response: OllamaEmbedResponse =
                response.json().await.map_err(|e| AutoContextError::EmbeddingUnavailable {
                    reason: format!("Failed to parse Ollama response: {}", e),
                    remediation: "Check Ollama API compatibility".to_string(),
                })?;

            embeddings.push(embed_response.embedding);
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }
}

/// Ollama chat completion provider
pub struct OllamaLlmProvider {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaLlmProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn localhost() -> Self {
        Self::new(DEFAULT_OLLAMA_URL)
    }
}

#[async_trait]
impl LlmProvider for OllamaLlmProvider {
    async fn get_completion(
        &self,
        messages: &[Message],
        generation_config: &GenerationConfig,
    ) -> Result<LlmCompletion> {
        let request = OllamaChatRequest {
            model: &generation_config.model,
            messages,
            stream: false,
            options: OllamaOptions {
                temperature: generation_config.temperature,
                top_p: generation_config.top_p,
                num_predict: generation_config.max_tokens_to_sample,
            },
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| AutoContextError::LlmUnavailable {
                reason: format!("Failed to connect to Ollama: {}", e),
                remediation: format!(
                    "Ensure Ollama is running at {} and run 'ollama pull {}'",
                    self.base_url, generation_config.model
                ),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AutoContextError::LlmUnavailable {
                reason: format!("Ollama API error ({}): {}", status, error_text),
                remediation: format!(
                    "Check that the model '{}' is available. Run 'ollama list' to see installed models.",
                    generation_config.model
                ),
            });
        }

        let chat: OllamaChatResponse =
            response.json().await.map_err(|e| AutoContextError::LlmUnavailable {
                reason: format!("Failed to parse Ollama response: {}", e),
                remediation: "Check Ollama API compatibility".to_string(),
            })?;

        let usage = match (chat.prompt_eval_count, chat.eval_count) {
            (Some(prompt), Some(completion)) => Some(TokenUsage {
                prompt_tokens: prompt,
                completion_tokens: completion,
                total_tokens: prompt + completion,
            }),
            _ => None,
        };

        Ok(LlmCompletion {
            content: chat.message.content,
            model: chat.model.unwrap_or_else(|| generation_config.model.clone()),
            usage,
        })
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }
}

/// Request body for Ollama embeddings API
#[derive(Debug, Serialize)]
struct OllamaEmbedRequest {
    model: String,
    prompt: String,
}

/// Response from Ollama embeddings API
#[derive(Debug, Deserialize)]
struct OllamaEmbedResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    model: Option<String>,
    message: OllamaChatMessage,
    prompt_eval_count: Option<u32>,
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaChatMessage {
    content: String,
}
