//! OpenAI-compatible embedding and chat completion providers.
//!
//! Works against api.openai.com and any endpoint that follows the same
//! `/v1/embeddings` and `/v1/chat/completions` request format.

use async_trait::async_trait;
use autocontext_core::error::{AutoContextError, Result};
use autocontext_core::models::{GenerationConfig, LlmCompletion, Message, TokenUsage};
use serde::{Deserialize, Serialize};

use crate::ports::{EmbeddingProvider, LlmProvider};

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com";

/// OpenAI embedding provider
pub struct OpenAiEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    dimension: usize,
}

impl OpenAiEmbeddingProvider {
    pub fn new(api_key: impl Into<String>, base_url: Option<String>, dimension: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string()),
            api_key: api_key.into(),
            dimension,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn get_embeddings(&self, texts: &[&str], model: &str) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest { model, input: texts };
        let response = self
            .client
            .post(format!("{}/v1/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AutoContextError::EmbeddingUnavailable {
                reason: format!("Failed to reach {}: {}", self.base_url, e),
                remediation: "Check network access and the embedding base_url".to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AutoContextError::EmbeddingUnavailable {
                reason: format!("OpenAI API error ({}): {}", status, error_text),
                remediation: format!(
                    "Verify OPENAI_API_KEY and that the model '{}' exists",
                    model
                ),
            });
        }

        let body: EmbeddingResponse =
            response.json().await.map_err(|e| AutoContextError::EmbeddingUnavailable {
                reason: format!("Failed to parse embedding response: {}", e),
                remediation: "Check OpenAI API compatibility".to_string(),
            })?;

        Ok(body.into_ordered_vectors())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

/// OpenAI chat completion provider
pub struct OpenAiLlmProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenAiLlmProvider {
    pub fn new(api_key: impl Into<String>, base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.unwrap_or_else(|| DEFAULT_OPENAI_URL.to_string()),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiLlmProvider {
    async fn get_completion(
        &self,
        messages: &[Message],
        generation_config: &GenerationConfig,
    ) -> Result<LlmCompletion> {
        let request = ChatRequest {
            model: &generation_config.model,
            messages,
            temperature: generation_config.temperature,
            top_p: generation_config.top_p,
            max_tokens: generation_config.max_tokens_to_sample,
            stream: false,
        };

        tracing::debug!(model = %generation_config.model, messages = messages.len(), "Requesting chat completion");

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| AutoContextError::LlmUnavailable {
                reason: format!("Failed to reach {}: {}", self.base_url, e),
                remediation: "Check network access and the language_model base_url".to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AutoContextError::LlmUnavailable {
                reason: format!("OpenAI API error ({}): {}", status, error_text),
                remediation: format!(
                    "Verify OPENAI_API_KEY and that the model '{}' exists",
                    generation_config.model
                ),
            });
        }

        let body: ChatResponse =
            response.json().await.map_err(|e| AutoContextError::LlmUnavailable {
                reason: format!("Failed to parse chat response: {}", e),
                remediation: "Check OpenAI API compatibility".to_string(),
            })?;

        body.into_completion(&generation_config.model)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl EmbeddingResponse {
    /// Vectors in input order; the API tags each one with its input index
    fn into_ordered_vectors(mut self) -> Vec<Vec<f32>> {
        self.data.sort_by_key(|d| d.index);
        self.data.into_iter().map(|d| d.embedding).collect()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: Option<String>,
    choices: Vec<ChatChoice>,
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn into_completion(self, requested_model: &str) -> Result<LlmCompletion> {
        let choice = self.choices.into_iter().next().ok_or_else(|| {
            AutoContextError::LlmUnavailable {
                reason: "Chat response contained no choices".to_string(),
                remediation: "Retry the request or try a different model".to_string(),
            }
        })?;

        Ok(LlmCompletion {
            content: choice.message.content.unwrap_or_default(),
            model: self.model.unwrap_or_else(|| requested_model.to_string()),
            usage: self.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_response_is_reordered_by_index() {
        let body = r#"{"object":"list","data":[
            {"object":"embedding","index":1,"embedding":[0.0,1.0]},
            {"object":"embedding","index":0,"embedding":[1.0,0.0]}
        ],"model":"text-embedding-3-small"}"#;

        let parsed: EmbeddingResponse = serde_json::from_str(body).unwrap();
        let vectors = parsed.into_ordered_vectors();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_chat_response_to_completion() {
        let body = r#"{"id":"x","model":"gpt-3.5-turbo-0125","choices":[
            {"index":0,"message":{"role":"assistant","content":"See [1]."},"finish_reason":"stop"}
        ],"usage":{"prompt_tokens":10,"completion_tokens":3,"total_tokens":13}}"#;

        let parsed: ChatResponse = serde_json::from_str(body).unwrap();
        let completion = parsed.into_completion("gpt-3.5-turbo").unwrap();
        assert_eq!(completion.content, "See [1].");
        assert_eq!(completion.model, "gpt-3.5-turbo-0125");
        assert_eq!(completion.usage.unwrap().total_tokens, 13);
    }

    #[test]
    fn test_chat_response_without_choices_is_an_error() {
        let parsed: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(parsed.into_completion("gpt-3.5-turbo").is_err());
    }

    #[test]
    fn test_provider_defaults_to_openai_url() {
        let provider = OpenAiEmbeddingProvider::new("sk-test", None, 1536);
        assert_eq!(provider.base_url, DEFAULT_OPENAI_URL);
        assert_eq!(provider.dimension(), 1536);
    }

    #[tokio::test]
    async fn test_empty_batch_skips_request() {
        let provider =
            OpenAiEmbeddingProvider::new("sk-test", Some("http://127.0.0.1:9".to_string()), 3);
        let vectors = provider.get_embeddings(&[], "text-embedding-3-small").await.unwrap();
        assert!(vectors.is_empty());
    }
}
