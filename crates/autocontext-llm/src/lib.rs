//! AutoContext LLM - Embedding and generation ports
//!
//! This crate defines the ports for embedding and text generation,
//! along with OpenAI and Ollama adapter implementations.

pub mod ollama;
pub mod openai;
pub mod ports;

// Re-export main types
pub use ollama::{OllamaEmbeddingProvider, OllamaLlmProvider};
pub use openai::{OpenAiEmbeddingProvider, OpenAiLlmProvider};
pub use ports::{EmbeddingProvider, LlmProvider};
