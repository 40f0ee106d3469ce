//! Retrieval-augmented generation pipelines
//!
//! [`RagPipeline`] describes the step flow of one query run. Every step has a
//! default implementation, so a concrete pipeline only overrides the steps it
//! shapes differently and provides `run`.

mod autocontext;

pub use autocontext::{AutoContextRagOutput, AutoContextRagPipeline};

use async_trait::async_trait;
use autocontext_core::error::Result;
use autocontext_core::format::basic_context;
use autocontext_core::models::{
    GenerationConfig, LlmCompletion, LogEntry, Message, PipelineType, SearchFilters,
    VectorSearchResult,
};
use autocontext_core::prompt::PromptProvider;
use autocontext_llm::ports::{EmbeddingProvider, LlmProvider};
use autocontext_store::ports::{LoggingConnection, VectorDbProvider};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Default number of results returned by a search
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Providers shared by every RAG pipeline
#[derive(Clone)]
pub struct RagComponents {
    pub llm: Arc<dyn LlmProvider>,
    pub db: Arc<dyn VectorDbProvider>,
    pub embedding_model: String,
    pub embeddings_provider: Arc<dyn EmbeddingProvider>,
    pub logging_connection: Option<Arc<dyn LoggingConnection>>,
    pub prompt_provider: Arc<dyn PromptProvider>,
}

/// Identity of one pipeline invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineRun {
    pub id: Uuid,
    pub query: String,
    pub search_only: bool,
}

/// Arguments of a RAG run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagRequest {
    pub query: String,
    #[serde(default)]
    pub filters: SearchFilters,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default = "default_search_only")]
    pub search_only: bool,
    #[serde(default)]
    pub generation_config: Option<GenerationConfig>,
}

fn default_limit() -> usize {
    DEFAULT_SEARCH_LIMIT
}

fn default_search_only() -> bool {
    true
}

impl RagRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            filters: SearchFilters::new(),
            limit: DEFAULT_SEARCH_LIMIT,
            search_only: true,
            generation_config: None,
        }
    }

    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_search_only(mut self, search_only: bool) -> Self {
        self.search_only = search_only;
        self
    }

    pub fn with_generation_config(mut self, generation_config: GenerationConfig) -> Self {
        self.generation_config = Some(generation_config);
        self
    }
}

/// Output of the basic pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagPipelineOutput {
    pub search_results: Vec<VectorSearchResult>,
    pub context: Option<String>,
    pub completion: Option<LlmCompletion>,
}

/// Step flow of a retrieval-augmented generation run
#[async_trait]
pub trait RagPipeline: Send + Sync {
    type Output: Serialize + Send;

    fn components(&self) -> &RagComponents;

    /// Execute a full run
    async fn run(&self, request: RagRequest) -> Result<Self::Output>;

    /// Start a run and record the query
    async fn initialize_pipeline(&self, query: &str, search_only: bool) -> Result<PipelineRun> {
        let run = PipelineRun {
            id: Uuid::new_v4(),
            query: query.to_string(),
            search_only,
        };
        self.log_execution(&run, "query", json!({ "query": query, "search_only": search_only }))
            .await?;
        Ok(run)
    }

    async fn transform_query(&self, query: &str) -> Result<String> {
        Ok(query.to_string())
    }

    /// Embed the query and ask the vector database for the nearest entries
    async fn similarity_search(
        &self,
        query: &str,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<VectorSearchResult>> {
        let components = self.components();
        let query_vector = components
            .embeddings_provider
            .get_embedding(query, &components.embedding_model)
            .await?;
        components.db.search(&query_vector, filters, limit).await
    }

    async fn search(
        &self,
        run: &PipelineRun,
        query: &str,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<VectorSearchResult>> {
        let results = self.similarity_search(query, filters, limit).await?;
        self.log_execution(run, "search", serde_json::to_value(&results)?).await?;
        Ok(results)
    }

    async fn rerank_results(
        &self,
        results: Vec<VectorSearchResult>,
    ) -> Result<Vec<VectorSearchResult>> {
        Ok(results)
    }

    async fn construct_context(
        &self,
        run: &PipelineRun,
        results: &[VectorSearchResult],
    ) -> Result<String> {
        let context = basic_context(results);
        self.log_execution(run, "construct_context", Value::String(context.clone())).await?;
        Ok(context)
    }

    fn construct_prompt(&self, query: &str, context: &str) -> String {
        self.components().prompt_provider.render_task_prompt(query, context)
    }

    /// Send the system prompt and the rendered task prompt to the language model
    async fn generate_completion(
        &self,
        run: &PipelineRun,
        prompt: &str,
        generation_config: &GenerationConfig,
    ) -> Result<LlmCompletion> {
        let components = self.components();
        let messages = vec![
            Message::system(components.prompt_provider.system_prompt()),
            Message::user(prompt),
        ];
        let completion = components.llm.get_completion(&messages, generation_config).await?;
        self.log_execution(run, "generate_completion", serde_json::to_value(&completion)?)
            .await?;
        Ok(completion)
    }

    /// Record a step result when a logging connection is configured
    async fn log_execution(&self, run: &PipelineRun, method: &str, result: Value) -> Result<()> {
        match &self.components().logging_connection {
            Some(connection) => {
                connection
                    .log(LogEntry::new(run.id, PipelineType::Rag, method, result))
                    .await
            }
            None => Ok(()),
        }
    }
}

/// Pipeline running the whole search, context and completion flow
pub struct BasicRagPipeline {
    components: RagComponents,
    generation_model: String,
}

impl BasicRagPipeline {
    pub fn new(components: RagComponents, generation_model: impl Into<String>) -> Self {
        Self {
            components,
            generation_model: generation_model.into(),
        }
    }
}

#[async_trait]
impl RagPipeline for BasicRagPipeline {
    type Output = RagPipelineOutput;

    fn components(&self) -> &RagComponents {
        &self.components
    }

    async fn run(&self, request: RagRequest) -> Result<RagPipelineOutput> {
        let run = self.initialize_pipeline(&request.query, request.search_only).await?;
        tracing::debug!(run_id = %run.id, limit = request.limit, "Starting RAG run");

        let query = self.transform_query(&request.query).await?;
        let results = self.search(&run, &query, &request.filters, request.limit).await?;
        let results = self.rerank_results(results).await?;

        if request.search_only {
            return Ok(RagPipelineOutput {
                search_results: results,
                context: None,
                completion: None,
            });
        }

        let context = self.construct_context(&run, &results).await?;
        let prompt = self.construct_prompt(&query, &context);
        let generation_config = request
            .generation_config
            .unwrap_or_else(|| GenerationConfig::new(self.generation_model.clone()));
        let completion = self.generate_completion(&run, &prompt, &generation_config).await?;

        Ok(RagPipelineOutput {
            search_results: results,
            context: Some(context),
            completion: Some(completion),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autocontext_core::prompt::BasicPromptProvider;
    use autocontext_store::{MemoryLoggingConnection, MemoryVectorDb};
    use autocontext_core::models::{Metadata, VectorEntry};
    use std::sync::Mutex;

    struct FixedEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn get_embeddings(&self, texts: &[&str], _model: &str) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![1.0, 0.0]).collect())
        }

        fn dimension(&self) -> usize {
            2
        }

        fn provider_name(&self) -> &str {
            "fixed"
        }
    }

    /// Echoes the user prompt back and remembers the model it was asked for
    #[derive(Default)]
    struct EchoLlm {
        models: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LlmProvider for EchoLlm {
        async fn get_completion(
            &self,
            messages: &[Message],
            generation_config: &GenerationConfig,
        ) -> Result<LlmCompletion> {
            self.models.lock().unwrap().push(generation_config.model.clone());
            Ok(LlmCompletion {
                content: messages.last().map(|m| m.content.clone()).unwrap_or_default(),
                model: generation_config.model.clone(),
                usage: None,
            })
        }

        fn provider_name(&self) -> &str {
            "echo"
        }
    }

    fn metadata(value: Value) -> Metadata {
        value.as_object().cloned().unwrap()
    }

    async fn pipeline() -> (BasicRagPipeline, Arc<EchoLlm>, Arc<MemoryLoggingConnection>) {
        let db = Arc::new(MemoryVectorDb::new("test"));
        db.initialize_collection(2).await.unwrap();
        db.upsert(&[
            VectorEntry::new(Uuid::new_v4(), vec![1.0, 0.0], metadata(json!({"text": "rust ownership"}))),
            VectorEntry::new(Uuid::new_v4(), vec![0.0, 1.0], metadata(json!({"text": "cooking pasta"}))),
        ])
        .await
        .unwrap();

        let llm = Arc::new(EchoLlm::default());
        let logs = Arc::new(MemoryLoggingConnection::new(100));
        let components = RagComponents {
            llm: llm.clone(),
            db,
            embedding_model: "test-embed".to_string(),
            embeddings_provider: Arc::new(FixedEmbedder),
            logging_connection: Some(logs.clone()),
            prompt_provider: Arc::new(BasicPromptProvider::new("system", "Q={query}\nC={context}")),
        };
        (BasicRagPipeline::new(components, "test-model"), llm, logs)
    }

    #[tokio::test]
    async fn test_search_only_skips_generation() {
        let (pipeline, llm, _) = pipeline().await;

        let output = pipeline.run(RagRequest::new("ownership").with_limit(1)).await.unwrap();

        assert_eq!(output.search_results.len(), 1);
        assert!(output.context.is_none());
        assert!(output.completion.is_none());
        assert!(llm.models.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_full_run_builds_prompt_from_context() {
        let (pipeline, llm, logs) = pipeline().await;

        let request = RagRequest::new("ownership").with_search_only(false);
        let output = pipeline.run(request).await.unwrap();

        let context = output.context.unwrap();
        assert_eq!(context, "[1] rust ownership\n\n[2] cooking pasta");
        let completion = output.completion.unwrap();
        assert_eq!(completion.content, format!("Q=ownership\nC={}", context));
        assert_eq!(*llm.models.lock().unwrap(), vec!["test-model".to_string()]);

        let methods: Vec<String> =
            logs.get_logs(10).await.unwrap().into_iter().map(|e| e.method).collect();
        assert_eq!(methods, vec!["generate_completion", "construct_context", "search", "query"]);
    }

    #[tokio::test]
    async fn test_request_generation_config_wins() {
        let (pipeline, llm, _) = pipeline().await;

        let request = RagRequest::new("ownership")
            .with_search_only(false)
            .with_generation_config(GenerationConfig::new("other-model"));
        pipeline.run(request).await.unwrap();

        assert_eq!(*llm.models.lock().unwrap(), vec!["other-model".to_string()]);
    }

    #[test]
    fn test_request_defaults_from_json() {
        let request: RagRequest = serde_json::from_value(json!({"query": "rust"})).unwrap();
        assert_eq!(request, RagRequest::new("rust"));
        assert_eq!(request.limit, 5);
        assert!(request.search_only);
    }
}
