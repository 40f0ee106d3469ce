use async_trait::async_trait;
use autocontext_core::error::Result;
use autocontext_core::format::{construct_context, filter_search_results};
use autocontext_core::models::{GenerationConfig, SearchFilters, VectorSearchResult};
use autocontext_core::prompt::{BasicPromptProvider, DEFAULT_SYSTEM_PROMPT, DEFAULT_TASK_PROMPT};
use autocontext_llm::ports::{EmbeddingProvider, LlmProvider};
use autocontext_store::ports::{LoggingConnection, VectorDbProvider};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use super::{PipelineRun, RagComponents, RagPipeline, RagRequest};

/// Output of an AutoContext run
///
/// The search results are already formatted for display when the output is
/// built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoContextRagOutput {
    pub search_results: String,
    pub context: Option<String>,
    pub completion: Option<String>,
}

impl AutoContextRagOutput {
    pub fn new(
        search_results: &[VectorSearchResult],
        context: Option<String>,
        completion: Option<String>,
    ) -> Result<Self> {
        Ok(Self {
            search_results: filter_search_results(search_results)?,
            context,
            completion,
        })
    }
}

/// RAG pipeline over browsing history
///
/// Context is built from the page URL, visit time, title and snippet of each
/// result. `run` only searches; it never asks the language model for a
/// completion.
pub struct AutoContextRagPipeline {
    components: RagComponents,
}

impl AutoContextRagPipeline {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        db: Arc<dyn VectorDbProvider>,
        embedding_model: impl Into<String>,
        embeddings_provider: Arc<dyn EmbeddingProvider>,
        logging_connection: Option<Arc<dyn LoggingConnection>>,
        system_prompt: Option<String>,
        task_prompt: Option<String>,
    ) -> Self {
        let embedding_model = embedding_model.into();
        tracing::debug!(
            embedding_model = %embedding_model,
            llm = llm.provider_name(),
            collection = db.collection_name(),
            logging = logging_connection.is_some(),
            "Initializing `AutoContextRagPipeline`"
        );

        let prompt_provider = BasicPromptProvider::new(
            system_prompt.unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            task_prompt.unwrap_or_else(|| DEFAULT_TASK_PROMPT.to_string()),
        );

        Self {
            components: RagComponents {
                llm,
                db,
                embedding_model,
                embeddings_provider,
                logging_connection,
                prompt_provider: Arc::new(prompt_provider),
            },
        }
    }
}

#[async_trait]
impl RagPipeline for AutoContextRagPipeline {
    type Output = AutoContextRagOutput;

    fn components(&self) -> &RagComponents {
        &self.components
    }

    async fn search(
        &self,
        run: &PipelineRun,
        query: &str,
        filters: &SearchFilters,
        limit: usize,
    ) -> Result<Vec<VectorSearchResult>> {
        tracing::debug!(run_id = %run.id, query, limit, "Retrieving results for query");

        let results = self.similarity_search(query, filters, limit).await?;
        tracing::debug!(run_id = %run.id, count = results.len(), results = ?results, "Retrieved raw results");

        self.log_execution(run, "search", serde_json::to_value(&results)?).await?;
        Ok(results)
    }

    async fn construct_context(
        &self,
        run: &PipelineRun,
        results: &[VectorSearchResult],
    ) -> Result<String> {
        let context = construct_context(results)?;
        self.log_execution(run, "construct_context", Value::String(context.clone())).await?;
        Ok(context)
    }

    async fn run(&self, request: RagRequest) -> Result<AutoContextRagOutput> {
        let generation_config = request.generation_config.unwrap_or_default();
        tracing::debug!(
            model = %generation_config.model,
            search_only = request.search_only,
            "Running AutoContext search"
        );

        let run = self.initialize_pipeline(&request.query, request.search_only).await?;
        let results = self.search(&run, &request.query, &request.filters, request.limit).await?;

        AutoContextRagOutput::new(&results, None, None)
    }
}
