//! Assembly of pipelines from configuration

use autocontext_core::config::PipelineConfig;
use autocontext_core::error::{AutoContextError, Result};
use autocontext_core::prompt::BasicPromptProvider;
use autocontext_llm::ollama::DEFAULT_OLLAMA_URL;
use autocontext_llm::{
    EmbeddingProvider, LlmProvider, OllamaEmbeddingProvider, OllamaLlmProvider,
    OpenAiEmbeddingProvider, OpenAiLlmProvider,
};
use autocontext_store::{
    JsonlLoggingConnection, LoggingConnection, MemoryLoggingConnection, MemoryVectorDb,
    PgVectorConfig, PgVectorDb, VectorDbProvider,
};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::chunk::TextSplitter;
use crate::ingestion::{
    AutoContextIngestionPipeline, BasicIngestionPipeline, IngestionComponents, IngestionPipeline,
};
use crate::rag::{
    AutoContextRagOutput, AutoContextRagPipeline, BasicRagPipeline, RagComponents, RagPipeline,
    RagPipelineOutput, RagRequest,
};

/// Which RAG pipeline the factory builds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RagImpl {
    Basic,
    AutoContext,
}

/// Which ingestion pipeline the factory builds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionImpl {
    Basic,
    AutoContext,
}

impl FromStr for RagImpl {
    type Err = AutoContextError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(RagImpl::Basic),
            "autocontext" => Ok(RagImpl::AutoContext),
            other => Err(AutoContextError::ConfigInvalid {
                key: "rag_impl".to_string(),
                reason: format!("Unknown RAG pipeline '{}'. Use basic or autocontext", other),
            }),
        }
    }
}

impl fmt::Display for RagImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RagImpl::Basic => write!(f, "basic"),
            RagImpl::AutoContext => write!(f, "autocontext"),
        }
    }
}

/// A RAG pipeline of either kind
pub enum AnyRagPipeline {
    Basic(BasicRagPipeline),
    AutoContext(AutoContextRagPipeline),
}

/// Output of [`AnyRagPipeline::run`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RagOutput {
    Basic(RagPipelineOutput),
    AutoContext(AutoContextRagOutput),
}

impl AnyRagPipeline {
    pub async fn run(&self, request: RagRequest) -> Result<RagOutput> {
        match self {
            AnyRagPipeline::Basic(pipeline) => pipeline.run(request).await.map(RagOutput::Basic),
            AnyRagPipeline::AutoContext(pipeline) => {
                pipeline.run(request).await.map(RagOutput::AutoContext)
            }
        }
    }

    pub fn kind(&self) -> RagImpl {
        match self {
            AnyRagPipeline::Basic(_) => RagImpl::Basic,
            AnyRagPipeline::AutoContext(_) => RagImpl::AutoContext,
        }
    }

    pub fn components(&self) -> &RagComponents {
        match self {
            AnyRagPipeline::Basic(pipeline) => pipeline.components(),
            AnyRagPipeline::AutoContext(pipeline) => pipeline.components(),
        }
    }
}

/// Providers a pipeline bundle is assembled from
#[derive(Clone)]
pub struct Providers {
    pub embedding: Arc<dyn EmbeddingProvider>,
    pub llm: Arc<dyn LlmProvider>,
    pub vector_db: Arc<dyn VectorDbProvider>,
    pub logging: Option<Arc<dyn LoggingConnection>>,
}

/// Everything the application needs to serve queries and ingest documents
#[derive(Clone)]
pub struct Pipelines {
    pub rag: Arc<AnyRagPipeline>,
    pub ingestion: Arc<dyn IngestionPipeline>,
    pub vector_db: Arc<dyn VectorDbProvider>,
    pub logging: Option<Arc<dyn LoggingConnection>>,
    pub config: PipelineConfig,
}

pub struct PipelineFactory;

impl PipelineFactory {
    /// Build providers from configuration and assemble the pipelines
    pub async fn create_pipeline(
        config: &PipelineConfig,
        rag_impl: RagImpl,
        ingestion_impl: IngestionImpl,
    ) -> Result<Pipelines> {
        config.validate()?;

        let providers = Providers {
            embedding: Self::create_embedding_provider(config)?,
            llm: Self::create_llm_provider(config)?,
            vector_db: Self::create_vector_db(config).await?,
            logging: Self::create_logging_connection(config)?,
        };

        providers.vector_db.initialize_collection(config.embedding.dimension).await?;

        Self::assemble(config, rag_impl, ingestion_impl, providers)
    }

    /// Assemble pipelines around already constructed providers
    pub fn assemble(
        config: &PipelineConfig,
        rag_impl: RagImpl,
        ingestion_impl: IngestionImpl,
        providers: Providers,
    ) -> Result<Pipelines> {
        let embedding_model = config.embedding.model.clone();

        let rag = match rag_impl {
            RagImpl::Basic => AnyRagPipeline::Basic(BasicRagPipeline::new(
                RagComponents {
                    llm: providers.llm.clone(),
                    db: providers.vector_db.clone(),
                    embedding_model: embedding_model.clone(),
                    embeddings_provider: providers.embedding.clone(),
                    logging_connection: providers.logging.clone(),
                    prompt_provider: Arc::new(BasicPromptProvider::default()),
                },
                config.language_model.model.clone(),
            )),
            RagImpl::AutoContext => AnyRagPipeline::AutoContext(AutoContextRagPipeline::new(
                providers.llm.clone(),
                providers.vector_db.clone(),
                embedding_model.clone(),
                providers.embedding.clone(),
                providers.logging.clone(),
                None,
                None,
            )),
        };

        let components = IngestionComponents {
            db: providers.vector_db.clone(),
            embeddings_provider: providers.embedding.clone(),
            embedding_model,
            embedding_batch_size: config.embedding.batch_size,
            splitter: TextSplitter::new(config.ingestion.chunk_size, config.ingestion.chunk_overlap)?,
            logging_connection: providers.logging.clone(),
        };
        let ingestion: Arc<dyn IngestionPipeline> = match ingestion_impl {
            IngestionImpl::Basic => Arc::new(BasicIngestionPipeline::new(components)),
            IngestionImpl::AutoContext => Arc::new(AutoContextIngestionPipeline::new(components)),
        };

        tracing::info!(
            rag = %rag.kind(),
            ingestion = ?ingestion_impl,
            collection = providers.vector_db.collection_name(),
            "Pipelines ready"
        );

        Ok(Pipelines {
            rag: Arc::new(rag),
            ingestion,
            vector_db: providers.vector_db,
            logging: providers.logging,
            config: config.clone(),
        })
    }

    fn create_embedding_provider(config: &PipelineConfig) -> Result<Arc<dyn EmbeddingProvider>> {
        let embedding = &config.embedding;
        match embedding.provider.as_str() {
            "openai" => Ok(Arc::new(OpenAiEmbeddingProvider::new(
                openai_api_key()?,
                embedding.base_url.clone(),
                embedding.dimension,
            ))),
            "ollama" => Ok(Arc::new(OllamaEmbeddingProvider::new(
                ollama_base_url(embedding.base_url.as_deref()),
                embedding.dimension,
            ))),
            other => Err(unknown_provider("embedding.provider", other, "openai, ollama")),
        }
    }

    fn create_llm_provider(config: &PipelineConfig) -> Result<Arc<dyn LlmProvider>> {
        let language_model = &config.language_model;
        match language_model.provider.as_str() {
            "openai" => Ok(Arc::new(OpenAiLlmProvider::new(
                openai_api_key()?,
                language_model.base_url.clone(),
            ))),
            "ollama" => Ok(Arc::new(OllamaLlmProvider::new(ollama_base_url(
                language_model.base_url.as_deref(),
            )))),
            other => Err(unknown_provider("language_model.provider", other, "openai, ollama")),
        }
    }

    async fn create_vector_db(config: &PipelineConfig) -> Result<Arc<dyn VectorDbProvider>> {
        let vector_database = &config.vector_database;
        match vector_database.provider.as_str() {
            "memory" => Ok(Arc::new(MemoryVectorDb::new(vector_database.collection_name.clone()))),
            "pgvector" => {
                let database_url = vector_database.database_url.clone().ok_or_else(|| {
                    AutoContextError::ConfigMissing {
                        key: "vector_database.database_url (or DATABASE_URL)".to_string(),
                    }
                })?;
                let pg_config =
                    PgVectorConfig::new(database_url, vector_database.collection_name.clone())
                        .with_max_connections(vector_database.max_connections);
                Ok(Arc::new(PgVectorDb::connect(pg_config).await?))
            }
            other => Err(unknown_provider("vector_database.provider", other, "memory, pgvector")),
        }
    }

    fn create_logging_connection(
        config: &PipelineConfig,
    ) -> Result<Option<Arc<dyn LoggingConnection>>> {
        let logging = &config.logging_database;
        match logging.provider.as_str() {
            "none" => Ok(None),
            "memory" => Ok(Some(Arc::new(MemoryLoggingConnection::new(config.app.max_logs)))),
            "local" => Ok(Some(Arc::new(JsonlLoggingConnection::new(
                logging.path.clone(),
                config.app.max_logs,
            )))),
            other => Err(unknown_provider("logging_database.provider", other, "none, memory, local")),
        }
    }
}

fn openai_api_key() -> Result<String> {
    std::env::var("OPENAI_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| AutoContextError::ConfigMissing {
            key: "OPENAI_API_KEY".to_string(),
        })
}

fn ollama_base_url(configured: Option<&str>) -> String {
    configured
        .map(str::to_string)
        .or_else(|| std::env::var("OLLAMA_BASE_URL").ok())
        .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string())
}

fn unknown_provider(key: &str, value: &str, expected: &str) -> AutoContextError {
    AutoContextError::ConfigInvalid {
        key: key.to_string(),
        reason: format!("Unknown provider '{}'. Use one of: {}", value, expected),
    }
}
