use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use autocontext_core::config::{LayeredConfig, PipelineConfig, DEFAULT_CONFIG_FILE};
use autocontext_pipeline::{IngestionImpl, PipelineFactory, RagImpl};
use axum::http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use autocontext_api::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is not an error
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "autocontext_api=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    let config_path = env::var("AUTOCONTEXT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = load_config(&config_path)?;

    tracing::info!(
        config = %config_path.display(),
        embedding = %config.embedding.provider,
        llm = %config.language_model.provider,
        vector_db = %config.vector_database.provider,
        "Starting AutoContext API server"
    );

    let pipelines =
        PipelineFactory::create_pipeline(&config, RagImpl::AutoContext, IngestionImpl::Basic)
            .await
            .context("Failed to create pipelines")?;

    let cors_origin = config
        .app
        .cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin '{}'", config.app.cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let addr = config.app.bind_address();
    let app = create_router(Arc::new(AppState::new(pipelines))).layer(cors);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Listening on {}", addr);
    tracing::info!("CORS enabled for {}", config.app.cors_origin);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

/// Load the JSON configuration, falling back to defaults when the file is absent
fn load_config(path: &Path) -> anyhow::Result<PipelineConfig> {
    if path.exists() {
        return PipelineConfig::load_config(path)
            .with_context(|| format!("Failed to load {}", path.display()));
    }

    tracing::warn!(
        path = %path.display(),
        "Configuration file not found; using defaults and environment overrides"
    );
    let layered = LayeredConfig::with_defaults().load_from_env();
    layered.validate().context("Invalid configuration")?;
    Ok(layered.into_config())
}
