use autocontext_core::config::PipelineConfig;
use autocontext_pipeline::Pipelines;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub pipelines: Pipelines,
}

impl AppState {
    pub fn new(pipelines: Pipelines) -> Self {
        Self { pipelines }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.pipelines.config
    }
}
