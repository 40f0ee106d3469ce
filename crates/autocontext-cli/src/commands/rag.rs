use anyhow::Result;
use autocontext_core::config::LayeredConfig;
use autocontext_pipeline::{IngestionImpl, RagOutput, RagRequest};

use super::{build_pipelines, to_filters};
use crate::cli::RagArgs;
use crate::output::OutputWriter;

pub async fn execute(args: RagArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let pipelines = build_pipelines(config, args.pipeline.into(), IngestionImpl::Basic).await?;

    let request = RagRequest::new(&args.query)
        .with_filters(to_filters(args.filters))
        .with_limit(args.limit)
        .with_search_only(false);
    let result = pipelines.rag.run(request).await?;

    if output.is_json() {
        return output.result(&result);
    }

    match result {
        RagOutput::Basic(out) => {
            output.section("Answer");
            match out.completion {
                Some(completion) => {
                    output.text(completion.content.trim());
                    output.kv("Model", completion.model);
                }
                None => output.warning("The pipeline returned no completion"),
            }
            output.kv("Sources", out.search_results.len());
        }
        RagOutput::AutoContext(out) => {
            output.warning("The autocontext pipeline only searches; showing results");
            output.section("Results");
            output.text(out.search_results.trim_end());
        }
    }

    Ok(())
}
