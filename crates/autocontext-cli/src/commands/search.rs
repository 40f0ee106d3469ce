use anyhow::Result;
use autocontext_core::config::LayeredConfig;
use autocontext_pipeline::{IngestionImpl, RagOutput, RagRequest};

use super::{build_pipelines, to_filters};
use crate::cli::SearchArgs;
use crate::output::OutputWriter;

pub async fn execute(args: SearchArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let pipelines = build_pipelines(config, args.pipeline.into(), IngestionImpl::Basic).await?;

    let request = RagRequest::new(&args.query)
        .with_filters(to_filters(args.filters))
        .with_limit(args.limit)
        .with_search_only(true);
    let result = pipelines.rag.run(request).await?;

    if output.is_json() {
        return output.result(&result);
    }

    output.section(format!("Results for \"{}\"", args.query));
    match result {
        RagOutput::AutoContext(out) => {
            if out.search_results.is_empty() {
                output.info("No matching pages");
            } else {
                output.text(out.search_results.trim_end());
            }
        }
        RagOutput::Basic(out) => {
            if out.search_results.is_empty() {
                output.info("No matching pages");
            }
            for (rank, hit) in out.search_results.iter().enumerate() {
                let title = hit.metadata.get("title").and_then(|v| v.as_str()).unwrap_or("-");
                let url = hit.metadata.get("url").and_then(|v| v.as_str()).unwrap_or("-");
                output.kv(format!("{}. {:.3}", rank + 1, hit.score), format!("{} ({})", title, url));
            }
        }
    }

    Ok(())
}
