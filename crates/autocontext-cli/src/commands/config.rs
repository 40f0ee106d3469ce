use anyhow::Result;
use autocontext_core::config::LayeredConfig;
use serde::Serialize;
use tabled::Tabled;

use crate::output::OutputWriter;

#[derive(Debug, Serialize, Tabled)]
struct ConfigRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Source")]
    source: String,
}

pub fn execute(config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let rows: Vec<ConfigRow> = config
        .to_inspection_map()
        .into_iter()
        .map(|(key, (value, source))| ConfigRow {
            key,
            value,
            source: format!("{:?}", source),
        })
        .collect();

    if output.is_json() {
        return output.result(&rows);
    }

    output.section("Configuration");
    output.table(rows);
    Ok(())
}
