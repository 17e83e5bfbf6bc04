//! Handler for `oceanus options`.

use serde_json::json;

use crate::adapter::inbound::cli::command::OptionsArgs;
use crate::adapter::inbound::cli::output;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::factory::pipeline::build_pipeline;

/// Execute `options`.
pub async fn execute(args: &OptionsArgs) -> Result<()> {
    let config = Config::load(&args.config)?;
    super::init_logging(&config);
    let pipeline = build_pipeline(&config)?;

    let filters = args.filters.to_filter_set();
    let values = pipeline.options(args.kind, &filters).await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "options",
            "kind": args.kind,
            "values": values,
        }));
        return Ok(());
    }

    output::section(&format!("{} options", args.kind));
    if values.is_empty() {
        output::note("no matching values");
        return Ok(());
    }
    for value in &values {
        output::lines(value);
    }
    output::note(&format!("{} values", values.len()));
    Ok(())
}
