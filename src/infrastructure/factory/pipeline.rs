//! Analysis pipeline factory.

use crate::application::pipeline::Pipeline;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

use super::source::build_source;

/// Build a pipeline over the configured source with the configured stage
/// parameters.
///
/// # Errors
///
/// Returns an error if the source cannot be built or a stage rejects its
/// parameters.
pub fn build_pipeline(config: &Config) -> Result<Pipeline> {
    let settings = config.analysis_settings()?;
    let source = build_source(config)?;
    Ok(Pipeline::new(source, settings))
}
