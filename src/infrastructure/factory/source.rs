//! Activity source factory.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::adapter::outbound::fixture::FixtureSource;
use crate::adapter::outbound::neo4j::Neo4jSource;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::config::source::SourceConfig;
use crate::port::ActivitySource;

/// Build the configured activity source.
///
/// # Errors
///
/// Returns an error if the fixture cannot be loaded, or if the Neo4j URL is
/// invalid or `NEO4J_PASSWORD` is not set.
pub fn build_source(config: &Config) -> Result<Arc<dyn ActivitySource>> {
    match &config.source {
        SourceConfig::Neo4j(neo4j) => {
            let source = Neo4jSource::from_env(
                &neo4j.url,
                &neo4j.database,
                neo4j.user.clone(),
                Duration::from_secs(neo4j.timeout_secs),
            )?;
            info!(endpoint = %source.endpoint(), "Using Neo4j source");
            Ok(Arc::new(source))
        }
        SourceConfig::Fixture(fixture) => {
            let source = FixtureSource::from_path(&fixture.path)?;
            info!(path = %fixture.path, "Using fixture source");
            Ok(Arc::new(source))
        }
    }
}
