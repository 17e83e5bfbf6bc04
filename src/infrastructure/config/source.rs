//! Activity source configuration.

use serde::{Deserialize, Serialize};

/// Which activity source to connect to.
///
/// Selected by the `type` field of the `[source]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    /// Neo4j graph over its HTTP transactional API.
    Neo4j(Neo4jConfig),
    /// Recorded JSON dataset.
    Fixture(FixtureConfig),
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Neo4j(Neo4jConfig::default())
    }
}

impl SourceConfig {
    /// Short name for display.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Neo4j(_) => "neo4j",
            Self::Fixture(_) => "fixture",
        }
    }
}

/// Neo4j connection settings.
///
/// The password is never read from the file; it comes from
/// `NEO4J_PASSWORD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Neo4jConfig {
    /// Base HTTP URL of the server.
    pub url: String,
    pub database: String,
    pub user: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:7474".into(),
            database: "neo4j".into(),
            user: "neo4j".into(),
            timeout_secs: 30,
        }
    }
}

/// JSON fixture settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureConfig {
    /// Dataset file; relative paths resolve against the working directory.
    pub path: String,
}
