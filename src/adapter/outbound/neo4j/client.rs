//! Neo4j HTTP client.
//!
//! Provides an implementation of the [`ActivitySource`] trait over the Neo4j
//! HTTP transactional API (`POST {url}/db/{database}/tx/commit`).

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::query::CypherQuery;
use super::response::TxResponse;
use crate::domain::{FilterKind, FilterSet};
use crate::error::{ConfigError, Error, PipelineError, Result};
use crate::port::{
    ActivitySource, QueryScope, RawDeliveryRow, RawExitRow, RawFishDeliveryRow, RawPingRow,
    RawVesselCountRow, SourceResult,
};

/// Environment variable holding the database password.
pub const PASSWORD_ENV: &str = "NEO4J_PASSWORD";

/// Neo4j graph client.
#[derive(Debug)]
pub struct Neo4jSource {
    /// HTTP client for API requests.
    client: Client,
    /// Transaction commit endpoint.
    endpoint: Url,
    user: String,
    password: String,
}

impl Neo4jSource {
    /// Create a client for `database` on the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid or the HTTP client cannot be
    /// built.
    pub fn new(
        base_url: &str,
        database: &str,
        user: impl Into<String>,
        password: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let endpoint = commit_endpoint(base_url, database)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            user: user.into(),
            password: password.into(),
        })
    }

    /// Create a client reading the password from `NEO4J_PASSWORD`.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is not set.
    pub fn from_env(
        base_url: &str,
        database: &str,
        user: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let password = std::env::var(PASSWORD_ENV).map_err(|_| {
            Error::Config(ConfigError::MissingField {
                field: PASSWORD_ENV,
            })
        })?;
        Self::new(base_url, database, user, password, timeout)
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn execute(&self, query: &CypherQuery) -> SourceResult<TxResponse> {
        let body = TxRequest {
            statements: [query],
        };
        debug!(query = query.name, "Running Cypher statement");
        let response = self
            .client
            .post(self.endpoint.clone())
            .basic_auth(&self.user, Some(&self.password))
            .header("accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::upstream(query.name, e.to_string()))?
            .error_for_status()
            .map_err(|e| PipelineError::upstream(query.name, e.to_string()))?;
        response
            .json::<TxResponse>()
            .await
            .map_err(|e| PipelineError::upstream(query.name, format!("invalid response: {e}")))
    }

    async fn fetch<T: DeserializeOwned>(&self, query: CypherQuery) -> SourceResult<Vec<T>> {
        let rows = self.execute(&query).await?.decode(query.name)?;
        debug!(query = query.name, rows = rows.len(), "Cypher statement complete");
        Ok(rows)
    }
}

#[derive(Serialize)]
struct TxRequest<'a> {
    statements: [&'a CypherQuery; 1],
}

fn commit_endpoint(base_url: &str, database: &str) -> Result<Url> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(&format!("db/{database}/tx/commit"))?)
}

#[async_trait]
impl ActivitySource for Neo4jSource {
    fn name(&self) -> &'static str {
        "neo4j"
    }

    async fn fetch_delivery_qty(&self, scope: &QueryScope) -> SourceResult<Vec<RawDeliveryRow>> {
        self.fetch(CypherQuery::delivery_qty(scope)).await
    }

    async fn fetch_exit_events(&self, scope: &QueryScope) -> SourceResult<Vec<RawExitRow>> {
        self.fetch(CypherQuery::exit_events(scope)).await
    }

    async fn fetch_vessel_counts(
        &self,
        scope: &QueryScope,
    ) -> SourceResult<Vec<RawVesselCountRow>> {
        self.fetch(CypherQuery::vessel_counts(scope)).await
    }

    async fn fetch_transport_pings(&self, scope: &QueryScope) -> SourceResult<Vec<RawPingRow>> {
        self.fetch(CypherQuery::transport_pings(scope)).await
    }

    async fn fetch_fish_deliveries(
        &self,
        scope: &QueryScope,
    ) -> SourceResult<Vec<RawFishDeliveryRow>> {
        self.fetch(CypherQuery::fish_deliveries(scope)).await
    }

    async fn list_options(
        &self,
        kind: FilterKind,
        filters: &FilterSet,
    ) -> SourceResult<Vec<String>> {
        let query = CypherQuery::options(kind, filters);
        let records = self.execute(&query).await?.into_records(query.name)?;
        let values: BTreeSet<String> = records
            .into_iter()
            .filter_map(|mut record| match record.remove("value") {
                Some(Value::String(s)) => Some(s),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            })
            .collect();
        Ok(values.into_iter().collect())
    }
}
