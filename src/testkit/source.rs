//! In-memory activity sources.
//!
//! - [`InMemorySource`] serves rows from a [`Dataset`] and can be told to fail
//!   individual fetches.
//! - [`FailingSource`] fails every call.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::adapter::outbound::fixture::{Dataset, OptionNode};
use crate::domain::{FilterKind, FilterSet};
use crate::error::PipelineError;
use crate::port::{
    ActivitySource, QueryScope, RawDeliveryRow, RawExitRow, RawFishDeliveryRow, RawPingRow,
    RawVesselCountRow, SourceResult,
};

/// Rows decoded from loose JSON; rows that do not fit the shape are skipped.
fn rows<T: DeserializeOwned>(values: Vec<Value>) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect()
}

/// Activity source backed by an in-memory dataset.
///
/// Applies the window and filters exactly like the fixture adapter.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    dataset: Dataset,
    failing: BTreeSet<&'static str>,
}

impl InMemorySource {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            failing: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_deliveries(mut self, values: Vec<Value>) -> Self {
        self.dataset.deliveries.extend(rows::<RawDeliveryRow>(values));
        self
    }

    #[must_use]
    pub fn with_exits(mut self, values: Vec<Value>) -> Self {
        self.dataset.exit_events.extend(rows::<RawExitRow>(values));
        self
    }

    #[must_use]
    pub fn with_vessel_counts(mut self, values: Vec<Value>) -> Self {
        self.dataset
            .vessel_counts
            .extend(rows::<RawVesselCountRow>(values));
        self
    }

    #[must_use]
    pub fn with_pings(mut self, values: Vec<Value>) -> Self {
        self.dataset.transport_pings.extend(rows::<RawPingRow>(values));
        self
    }

    #[must_use]
    pub fn with_fish_deliveries(mut self, values: Vec<Value>) -> Self {
        self.dataset
            .fish_deliveries
            .extend(rows::<RawFishDeliveryRow>(values));
        self
    }

    /// Add a dropdown node with its properties.
    #[must_use]
    pub fn with_option(
        mut self,
        kind: FilterKind,
        value: &str,
        properties: &[(FilterKind, &str)],
    ) -> Self {
        self.dataset.options.push(OptionNode {
            kind,
            value: value.to_string(),
            properties: properties
                .iter()
                .map(|(k, v)| (*k, (*v).to_string()))
                .collect(),
        });
        self
    }

    /// Make the named trait method return an upstream failure.
    #[must_use]
    pub fn failing_on(mut self, method: &'static str) -> Self {
        self.failing.insert(method);
        self
    }

    fn check(&self, method: &'static str) -> SourceResult<()> {
        if self.failing.contains(method) {
            return Err(PipelineError::upstream(method, "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl ActivitySource for InMemorySource {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_delivery_qty(&self, scope: &QueryScope) -> SourceResult<Vec<RawDeliveryRow>> {
        self.check("fetch_delivery_qty")?;
        Ok(self.dataset.deliveries_in(scope))
    }

    async fn fetch_exit_events(&self, scope: &QueryScope) -> SourceResult<Vec<RawExitRow>> {
        self.check("fetch_exit_events")?;
        Ok(self.dataset.exit_events_in(scope))
    }

    async fn fetch_vessel_counts(
        &self,
        scope: &QueryScope,
    ) -> SourceResult<Vec<RawVesselCountRow>> {
        self.check("fetch_vessel_counts")?;
        Ok(self.dataset.vessel_counts_in(scope))
    }

    async fn fetch_transport_pings(&self, scope: &QueryScope) -> SourceResult<Vec<RawPingRow>> {
        self.check("fetch_transport_pings")?;
        Ok(self.dataset.transport_pings_in(scope))
    }

    async fn fetch_fish_deliveries(
        &self,
        scope: &QueryScope,
    ) -> SourceResult<Vec<RawFishDeliveryRow>> {
        self.check("fetch_fish_deliveries")?;
        Ok(self.dataset.fish_deliveries_in(scope))
    }

    async fn list_options(
        &self,
        kind: FilterKind,
        filters: &FilterSet,
    ) -> SourceResult<Vec<String>> {
        self.check("list_options")?;
        Ok(self.dataset.options_for(kind, filters))
    }
}

/// Source whose every call fails with the same reason.
#[derive(Debug, Clone)]
pub struct FailingSource {
    reason: String,
}

impl FailingSource {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn fail<T>(&self, query: &'static str) -> SourceResult<T> {
        Err(PipelineError::upstream(query, self.reason.clone()))
    }
}

#[async_trait]
impl ActivitySource for FailingSource {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn fetch_delivery_qty(&self, _scope: &QueryScope) -> SourceResult<Vec<RawDeliveryRow>> {
        self.fail("fetch_delivery_qty")
    }

    async fn fetch_exit_events(&self, _scope: &QueryScope) -> SourceResult<Vec<RawExitRow>> {
        self.fail("fetch_exit_events")
    }

    async fn fetch_vessel_counts(
        &self,
        _scope: &QueryScope,
    ) -> SourceResult<Vec<RawVesselCountRow>> {
        self.fail("fetch_vessel_counts")
    }

    async fn fetch_transport_pings(&self, _scope: &QueryScope) -> SourceResult<Vec<RawPingRow>> {
        self.fail("fetch_transport_pings")
    }

    async fn fetch_fish_deliveries(
        &self,
        _scope: &QueryScope,
    ) -> SourceResult<Vec<RawFishDeliveryRow>> {
        self.fail("fetch_fish_deliveries")
    }

    async fn list_options(
        &self,
        _kind: FilterKind,
        _filters: &FilterSet,
    ) -> SourceResult<Vec<String>> {
        self.fail("list_options")
    }
}
