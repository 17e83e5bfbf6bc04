//! JSON fixture data source.
//!
//! Serves a recorded activity dataset from a JSON file so the pipeline can
//! run without a graph database. The date window and filters are applied in
//! memory using the same column semantics as the Neo4j queries:
//!
//! | table            | window column     | filters                              |
//! |------------------|-------------------|--------------------------------------|
//! | deliveries       | `date`            | none                                 |
//! | exit events      | `exit_date`       | vessel                               |
//! | vessel counts    | `date`            | none                                 |
//! | pings            | `start_time`      | vessel; city/port/region on location |
//! | fish deliveries  | `date_of_arrival` | city, species                        |
//!
//! Rows whose window column cannot be parsed are passed through and left to
//! the normalization pass.
//!
//! A dataset without recorded vessel counts derives them from its pings:
//! distinct vessel ids per `start_time` day, with unparseable times
//! skipped.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::domain::time::timestamp_from_value;
use crate::domain::{DateWindow, FilterKind, FilterSet};
use crate::error::{Error, Result};
use crate::port::{
    ActivitySource, QueryScope, RawDeliveryRow, RawExitRow, RawFishDeliveryRow, RawPingRow,
    RawVesselCountRow, SourceResult,
};

/// A node that can appear in a dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionNode {
    pub kind: FilterKind,
    pub value: String,
    /// Node properties matched against the other dimensions' selections.
    #[serde(default)]
    pub properties: BTreeMap<FilterKind, String>,
}

/// A complete recorded dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub deliveries: Vec<RawDeliveryRow>,
    pub exit_events: Vec<RawExitRow>,
    pub vessel_counts: Vec<RawVesselCountRow>,
    pub transport_pings: Vec<RawPingRow>,
    pub fish_deliveries: Vec<RawFishDeliveryRow>,
    pub options: Vec<OptionNode>,
}

impl Dataset {
    /// Parse a dataset from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid dataset.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read a dataset file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(Error::Io)?;
        Self::from_json(&text)
    }

    #[must_use]
    pub fn deliveries_in(&self, scope: &QueryScope) -> Vec<RawDeliveryRow> {
        self.deliveries
            .iter()
            .filter(|row| in_window(&scope.window, &row.date))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn exit_events_in(&self, scope: &QueryScope) -> Vec<RawExitRow> {
        self.exit_events
            .iter()
            .filter(|row| in_window(&scope.window, &row.exit_date))
            .filter(|row| admits(&scope.filters, FilterKind::Vessel, &row.vessel_id))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn vessel_counts_in(&self, scope: &QueryScope) -> Vec<RawVesselCountRow> {
        if self.vessel_counts.is_empty() {
            return self.vessels_per_day(&scope.window);
        }
        self.vessel_counts
            .iter()
            .filter(|row| in_window(&scope.window, &row.date))
            .cloned()
            .collect()
    }

    fn vessels_per_day(&self, window: &DateWindow) -> Vec<RawVesselCountRow> {
        let mut by_day: BTreeMap<NaiveDate, BTreeSet<&str>> = BTreeMap::new();
        for ping in &self.transport_pings {
            let Some(at) = timestamp_from_value(&ping.start_time) else {
                continue;
            };
            if !window.contains(at) {
                continue;
            }
            if let Some(vessel) = ping.vessel_id.as_str() {
                by_day.entry(at.date()).or_default().insert(vessel);
            }
        }
        by_day
            .into_iter()
            .map(|(day, vessels)| RawVesselCountRow {
                date: Value::String(day.format("%Y-%m-%d").to_string()),
                num_vessels: Value::from(vessels.len()),
            })
            .collect()
    }

    #[must_use]
    pub fn transport_pings_in(&self, scope: &QueryScope) -> Vec<RawPingRow> {
        let locations = location_filter(&scope.filters);
        self.transport_pings
            .iter()
            .filter(|row| in_window(&scope.window, &row.start_time))
            .filter(|row| admits(&scope.filters, FilterKind::Vessel, &row.vessel_id))
            .filter(|row| {
                locations.is_empty()
                    || row
                        .source_location
                        .as_str()
                        .is_some_and(|loc| locations.contains(loc))
            })
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn fish_deliveries_in(&self, scope: &QueryScope) -> Vec<RawFishDeliveryRow> {
        self.fish_deliveries
            .iter()
            .filter(|row| in_window(&scope.window, &row.date_of_arrival))
            .filter(|row| admits(&scope.filters, FilterKind::City, &row.city_of_arrival))
            .filter(|row| admits(&scope.filters, FilterKind::Species, &row.fish_name))
            .cloned()
            .collect()
    }

    /// Sorted, distinct option values for `kind` under `filters`.
    ///
    /// A node passes when, for every other constrained dimension, it carries
    /// a property whose value is selected.
    #[must_use]
    pub fn options_for(&self, kind: FilterKind, filters: &FilterSet) -> Vec<String> {
        let filters = filters.without(kind);
        let values: BTreeSet<&str> = self
            .options
            .iter()
            .filter(|node| node.kind == kind)
            .filter(|node| {
                filters.active().all(|(other, selected)| {
                    node.properties
                        .get(&other)
                        .is_some_and(|value| selected.contains(value))
                })
            })
            .map(|node| node.value.as_str())
            .collect();
        values.into_iter().map(str::to_owned).collect()
    }
}

fn in_window(window: &DateWindow, value: &Value) -> bool {
    timestamp_from_value(value).map_or(true, |ts| window.contains(ts))
}

fn admits(filters: &FilterSet, kind: FilterKind, value: &Value) -> bool {
    let selected = filters.values(kind);
    selected.is_empty() || value.as_str().is_some_and(|v| selected.contains(v))
}

/// Union of the selected cities, ports and regions.
pub(crate) fn location_filter(filters: &FilterSet) -> BTreeSet<String> {
    [FilterKind::City, FilterKind::Port, FilterKind::Region]
        .into_iter()
        .flat_map(|kind| filters.values(kind).iter().cloned())
        .collect()
}

/// Activity source backed by a [`Dataset`].
#[derive(Debug, Clone)]
pub struct FixtureSource {
    dataset: Dataset,
}

impl FixtureSource {
    #[must_use]
    pub fn new(dataset: Dataset) -> Self {
        Self { dataset }
    }

    /// Load the dataset at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let dataset = Dataset::load(path)?;
        debug!(
            path = %path.display(),
            deliveries = dataset.deliveries.len(),
            pings = dataset.transport_pings.len(),
            fish_deliveries = dataset.fish_deliveries.len(),
            "Loaded fixture dataset"
        );
        Ok(Self::new(dataset))
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

#[async_trait]
impl ActivitySource for FixtureSource {
    fn name(&self) -> &'static str {
        "fixture"
    }

    async fn fetch_delivery_qty(&self, scope: &QueryScope) -> SourceResult<Vec<RawDeliveryRow>> {
        Ok(self.dataset.deliveries_in(scope))
    }

    async fn fetch_exit_events(&self, scope: &QueryScope) -> SourceResult<Vec<RawExitRow>> {
        Ok(self.dataset.exit_events_in(scope))
    }

    async fn fetch_vessel_counts(
        &self,
        scope: &QueryScope,
    ) -> SourceResult<Vec<RawVesselCountRow>> {
        Ok(self.dataset.vessel_counts_in(scope))
    }

    async fn fetch_transport_pings(&self, scope: &QueryScope) -> SourceResult<Vec<RawPingRow>> {
        Ok(self.dataset.transport_pings_in(scope))
    }

    async fn fetch_fish_deliveries(
        &self,
        scope: &QueryScope,
    ) -> SourceResult<Vec<RawFishDeliveryRow>> {
        Ok(self.dataset.fish_deliveries_in(scope))
    }

    async fn list_options(
        &self,
        kind: FilterKind,
        filters: &FilterSet,
    ) -> SourceResult<Vec<String>> {
        Ok(self.dataset.options_for(kind, filters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dataset() -> Dataset {
        Dataset::from_json(
            &json!({
                "deliveries": [
                    {"date": "2035-01-01", "qty_tons": 1.0},
                    {"date": "2035-03-01", "qty_tons": 2.0},
                    {"date": "garbled", "qty_tons": 3.0}
                ],
                "exit_events": [
                    {"exit_date": "2035-01-01T08:00:00", "vessel_id": "v-1"},
                    {"exit_date": "2035-01-01T09:00:00", "vessel_id": "v-2"}
                ],
                "transport_pings": [
                    {"source_location": "City of Haacklee", "vessel_id": "v-1", "start_time": "2035-01-02T00:00:00", "dwell": 60},
                    {"source_location": "Nav 3", "vessel_id": "v-1", "start_time": "2035-01-02T00:00:00", "dwell": 60}
                ],
                "fish_deliveries": [
                    {"deliveryreport_name": "c1", "date_of_arrival": "2035-01-05", "city_of_arrival": "City of Haacklee", "fish_name": "Cod"},
                    {"deliveryreport_name": "c2", "date_of_arrival": "2035-01-05", "city_of_arrival": "City of Lomark", "fish_name": "Cod"}
                ],
                "options": [
                    {"kind": "vessel", "value": "v-2", "properties": {"company": "Acme"}},
                    {"kind": "vessel", "value": "v-1", "properties": {"company": "Acme"}},
                    {"kind": "vessel", "value": "v-3", "properties": {"company": "Other"}},
                    {"kind": "company", "value": "Acme"},
                    {"kind": "company", "value": "Acme"}
                ]
            })
            .to_string(),
        )
        .unwrap()
    }

    fn scope(filters: FilterSet) -> QueryScope {
        QueryScope::new(
            DateWindow::from_params(Some("2035-01-01"), Some("2035-01-31")).unwrap(),
            filters,
        )
    }

    #[test]
    fn window_is_applied_and_unparseable_rows_pass() {
        let rows = dataset().deliveries_in(&scope(FilterSet::new()));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].date, json!("garbled"));
    }

    #[test]
    fn vessel_filter_narrows_exits() {
        let filters = FilterSet::new().with(FilterKind::Vessel, ["v-2"]);
        let rows = dataset().exit_events_in(&scope(filters));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].vessel_id, json!("v-2"));
    }

    #[test]
    fn location_filters_narrow_pings() {
        let filters = FilterSet::new().with(FilterKind::Port, ["Nav 3"]);
        let rows = dataset().transport_pings_in(&scope(filters));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].source_location, json!("Nav 3"));
    }

    #[test]
    fn vessel_counts_are_distinct_per_day() {
        let rows = dataset().vessel_counts_in(&scope(FilterSet::new()));
        assert_eq!(
            rows,
            vec![RawVesselCountRow {
                date: json!("2035-01-02"),
                num_vessels: json!(1),
            }]
        );
    }

    #[test]
    fn recorded_vessel_counts_take_precedence() {
        let mut data = dataset();
        data.vessel_counts = vec![RawVesselCountRow {
            date: json!("2035-01-03"),
            num_vessels: json!(7),
        }];
        let rows = data.vessel_counts_in(&scope(FilterSet::new()));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].num_vessels, json!(7));
    }

    #[test]
    fn city_filter_narrows_fish_deliveries() {
        let filters = FilterSet::new().with(FilterKind::City, ["City of Lomark"]);
        let rows = dataset().fish_deliveries_in(&scope(filters));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].deliveryreport_name, json!("c2"));
    }

    #[test]
    fn options_are_sorted_distinct_and_filtered() {
        let data = dataset();
        assert_eq!(
            data.options_for(FilterKind::Vessel, &FilterSet::new()),
            vec!["v-1", "v-2", "v-3"]
        );
        let acme = FilterSet::new().with(FilterKind::Company, ["Acme"]);
        assert_eq!(data.options_for(FilterKind::Vessel, &acme), vec!["v-1", "v-2"]);
        assert_eq!(data.options_for(FilterKind::Company, &acme), vec!["Acme"]);
    }

    #[tokio::test]
    async fn source_serves_the_dataset() {
        let source = FixtureSource::new(dataset());
        let rows = source
            .fetch_exit_events(&scope(FilterSet::new()))
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(source.name(), "fixture");
    }
}
