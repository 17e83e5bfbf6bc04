//! Activity data source port.
//!
//! Defines the row-level contract between the analysis pipeline and the
//! graph query layer. Rows are returned exactly as the graph stores them
//! (loosely typed JSON values); turning them into domain records is the job
//! of the normalization pass in the application layer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{DateWindow, FilterKind, FilterSet};
use crate::error::PipelineError;

/// Result type for source calls. Failures are reported per query so the
/// dashboard can degrade one panel at a time.
pub type SourceResult<T> = std::result::Result<T, PipelineError>;

/// What a single dashboard request asks the source for.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueryScope {
    /// Normalized half-open date window.
    pub window: DateWindow,
    /// Dropdown selections.
    pub filters: FilterSet,
}

impl QueryScope {
    #[must_use]
    pub fn new(window: DateWindow, filters: FilterSet) -> Self {
        Self { window, filters }
    }
}

/// Delivery report date and cargo quantity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDeliveryRow {
    #[serde(default)]
    pub date: Value,
    #[serde(default)]
    pub qty_tons: Value,
}

/// Transponder ping edge read as a vessel exit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawExitRow {
    #[serde(default)]
    pub exit_date: Value,
    #[serde(default)]
    pub vessel_id: Value,
}

/// Distinct vessels pinged on one calendar day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawVesselCountRow {
    #[serde(default)]
    pub date: Value,
    #[serde(default)]
    pub num_vessels: Value,
}

/// Transponder ping with its dwell time in seconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPingRow {
    #[serde(default)]
    pub source_location: Value,
    #[serde(default)]
    pub vessel_id: Value,
    #[serde(default)]
    pub start_time: Value,
    #[serde(default)]
    pub dwell: Value,
}

/// Delivery report joined with harbor reports and pings at the arrival city.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFishDeliveryRow {
    #[serde(default)]
    pub deliveryreport_name: Value,
    #[serde(default)]
    pub date_of_arrival: Value,
    #[serde(default)]
    pub city_of_arrival: Value,
    #[serde(default)]
    pub fish_name: Value,
    #[serde(default)]
    pub qty_tons: Value,
    #[serde(default)]
    pub harbor_vessels: Value,
    #[serde(default)]
    pub ping_vessels: Value,
}

/// Row source for the activity graph.
///
/// Implementations wrap a concrete store (Neo4j, a JSON fixture, an
/// in-memory table) and apply the date window and filters of a
/// [`QueryScope`] before returning rows.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the pipeline issues the fetches
/// for one request concurrently.
///
/// # Errors
///
/// Every method returns [`PipelineError::UpstreamQueryFailure`] when the
/// underlying query fails or its rows cannot be decoded.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Return the source name for logging.
    fn name(&self) -> &'static str;

    /// Delivery dates and quantities inside the window.
    async fn fetch_delivery_qty(&self, scope: &QueryScope) -> SourceResult<Vec<RawDeliveryRow>>;

    /// Vessel exit events inside the window.
    async fn fetch_exit_events(&self, scope: &QueryScope) -> SourceResult<Vec<RawExitRow>>;

    /// Distinct vessels pinged per calendar day inside the window.
    async fn fetch_vessel_counts(&self, scope: &QueryScope)
        -> SourceResult<Vec<RawVesselCountRow>>;

    /// Transponder pings with dwell times inside the window.
    async fn fetch_transport_pings(&self, scope: &QueryScope) -> SourceResult<Vec<RawPingRow>>;

    /// Fish delivery reports with their harbor and ping vessel lists.
    async fn fetch_fish_deliveries(
        &self,
        scope: &QueryScope,
    ) -> SourceResult<Vec<RawFishDeliveryRow>>;

    /// Dropdown values for `kind`, narrowed by the other selections.
    ///
    /// Implementations ignore the selection for `kind` itself and return a
    /// sorted, de-duplicated list.
    async fn list_options(&self, kind: FilterKind, filters: &FilterSet)
        -> SourceResult<Vec<String>>;
}
