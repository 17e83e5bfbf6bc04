//! Fish delivery reports and their derived views.

use chrono::NaiveDate;
use serde::Serialize;

use super::id::{DeliveryId, VesselId};

/// A delivery report joined with the vessels seen at the arrival city.
///
/// `harbor_vessels` come from harbor reports on the arrival day (or the day
/// after); `ping_vessels` from transponder pings at the city that day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FishDeliveryRecord {
    pub delivery_id: DeliveryId,
    /// `None` when the report carried no usable date.
    pub date_of_arrival: Option<NaiveDate>,
    pub city_of_arrival: String,
    pub fish_name: String,
    pub quantity_tons: f64,
    pub harbor_vessels: Vec<VesselId>,
    pub ping_vessels: Vec<VesselId>,
}

/// A delivery scored by the multivariate outlier detector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredDelivery {
    #[serde(flatten)]
    pub record: FishDeliveryRecord,
    /// Label-encoded city; only comparable within one result set.
    pub city_code: usize,
    /// Label-encoded species; only comparable within one result set.
    pub fish_code: usize,
    pub harbor_vessels_count: usize,
    pub ping_vessels_count: usize,
    /// Isolation score in (0, 1]; higher is more isolated.
    pub anomaly_score: f64,
    /// 1 = anomalous, 0 = normal.
    pub anomaly: u8,
}

/// A delivery with its timing/location cluster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusteredDelivery {
    #[serde(flatten)]
    pub record: FishDeliveryRecord,
    pub cluster: usize,
}

/// Total quantity of one species delivered to one city.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesTotal {
    pub city_of_arrival: String,
    pub fish_name: String,
    pub quantity_tons: f64,
    pub deliveries: usize,
}
