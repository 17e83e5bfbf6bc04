//! Daily timeline types: merged cargo/vessel series, anomaly labels and
//! seasonal decomposition output.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

/// Cargo delivered on one day (after boundary normalization).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyQuantity {
    pub date: NaiveDate,
    pub qty_tons: f64,
}

/// Distinct vessels observed on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyVesselCount {
    pub date: NaiveDate,
    pub num_vessels: u32,
}

/// One row of the merged daily timeline.
///
/// A field is `None` on days before its series' first observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalDayRecord {
    pub date: NaiveDate,
    pub qty_tons: Option<f64>,
    pub num_vessels: Option<u32>,
}

/// Label attached by the rolling z-score detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AnomalyLabel {
    Normal,
    Anomaly,
}

impl AnomalyLabel {
    #[must_use]
    pub const fn is_anomaly(self) -> bool {
        matches!(self, AnomalyLabel::Anomaly)
    }
}

impl fmt::Display for AnomalyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnomalyLabel::Normal => f.write_str("Normal"),
            AnomalyLabel::Anomaly => f.write_str("Anomaly"),
        }
    }
}

/// A timeline row with its rolling statistics and anomaly label.
///
/// Statistics are `None` where they are undefined. Means need one observed
/// value in the window, deviations need two, and z-scores need an observed
/// value and a nonzero deviation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyDayRecord {
    #[serde(flatten)]
    pub day: TemporalDayRecord,
    pub rolling_mean_qty: Option<f64>,
    pub rolling_std_qty: Option<f64>,
    pub rolling_mean_vessels: Option<f64>,
    pub rolling_std_vessels: Option<f64>,
    pub z_score_qty: Option<f64>,
    pub z_score_vessels: Option<f64>,
    pub anomaly: AnomalyLabel,
}

/// One day of an additive seasonal decomposition.
///
/// `trend` and `residual` are `None` at the edges where the centered moving
/// average has no full window.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecompositionPoint {
    pub date: NaiveDate,
    pub observed: f64,
    pub trend: Option<f64>,
    pub seasonal: f64,
    pub residual: Option<f64>,
}

/// Additive decomposition of the daily cargo series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decomposition {
    pub period: usize,
    pub points: Vec<DecompositionPoint>,
}
