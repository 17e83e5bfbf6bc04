//! Anomaly detection over the daily timeline and fish deliveries.
//!
//! - [`rolling`]: univariate rolling z-scores on the merged timeline.
//! - [`isolation`]: isolation forest used to score fish deliveries.

pub mod isolation;
pub mod rolling;

use std::collections::BTreeSet;

use tracing::debug;

use crate::domain::error::DomainError;
use crate::domain::stats::standardize;
use crate::domain::{FishDeliveryRecord, ScoredDelivery};

pub use isolation::{IsolationForest, IsolationScore};
pub use rolling::RollingDetector;

/// Sorted-vocabulary label encoder.
///
/// Codes are positions in the sorted set of distinct values, so they are
/// only meaningful within one invocation.
#[derive(Debug, Clone, Default)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let classes: BTreeSet<&str> = values.into_iter().collect();
        Self {
            classes: classes.into_iter().map(str::to_owned).collect(),
        }
    }

    #[must_use]
    pub fn encode(&self, value: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(value))
            .ok()
    }

    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

/// Score fish deliveries with an isolation forest.
///
/// Deliveries without an arrival date are dropped. The features are
/// quantity and the two vessel counts, standardized per invocation.
///
/// # Errors
///
/// Propagates feature-matrix errors from the forest.
pub fn score_deliveries(
    records: &[FishDeliveryRecord],
    forest: &IsolationForest,
) -> Result<Vec<ScoredDelivery>, DomainError> {
    let dated: Vec<&FishDeliveryRecord> = records
        .iter()
        .filter(|r| r.date_of_arrival.is_some())
        .collect();
    if dated.is_empty() {
        return Ok(Vec::new());
    }

    let cities = LabelEncoder::fit(dated.iter().map(|r| r.city_of_arrival.as_str()));
    let fish = LabelEncoder::fit(dated.iter().map(|r| r.fish_name.as_str()));

    let features: Vec<Vec<f64>> = dated
        .iter()
        .map(|r| {
            vec![
                r.quantity_tons,
                r.harbor_vessels.len() as f64,
                r.ping_vessels.len() as f64,
            ]
        })
        .collect();
    let scores = forest.fit_predict(&standardize(&features)?)?;

    let scored: Vec<ScoredDelivery> = dated
        .into_iter()
        .zip(scores)
        .map(|(record, score)| ScoredDelivery {
            city_code: cities.encode(&record.city_of_arrival).unwrap_or_default(),
            fish_code: fish.encode(&record.fish_name).unwrap_or_default(),
            harbor_vessels_count: record.harbor_vessels.len(),
            ping_vessels_count: record.ping_vessels.len(),
            anomaly_score: score.score,
            anomaly: u8::from(score.anomalous),
            record: record.clone(),
        })
        .collect();

    debug!(
        scored = scored.len(),
        dropped = records.len() - scored.len(),
        anomalies = scored.iter().filter(|s| s.anomaly == 1).count(),
        "Scored fish deliveries"
    );
    Ok(scored)
}
