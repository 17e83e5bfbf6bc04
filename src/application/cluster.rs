//! K-means clustering of matched exits and fish deliveries.
//!
//! Features are standardized per invocation and handed to `linfa`'s k-means
//! (k-means++ seeding, best of `n_init` seeded runs). Labels are integers in
//! `[0, k)`; their numbering carries no meaning across invocations.

use std::collections::BTreeSet;

use linfa::prelude::*;
use linfa_clustering::KMeans as KMeansModel;
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::domain::error::DomainError;
use crate::domain::stats::{check_rectangular, finite_or_zero, standardize};
use crate::domain::time::epoch_seconds;
use crate::domain::{ClusteredDelivery, ClusteredMatch, FishDeliveryRecord, MatchedRecord};

use super::anomaly::LabelEncoder;

/// Convergence tolerance on centroid movement.
const TOLERANCE: f64 = 1e-4;

/// K-means parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KMeans {
    clusters: usize,
    n_init: usize,
    max_iter: usize,
    seed: u64,
}

impl KMeans {
    /// # Errors
    ///
    /// Returns [`DomainError::ZeroClusters`] when `clusters` is zero.
    pub fn try_new(
        clusters: usize,
        n_init: usize,
        max_iter: usize,
        seed: u64,
    ) -> Result<Self, DomainError> {
        if clusters == 0 {
            return Err(DomainError::ZeroClusters);
        }
        Ok(Self {
            clusters,
            n_init: n_init.max(1),
            max_iter: max_iter.max(1),
            seed,
        })
    }

    #[must_use]
    pub const fn clusters(&self) -> usize {
        self.clusters
    }

    /// Cluster `rows` (already scaled) and return one label per row.
    ///
    /// `k` is reduced to the number of distinct rows when there are fewer
    /// of them than clusters. Non-finite values count as 0.
    ///
    /// # Errors
    ///
    /// Fails if the rows are ragged or the backend rejects the matrix.
    pub fn fit_predict(&self, rows: &[Vec<f64>]) -> Result<Vec<usize>, DomainError> {
        let width = check_rectangular(rows)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let k = self.clusters.min(distinct_rows(rows));
        if k <= 1 {
            return Ok(vec![0; rows.len()]);
        }

        let values: Vec<f64> = rows.iter().flatten().map(|v| finite_or_zero(*v)).collect();
        let records = Array2::from_shape_vec((rows.len(), width), values)
            .map_err(|e| DomainError::Clustering { reason: e.to_string() })?;
        let dataset = DatasetBase::new(records.clone(), Array1::from_elem(rows.len(), ()));

        let model = KMeansModel::params_with_rng(k, StdRng::seed_from_u64(self.seed))
            .n_runs(self.n_init)
            .max_n_iterations(self.max_iter as u64)
            .tolerance(TOLERANCE)
            .fit(&dataset)
            .map_err(|e| DomainError::Clustering { reason: e.to_string() })?;

        Ok(model.predict(&records).to_vec())
    }
}

/// Number of distinct rows once non-finite values are zeroed.
fn distinct_rows(rows: &[Vec<f64>]) -> usize {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|v| (finite_or_zero(*v) + 0.0).to_bits())
                .collect::<Vec<u64>>()
        })
        .collect::<BTreeSet<_>>()
        .len()
}

/// Cluster matched records on `[hour, qty_tons]`.
///
/// # Errors
///
/// Propagates feature-matrix errors.
pub fn cluster_matches(
    records: &[MatchedRecord],
    kmeans: &KMeans,
) -> Result<Vec<ClusteredMatch>, DomainError> {
    let features: Vec<Vec<f64>> = records
        .iter()
        .map(|r| vec![f64::from(r.hour), r.qty_tons])
        .collect();
    let labels = kmeans.fit_predict(&standardize(&features)?)?;
    debug!(records = records.len(), k = kmeans.clusters(), "Clustered matched exits");
    Ok(records
        .iter()
        .zip(labels)
        .map(|(record, cluster)| ClusteredMatch {
            record: record.clone(),
            cluster,
        })
        .collect())
}

/// Cluster fish deliveries on `[arrival epoch seconds, city id]`.
///
/// A missing arrival date counts as epoch 0.
///
/// # Errors
///
/// Propagates feature-matrix errors.
pub fn cluster_deliveries(
    records: &[FishDeliveryRecord],
    kmeans: &KMeans,
) -> Result<Vec<ClusteredDelivery>, DomainError> {
    let cities = LabelEncoder::fit(records.iter().map(|r| r.city_of_arrival.as_str()));
    let features: Vec<Vec<f64>> = records
        .iter()
        .map(|r| {
            let timestamp = r
                .date_of_arrival
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map_or(0, epoch_seconds);
            let city = cities
                .encode(&r.city_of_arrival)
                .map_or(-1.0, |code| code as f64);
            vec![timestamp as f64, city]
        })
        .collect();
    let labels = kmeans.fit_predict(&standardize(&features)?)?;
    debug!(records = records.len(), k = kmeans.clusters(), "Clustered fish deliveries");
    Ok(records
        .iter()
        .zip(labels)
        .map(|(record, cluster)| ClusteredDelivery {
            record: record.clone(),
            cluster,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DeliveryId, VesselId};
    use chrono::NaiveDate;

    fn two_blobs() -> Vec<Vec<f64>> {
        let mut rows = Vec::new();
        for i in 0..10 {
            let jitter = f64::from(i) * 0.01;
            rows.push(vec![0.0 + jitter, 0.0 - jitter]);
            rows.push(vec![10.0 - jitter, 10.0 + jitter]);
        }
        rows
    }

    #[test]
    fn zero_clusters_rejected() {
        assert_eq!(KMeans::try_new(0, 10, 300, 42), Err(DomainError::ZeroClusters));
    }

    #[test]
    fn separated_blobs_get_consistent_labels() {
        let labels = KMeans::try_new(2, 10, 300, 42)
            .unwrap()
            .fit_predict(&two_blobs())
            .unwrap();
        let first = labels[0];
        let second = labels[1];
        assert_ne!(first, second);
        for (i, label) in labels.iter().enumerate() {
            assert_eq!(*label, if i % 2 == 0 { first } else { second });
        }
    }

    #[test]
    fn labels_are_within_range_and_deterministic() {
        let kmeans = KMeans::try_new(3, 10, 300, 42).unwrap();
        let rows = two_blobs();
        let labels = kmeans.fit_predict(&rows).unwrap();
        assert!(labels.iter().all(|l| *l < 3));
        assert_eq!(labels, kmeans.fit_predict(&rows).unwrap());
    }

    #[test]
    fn fewer_rows_than_clusters() {
        let labels = KMeans::try_new(5, 10, 300, 42)
            .unwrap()
            .fit_predict(&[vec![1.0], vec![2.0]])
            .unwrap();
        assert_eq!(labels.len(), 2);
        assert_ne!(labels[0], labels[1]);
        assert!(KMeans::try_new(5, 10, 300, 42).unwrap().fit_predict(&[]).unwrap().is_empty());
    }

    #[test]
    fn identical_rows_share_one_cluster() {
        let labels = KMeans::try_new(3, 10, 300, 42)
            .unwrap()
            .fit_predict(&[vec![0.0, 0.0], vec![0.0, -0.0], vec![0.0, 0.0]])
            .unwrap();
        assert_eq!(labels, vec![0, 0, 0]);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = KMeans::try_new(2, 10, 300, 42)
            .unwrap()
            .fit_predict(&[vec![1.0, 2.0], vec![3.0]])
            .unwrap_err();
        assert!(matches!(err, DomainError::RaggedFeatures { row: 1, .. }));
    }

    #[test]
    fn nan_features_are_zeroed() {
        let labels = KMeans::try_new(2, 5, 100, 7)
            .unwrap()
            .fit_predict(&[vec![f64::NAN], vec![0.0], vec![9.0]])
            .unwrap();
        assert_eq!(labels[0], labels[1]);
        assert_ne!(labels[0], labels[2]);
    }

    #[test]
    fn deliveries_cluster_by_city_and_time() {
        let record = |i: u32, city: &str, day: u32| FishDeliveryRecord {
            delivery_id: DeliveryId::new(format!("cargo_{i}")),
            date_of_arrival: NaiveDate::from_ymd_opt(2035, 1, day),
            city_of_arrival: city.to_string(),
            fish_name: "Cod".to_string(),
            quantity_tons: 1.0,
            harbor_vessels: vec![VesselId::from("v")],
            ping_vessels: Vec::new(),
        };
        let records: Vec<_> = (0..6)
            .map(|i| record(i, "Haacklee", 1 + i % 2))
            .chain((6..12).map(|i| record(i, "Lomark", 27 + i % 2)))
            .collect();
        let clustered =
            cluster_deliveries(&records, &KMeans::try_new(2, 10, 300, 42).unwrap()).unwrap();
        assert_eq!(clustered.len(), 12);
        assert!(clustered[..6].iter().all(|c| c.cluster == clustered[0].cluster));
        assert!(clustered[6..].iter().all(|c| c.cluster == clustered[6].cluster));
        assert_ne!(clustered[0].cluster, clustered[6].cluster);
    }

    #[test]
    fn matches_keep_their_records() {
        let matched: Vec<MatchedRecord> = (0..4)
            .map(|i| MatchedRecord {
                delivery_date: NaiveDate::from_ymd_opt(2035, 1, 1 + i)
                    .unwrap()
                    .and_hms_opt(12, 0, 0)
                    .unwrap(),
                qty_tons: f64::from(i),
                exit_date: NaiveDate::from_ymd_opt(2035, 1, 1 + i)
                    .unwrap()
                    .and_hms_opt(i * 5, 0, 0)
                    .unwrap(),
                vessel_id: VesselId::from("v"),
                hour: i * 5,
            })
            .collect();
        let clustered =
            cluster_matches(&matched, &KMeans::try_new(3, 10, 300, 42).unwrap()).unwrap();
        assert_eq!(clustered.len(), 4);
        assert!(clustered.iter().all(|c| c.cluster < 3));
        assert_eq!(clustered[2].record, matched[2]);
    }
}
