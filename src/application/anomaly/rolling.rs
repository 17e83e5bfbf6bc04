//! Rolling z-score detector for the daily timeline.

use tracing::debug;

use crate::domain::stats::{mean, sample_std};
use crate::domain::{AnomalyDayRecord, AnomalyLabel, TemporalDayRecord};

/// Default trailing window, in rows.
pub const DEFAULT_WINDOW: usize = 7;

/// Default absolute z-score above which a day is anomalous.
pub const DEFAULT_Z_THRESHOLD: f64 = 2.0;

/// Flags days whose cargo or vessel count departs from the trailing window.
///
/// The window is the current row plus up to `window - 1` preceding rows.
/// Missing values are skipped, so statistics use only the observed values in
/// the window. Means need one observation; standard deviations (sample,
/// n - 1) need two. A z-score is undefined for a missing value or when the
/// deviation is undefined or zero, and an undefined z-score never marks a
/// day anomalous.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollingDetector {
    window: usize,
    z_threshold: f64,
}

impl Default for RollingDetector {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, DEFAULT_Z_THRESHOLD)
    }
}

impl RollingDetector {
    /// A zero window is treated as one row.
    #[must_use]
    pub fn new(window: usize, z_threshold: f64) -> Self {
        Self {
            window: window.max(1),
            z_threshold,
        }
    }

    #[must_use]
    pub const fn window(&self) -> usize {
        self.window
    }

    #[must_use]
    pub const fn z_threshold(&self) -> f64 {
        self.z_threshold
    }

    /// Annotate every timeline row with rolling statistics and a label.
    #[must_use]
    pub fn detect(&self, timeline: &[TemporalDayRecord]) -> Vec<AnomalyDayRecord> {
        let qty: Vec<Option<f64>> = timeline.iter().map(|r| r.qty_tons).collect();
        let vessels: Vec<Option<f64>> = timeline
            .iter()
            .map(|r| r.num_vessels.map(f64::from))
            .collect();

        let records: Vec<AnomalyDayRecord> = timeline
            .iter()
            .enumerate()
            .map(|(i, day)| {
                let from = (i + 1).saturating_sub(self.window);
                let qty_stats = WindowStats::of(&qty[from..=i]);
                let vessel_stats = WindowStats::of(&vessels[from..=i]);
                let z_score_qty = qty_stats.z_score(qty[i]);
                let z_score_vessels = vessel_stats.z_score(vessels[i]);
                let anomaly = if self.exceeds(z_score_qty) || self.exceeds(z_score_vessels) {
                    AnomalyLabel::Anomaly
                } else {
                    AnomalyLabel::Normal
                };
                AnomalyDayRecord {
                    day: day.clone(),
                    rolling_mean_qty: qty_stats.mean,
                    rolling_std_qty: qty_stats.std,
                    rolling_mean_vessels: vessel_stats.mean,
                    rolling_std_vessels: vessel_stats.std,
                    z_score_qty,
                    z_score_vessels,
                    anomaly,
                }
            })
            .collect();

        debug!(
            days = records.len(),
            anomalies = records.iter().filter(|r| r.anomaly.is_anomaly()).count(),
            window = self.window,
            "Rolling anomaly detection complete"
        );
        records
    }

    fn exceeds(&self, z: Option<f64>) -> bool {
        z.is_some_and(|z| z.abs() > self.z_threshold)
    }
}

struct WindowStats {
    mean: Option<f64>,
    std: Option<f64>,
}

impl WindowStats {
    fn of(window: &[Option<f64>]) -> Self {
        let observed: Vec<f64> = window.iter().flatten().copied().collect();
        Self {
            mean: mean(&observed),
            std: sample_std(&observed),
        }
    }

    fn z_score(&self, value: Option<f64>) -> Option<f64> {
        match (value, self.mean, self.std) {
            (Some(value), Some(mean), Some(std)) if std > 0.0 && std.is_finite() => {
                Some((value - mean) / std)
            }
            _ => None,
        }
    }
}
