//! Classical additive seasonal decomposition of daily cargo.
//!
//! `observed = trend + seasonal + residual`, where the trend is a centered
//! moving average over one period (a 2xP average for even periods), the
//! seasonal component is the per-phase mean of the detrended series
//! centered to sum to zero, and the residual is what is left.

use chrono::{Days, NaiveDate};
use tracing::debug;

use crate::domain::{Decomposition, DecompositionPoint, DeliveryRecord};
use crate::error::PipelineError;

use super::aggregate::daily_quantities;

/// Default seasonal period in days.
pub const DEFAULT_PERIOD: usize = 7;

/// Default minimum number of daily observations.
pub const DEFAULT_MIN_OBSERVATIONS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonalDecomposer {
    period: usize,
    min_observations: usize,
}

impl Default for SeasonalDecomposer {
    fn default() -> Self {
        Self::new(DEFAULT_PERIOD, DEFAULT_MIN_OBSERVATIONS)
    }
}

impl SeasonalDecomposer {
    /// Periods below 2 are raised to 2.
    #[must_use]
    pub fn new(period: usize, min_observations: usize) -> Self {
        Self {
            period: period.max(2),
            min_observations,
        }
    }

    /// Observations needed before a decomposition is attempted.
    #[must_use]
    pub fn required(&self) -> usize {
        self.min_observations.max(2 * self.period)
    }

    /// Decompose daily delivered quantity.
    ///
    /// Deliveries are summed per day and laid on a continuous daily axis
    /// from the first to the last delivery day; days without deliveries
    /// count as zero.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InsufficientData`] when the daily series is
    /// shorter than [`required`](Self::required).
    pub fn decompose(&self, deliveries: &[DeliveryRecord]) -> Result<Decomposition, PipelineError> {
        let series = continuous_daily(deliveries);
        self.decompose_series(&series)
    }

    /// Decompose an already continuous daily series.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InsufficientData`] when the series is too
    /// short.
    pub fn decompose_series(
        &self,
        series: &[(NaiveDate, f64)],
    ) -> Result<Decomposition, PipelineError> {
        let n = series.len();
        let required = self.required();
        if n < required {
            return Err(PipelineError::InsufficientData {
                available: n,
                required,
            });
        }

        let observed: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
        let trend = centered_moving_average(&observed, self.period);

        let mut phase_sums = vec![0.0; self.period];
        let mut phase_counts = vec![0usize; self.period];
        for (i, (value, t)) in observed.iter().zip(&trend).enumerate() {
            if let Some(t) = t {
                phase_sums[i % self.period] += value - t;
                phase_counts[i % self.period] += 1;
            }
        }
        let phase_means: Vec<f64> = phase_sums
            .iter()
            .zip(&phase_counts)
            .map(|(s, c)| if *c > 0 { s / *c as f64 } else { 0.0 })
            .collect();
        let offset = phase_means.iter().sum::<f64>() / self.period as f64;

        let points: Vec<DecompositionPoint> = series
            .iter()
            .zip(trend)
            .enumerate()
            .map(|(i, ((date, value), trend))| {
                let seasonal = phase_means[i % self.period] - offset;
                DecompositionPoint {
                    date: *date,
                    observed: *value,
                    trend,
                    seasonal,
                    residual: trend.map(|t| value - t - seasonal),
                }
            })
            .collect();

        debug!(days = n, period = self.period, "Seasonal decomposition complete");
        Ok(Decomposition {
            period: self.period,
            points,
        })
    }
}

/// Daily sums on a gap-free axis, missing days as zero.
#[must_use]
pub fn continuous_daily(deliveries: &[DeliveryRecord]) -> Vec<(NaiveDate, f64)> {
    let daily = daily_quantities(deliveries);
    let (Some(first), Some(last)) = (daily.first(), daily.last()) else {
        return Vec::new();
    };
    let mut series = Vec::new();
    let mut values = daily.iter().peekable();
    let mut day = first.date;
    while day <= last.date {
        let value = match values.peek() {
            Some(d) if d.date == day => {
                let qty = d.qty_tons;
                values.next();
                qty
            }
            _ => 0.0,
        };
        series.push((day, value));
        match day.checked_add_days(Days::new(1)) {
            Some(next) => day = next,
            None => break,
        }
    }
    series
}

fn centered_moving_average(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let half = period / 2;
    (0..n)
        .map(|i| {
            if i < half || i + half >= n {
                return None;
            }
            let window = &values[i - half..=i + half];
            if period % 2 == 1 {
                Some(window.iter().sum::<f64>() / period as f64)
            } else {
                let inner: f64 = window[1..window.len() - 1].iter().sum();
                let edges = 0.5 * (window[0] + window[window.len() - 1]);
                Some((inner + edges) / period as f64)
            }
        })
        .collect()
}
