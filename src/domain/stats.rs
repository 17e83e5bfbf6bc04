//! Small numeric helpers shared by the detectors and the clusterer.

use super::error::DomainError;

/// Arithmetic mean; `None` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator); `None` below two values.
#[must_use]
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Population standard deviation; `None` for an empty slice.
#[must_use]
pub fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}

/// Linearly interpolated percentile, `q` in `[0, 100]`.
#[must_use]
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Check that every row of a feature matrix has the same width.
///
/// # Errors
///
/// Returns [`DomainError::RaggedFeatures`] naming the first offending row.
pub fn check_rectangular(rows: &[Vec<f64>]) -> Result<usize, DomainError> {
    let expected = rows.first().map_or(0, Vec::len);
    for (row, values) in rows.iter().enumerate() {
        if values.len() != expected {
            return Err(DomainError::RaggedFeatures {
                row,
                found: values.len(),
                expected,
            });
        }
    }
    Ok(expected)
}

/// Column-wise z-score scaling fitted on one matrix.
///
/// Uses the population standard deviation. Constant columns scale by 1 so
/// they collapse to zero instead of dividing by zero. Non-finite inputs are
/// replaced by 0 before fitting.
#[derive(Debug, Clone, PartialEq)]
pub struct Standardizer {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl Standardizer {
    /// Fit column means and scales.
    ///
    /// # Errors
    ///
    /// Fails if the rows are ragged.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, DomainError> {
        let width = check_rectangular(rows)?;
        let mut means = Vec::with_capacity(width);
        let mut scales = Vec::with_capacity(width);
        for col in 0..width {
            let column: Vec<f64> = rows.iter().map(|r| finite_or_zero(r[col])).collect();
            let m = mean(&column).unwrap_or(0.0);
            let s = population_std(&column).unwrap_or(0.0);
            means.push(m);
            scales.push(if s > 0.0 { s } else { 1.0 });
        }
        Ok(Self { means, scales })
    }

    /// Scale rows with the fitted parameters.
    #[must_use]
    pub fn transform(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter()
            .map(|row| {
                row.iter()
                    .zip(self.means.iter().zip(&self.scales))
                    .map(|(v, (m, s))| (finite_or_zero(*v) - m) / s)
                    .collect()
            })
            .collect()
    }
}

/// Fit and apply a [`Standardizer`] in one step.
///
/// # Errors
///
/// Fails if the rows are ragged.
pub fn standardize(rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, DomainError> {
    Ok(Standardizer::fit(rows)?.transform(rows))
}

/// Replace NaN and infinities with 0.
#[must_use]
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
