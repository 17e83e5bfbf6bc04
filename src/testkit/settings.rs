//! Canonical test settings.
//!
//! Single source of truth for the analysis parameters used across tests,
//! matching the shipped configuration defaults.

use chrono::NaiveDate;

use crate::application::anomaly::{IsolationForest, RollingDetector};
use crate::application::cluster::KMeans;
use crate::application::decompose::SeasonalDecomposer;
use crate::application::matching::AsofMatcher;
use crate::application::pipeline::{AnalysisSettings, DateDefaults};

/// Calendar day shorthand; panics on an invalid date.
pub fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Default range 2035-01-01 to 2035-02-28, nothing before 2035-01-01.
pub fn dates() -> DateDefaults {
    DateDefaults {
        default_start: day(2035, 1, 1),
        default_end: day(2035, 2, 28),
        min_allowed: day(2035, 1, 1),
    }
}

/// Settings with every stage at its default parameters.
pub fn default_settings() -> AnalysisSettings {
    AnalysisSettings {
        dates: dates(),
        matcher: AsofMatcher::default(),
        rolling: RollingDetector::default(),
        forest: IsolationForest::default(),
        matched_kmeans: KMeans::try_new(3, 10, 300, 42).expect("valid k-means"),
        delivery_kmeans: KMeans::try_new(5, 10, 300, 42).expect("valid k-means"),
        decomposer: SeasonalDecomposer::default(),
    }
}
