//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; the graph password is taken from
//! the `NEO4J_PASSWORD` environment variable, never from the file.
//!
//! # Example
//!
//! ```no_run
//! use oceanus::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     let settings = config.analysis_settings()?;
//!     println!("z threshold: {}", settings.rolling.z_threshold());
//!     Ok(())
//! }
//! ```

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::logging::LoggingConfig;
use super::source::SourceConfig;
use crate::application::anomaly::{IsolationForest, RollingDetector};
use crate::application::cluster::KMeans;
use crate::application::decompose::{SeasonalDecomposer, DEFAULT_MIN_OBSERVATIONS, DEFAULT_PERIOD};
use crate::application::matching::{AsofMatcher, DEFAULT_TOLERANCE_HOURS};
use crate::application::pipeline::{AnalysisSettings, DateDefaults};
use crate::error::{ConfigError, Result};

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

/// Persisted date constants for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatesConfig {
    /// Start of the range used when the requested dates are invalid.
    pub default_start: NaiveDate,
    /// Last day (inclusive) of that range.
    pub default_end: NaiveDate,
    /// Earliest selectable day.
    pub min_allowed: NaiveDate,
}

impl Default for DatesConfig {
    fn default() -> Self {
        Self {
            default_start: ymd(2035, 1, 1),
            default_end: ymd(2035, 2, 28),
            min_allowed: ymd(2035, 1, 1),
        }
    }
}

/// Delivery-to-exit matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Largest gap, in hours, between a delivery and its exit.
    pub tolerance_hours: u32,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            tolerance_hours: DEFAULT_TOLERANCE_HOURS,
        }
    }
}

/// Rolling z-score and isolation forest parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Trailing window, in days, of the rolling statistics.
    pub window: usize,
    /// A day is anomalous when either |z| exceeds this.
    pub z_threshold: f64,
    /// Expected share of outlying deliveries, in (0, 0.5].
    pub contamination: f64,
    pub trees: usize,
    pub sample_size: usize,
    pub seed: u64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            window: 7,
            z_threshold: 2.0,
            contamination: 0.05,
            trees: 100,
            sample_size: 256,
            seed: 42,
        }
    }
}

/// K-means parameters for both clustering panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Clusters for matched exits (hour, quantity).
    pub matched_clusters: usize,
    /// Clusters for fish deliveries (date, city).
    pub delivery_clusters: usize,
    pub n_init: usize,
    pub max_iter: usize,
    pub seed: u64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            matched_clusters: 3,
            delivery_clusters: 5,
            n_init: 10,
            max_iter: 300,
            seed: 42,
        }
    }
}

/// Seasonal decomposition parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompositionConfig {
    /// Season length in days.
    pub period: usize,
    /// Fewest daily observations worth decomposing.
    pub min_observations: usize,
}

impl Default for DecompositionConfig {
    fn default() -> Self {
        Self {
            period: DEFAULT_PERIOD,
            min_observations: DEFAULT_MIN_OBSERVATIONS,
        }
    }
}

/// Main application configuration.
///
/// Every section is optional; missing sections take their defaults. Load
/// from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Where activity rows come from.
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub dates: DatesConfig,

    #[serde(default)]
    pub matching: MatchingConfig,

    #[serde(default)]
    pub anomaly: AnomalyConfig,

    #[serde(default)]
    pub clustering: ClusteringConfig,

    #[serde(default)]
    pub decomposition: DecompositionConfig,
}

fn invalid(field: &'static str, reason: &str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
    .into()
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The TOML content is malformed
    /// - Validation fails (e.g., contamination outside (0, 0.5])
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    ///
    /// Checks that required fields are present and values are within
    /// acceptable ranges.
    ///
    /// # Errors
    ///
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<()> {
        match &self.source {
            SourceConfig::Neo4j(neo4j) => {
                if neo4j.url.trim().is_empty() {
                    return Err(ConfigError::MissingField { field: "source.url" }.into());
                }
                if let Err(e) = url::Url::parse(&neo4j.url) {
                    return Err(invalid("source.url", &e.to_string()));
                }
                if neo4j.database.trim().is_empty() {
                    return Err(ConfigError::MissingField {
                        field: "source.database",
                    }
                    .into());
                }
                if neo4j.timeout_secs == 0 {
                    return Err(invalid("source.timeout_secs", "must be greater than 0"));
                }
            }
            SourceConfig::Fixture(fixture) => {
                if fixture.path.trim().is_empty() {
                    return Err(ConfigError::MissingField {
                        field: "source.path",
                    }
                    .into());
                }
            }
        }

        if self.dates.default_start > self.dates.default_end {
            return Err(invalid("dates.default_start", "must not be after default_end"));
        }
        if self.dates.min_allowed > self.dates.default_end {
            return Err(invalid("dates.min_allowed", "must not be after default_end"));
        }

        if self.matching.tolerance_hours == 0 {
            return Err(invalid("matching.tolerance_hours", "must be greater than 0"));
        }

        let anomaly = &self.anomaly;
        if anomaly.window == 0 {
            return Err(invalid("anomaly.window", "must be greater than 0"));
        }
        if !(anomaly.z_threshold.is_finite() && anomaly.z_threshold > 0.0) {
            return Err(invalid("anomaly.z_threshold", "must be a positive number"));
        }
        if !(anomaly.contamination > 0.0 && anomaly.contamination <= 0.5) {
            return Err(invalid("anomaly.contamination", "must be in (0, 0.5]"));
        }
        if anomaly.trees == 0 {
            return Err(invalid("anomaly.trees", "must be greater than 0"));
        }
        if anomaly.sample_size < 2 {
            return Err(invalid("anomaly.sample_size", "must be at least 2"));
        }

        let clustering = &self.clustering;
        if clustering.matched_clusters == 0 {
            return Err(invalid("clustering.matched_clusters", "must be greater than 0"));
        }
        if clustering.delivery_clusters == 0 {
            return Err(invalid("clustering.delivery_clusters", "must be greater than 0"));
        }
        if clustering.n_init == 0 || clustering.max_iter == 0 {
            return Err(invalid(
                "clustering.n_init",
                "n_init and max_iter must be greater than 0",
            ));
        }

        if self.decomposition.period < 2 {
            return Err(invalid("decomposition.period", "must be at least 2"));
        }
        if self.decomposition.min_observations == 0 {
            return Err(invalid(
                "decomposition.min_observations",
                "must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Build the stage parameters for the analysis pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if a stage rejects its parameters.
    pub fn analysis_settings(&self) -> Result<AnalysisSettings> {
        let anomaly = &self.anomaly;
        let clustering = &self.clustering;
        Ok(AnalysisSettings {
            dates: DateDefaults {
                default_start: self.dates.default_start,
                default_end: self.dates.default_end,
                min_allowed: self.dates.min_allowed,
            },
            matcher: AsofMatcher::from_hours(self.matching.tolerance_hours),
            rolling: RollingDetector::new(anomaly.window, anomaly.z_threshold),
            forest: IsolationForest::try_new(
                anomaly.trees,
                anomaly.sample_size,
                anomaly.contamination,
                anomaly.seed,
            )?,
            matched_kmeans: KMeans::try_new(
                clustering.matched_clusters,
                clustering.n_init,
                clustering.max_iter,
                clustering.seed,
            )?,
            delivery_kmeans: KMeans::try_new(
                clustering.delivery_clusters,
                clustering.n_init,
                clustering.max_iter,
                clustering.seed,
            )?,
            decomposer: SeasonalDecomposer::new(
                self.decomposition.period,
                self.decomposition.min_observations,
            ),
        })
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
