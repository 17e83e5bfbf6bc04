use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Errors raised by the analysis pipeline and its data source.
///
/// Panels surface these independently: one failing panel never takes the
/// others down with it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// A date parameter could not be read as `YYYY-MM-DD`.
    #[error("invalid date format: '{value}' (expected YYYY-MM-DD)")]
    InvalidDateFormat { value: String },

    /// The query layer failed or returned rows that could not be decoded.
    #[error("upstream query '{query}' failed: {reason}")]
    UpstreamQueryFailure { query: &'static str, reason: String },

    /// Not enough daily observations for a decomposition-style analysis.
    #[error("insufficient data: {available} observations, at least {required} required")]
    InsufficientData { available: usize, required: usize },

    /// An analysis stage rejected its own input (e.g. a ragged feature
    /// matrix).
    #[error("analysis stage '{stage}' failed: {reason}")]
    StageFailure { stage: &'static str, reason: String },
}

impl PipelineError {
    /// Build an upstream failure for the named query.
    pub fn upstream(query: &'static str, reason: impl Into<String>) -> Self {
        Self::UpstreamQueryFailure {
            query,
            reason: reason.into(),
        }
    }

    /// Wrap a domain error raised inside an analysis stage.
    pub fn stage(stage: &'static str, err: &DomainError) -> Self {
        Self::StageFailure {
            stage,
            reason: err.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),
}

pub type Result<T> = std::result::Result<T, Error>;
