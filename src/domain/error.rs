//! Domain validation errors for core domain types.
//!
//! These errors are returned by `try_new` constructors and model builders
//! when an input would violate a domain invariant.
//!
//! # Examples
//!
//! ```
//! use oceanus::domain::error::DomainError;
//! use oceanus::domain::record::DwellInterval;
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2035, 1, 10)
//!     .unwrap()
//!     .and_hms_opt(22, 0, 0)
//!     .unwrap();
//!
//! let result = DwellInterval::try_new(start, -5.0);
//! assert!(matches!(result, Err(DomainError::InvalidDwell { .. })));
//! ```

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Dwell durations must be finite and non-negative.
    #[error("dwell must be a finite, non-negative number of seconds, got {seconds}")]
    InvalidDwell {
        /// The rejected dwell value.
        seconds: f64,
    },

    /// A dwell interval ran past the representable timestamp range.
    #[error("dwell interval starting at {start} overflows the calendar")]
    DwellOverflow {
        /// Start of the rejected interval.
        start: String,
    },

    /// Clustering needs at least one cluster.
    #[error("cluster count must be at least 1")]
    ZeroClusters,

    /// Contamination ratio must lie in (0, 0.5].
    #[error("contamination must be in (0, 0.5], got {value}")]
    InvalidContamination {
        /// The rejected ratio.
        value: f64,
    },

    /// The clustering backend rejected the feature matrix.
    #[error("k-means failed: {reason}")]
    Clustering {
        /// Backend error message.
        reason: String,
    },

    /// Feature matrices must be rectangular.
    #[error("feature row {row} has {found} columns, expected {expected}")]
    RaggedFeatures {
        /// Offending row index.
        row: usize,
        /// Columns in the offending row.
        found: usize,
        /// Columns in the first row.
        expected: usize,
    },
}
