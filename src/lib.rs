//! Oceanus - temporal matching and anomaly detection over a maritime
//! activity graph.
//!
//! Raw rows about deliveries, vessel exits, transponder pings and fish
//! delivery reports are pulled from a graph source, normalized into typed
//! records, and turned into the tables behind an activity dashboard:
//!
//! - deliveries matched to the nearest vessel exit, clustered by hour and
//!   quantity
//! - a daily timeline of cargo and vessel counts with rolling z-score
//!   anomalies
//! - dwell time per vessel, location and calendar day
//! - isolation-forest outlier scores and k-means clusters for fish deliveries
//! - a per-species quantity breakdown and a seasonal decomposition
//!
//! # Architecture
//!
//! Hexagonal layout:
//!
//! - [`domain`] - Records, filters, date windows and numeric helpers
//! - [`port`] - The [`ActivitySource`](port::ActivitySource) trait and raw
//!   row shapes
//! - [`application`] - Normalization, the analysis stages, and the
//!   [`Pipeline`](application::pipeline::Pipeline) that composes them
//! - [`adapter`] - Neo4j and JSON fixture sources, and the CLI
//! - [`infrastructure`] - TOML configuration, logging, and factories
//! - [`error`] - Error types for the crate
//!
//! # Features
//!
//! - `testkit` - Export in-memory sources and record builders for tests
//! - `integration-tests` - Enable tests that need a running Neo4j instance
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use oceanus::adapter::outbound::fixture::FixtureSource;
//! use oceanus::application::pipeline::{AnalysisRequest, Pipeline};
//! use oceanus::infrastructure::config::settings::Config;
//!
//! # async fn run() -> oceanus::error::Result<()> {
//! let settings = Config::default().analysis_settings()?;
//! let source = FixtureSource::from_path("fixtures/sample.json")?;
//! let pipeline = Pipeline::new(Arc::new(source), settings);
//!
//! let dashboard = pipeline.run(&AnalysisRequest::default()).await;
//! println!("{} panels failed", dashboard.failed_panels());
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
