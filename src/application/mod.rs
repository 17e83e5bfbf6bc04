//! Application services (use cases).
//!
//! Every stage is a synchronous function or small parameter object over
//! normalized records; [`pipeline::Pipeline`] wires them to an
//! [`ActivitySource`](crate::port::ActivitySource).
//!
//! - [`normalize`] - Raw rows to domain records
//! - [`matching`] - Delivery-to-exit asof matching
//! - [`aggregate`] - Daily sums and the joined timeline
//! - [`anomaly`] - Rolling z-scores and the isolation forest
//! - [`dwell`] - Splitting pings at midnight
//! - [`cluster`] - K-means over matched exits and deliveries
//! - [`decompose`] - Seasonal decomposition of daily cargo
//! - [`species`] - Quantity per city and species

pub mod aggregate;
pub mod anomaly;
pub mod cluster;
pub mod decompose;
pub mod dwell;
pub mod matching;
pub mod normalize;
pub mod pipeline;
pub mod species;
