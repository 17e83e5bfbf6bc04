//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`source`] - In-memory [`ActivitySource`](crate::port::ActivitySource)
//!   implementations: `InMemorySource`, `FailingSource`.
//! - [`records`] - Builders for domain records: deliveries, exits, pings.
//! - [`settings`] - Canonical analysis settings.

pub mod records;
pub mod settings;
pub mod source;
