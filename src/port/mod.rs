//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! The pipeline never talks to a database directly. Everything it needs from
//! the outside world comes through [`outbound::source::ActivitySource`],
//! which adapters implement for Neo4j, JSON fixtures and tests.
//!
//! ```text
//!        ┌───────────────────────────┐
//!        │  Application (pipeline)   │
//!        └─────────────┬─────────────┘
//!                      │ ActivitySource
//!          ┌───────────┼─────────────┐
//!          ▼           ▼             ▼
//!     ┌─────────┐ ┌──────────┐ ┌───────────┐
//!     │  Neo4j  │ │ Fixture  │ │ In-memory │
//!     └─────────┘ └──────────┘ └───────────┘
//! ```

pub mod outbound;

pub use outbound::source::{
    ActivitySource, QueryScope, RawDeliveryRow, RawExitRow, RawFishDeliveryRow, RawPingRow,
    RawVesselCountRow, SourceResult,
};
