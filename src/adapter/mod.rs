//! Implementations of ports (hexagonal adapters).
//!
//! - [`inbound`] - Driving side: the command-line interface.
//! - [`outbound`] - Driven side: activity sources (Neo4j, JSON fixtures).

pub mod inbound;
pub mod outbound;
