//! Outbound adapters (driven side).

pub mod fixture;
pub mod neo4j;
