//! Neo4j graph database adapter.
//!
//! Talks to the Neo4j HTTP transactional endpoint; see [`client`] for the
//! transport, [`query`] for the Cypher statements and [`response`] for
//! result decoding.

pub mod client;
pub mod query;
pub mod response;

pub use client::Neo4jSource;
pub use query::CypherQuery;
